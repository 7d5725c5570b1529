//! Builders for the inputs of a generation run.
//!
//! - [`molecules`] - Built-in gas-phase molecule templates addressed by formula
//!   name, plus user-supplied libraries loaded from TOML
//! - [`surface`] - Crystalline slab builders for common fcc facets

pub mod molecules;
pub mod surface;
