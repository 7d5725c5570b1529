//! # Engine Module
//!
//! The stateful layer of slabpack: random molecule placement and slab merging.
//!
//! ## Overview
//!
//! [`placement::PlacementEngine`] draws non-overlapping molecule centers inside a
//! rectangular cell by rejection sampling and assembles rotated copies of the
//! molecule templates around them. [`merge::SlabMerger`] derives that cell from a
//! slab, lifts the generated layer above the slab surface and combines both into a
//! single periodic structure.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Placement, merge and end-to-end generation parameters
//! - **Validation** ([`validation`]) - Argument checks shared by the engine constructors
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! All randomness is injected through [`rand::Rng`], so a seeded generator
//! reproduces a structure exactly.

pub mod config;
pub mod error;
pub mod merge;
pub mod placement;
pub mod progress;
pub(crate) mod utils;
pub mod validation;
