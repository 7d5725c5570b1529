//! # Workflows Module
//!
//! High-level entry points that tie [`crate::core`] and [`crate::engine`] together.
//!
//! - **Generation Workflow** ([`generate`]) - Builds or reads a slab, resolves the
//!   requested molecule templates, places them at random and merges the result.

pub mod generate;
