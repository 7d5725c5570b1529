//! Sampling helpers shared by the placement engine.

pub mod sampling;
