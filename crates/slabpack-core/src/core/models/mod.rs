//! # Core Models Module
//!
//! Data structures used to represent atomic structures in slabpack.
//!
//! ## Key Components
//!
//! - [`cell`] - The orthorhombic placement box for molecule centers
//! - [`lattice`] - The three lattice vectors of a periodic cell and coordinate conversions
//! - [`structure`] - Atoms with element symbols, positions, lattice and periodic flags,
//!   plus the [`structure::AtomicStructure`] capability trait
//! - [`template`] - Immutable molecule definitions that are copied onto placement sites
//!
//! ## Usage
//!
//! ```ignore
//! use slabpack::core::models::{lattice::Lattice, structure::Structure};
//! use nalgebra::Point3;
//!
//! let mut slab = Structure::new(Lattice::orthorhombic(10.0, 10.0, 8.0), [true, true, false]);
//! slab.push("Au", Point3::new(0.0, 0.0, 0.0));
//! ```

pub mod cell;
pub mod lattice;
pub mod structure;
pub mod template;
