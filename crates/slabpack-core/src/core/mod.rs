//! # Core Module
//!
//! The atomistic building blocks slabpack works on: structures with lattices and
//! periodic flags, molecule templates, slab builders and structure-file I/O.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Lattices, atomic structures and the
//!   [`models::structure::AtomicStructure`] capability trait
//! - **Input Builders** ([`build`]) - Molecule templates by name and fcc slab builders
//! - **File I/O** ([`io`]) - Extended XYZ and VASP POSCAR readers/writers, selected by
//!   file extension

pub mod build;
pub mod io;
pub mod models;
