//! # slabpack Core Library
//!
//! Builds initial configurations for surface simulations: a crystalline slab with
//! a randomly packed, non-overlapping layer of small molecules above it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Lattice`,
//!   `MoleculeTemplate`), the built-in molecule library, fcc slab builders and
//!   structure file I/O (extended XYZ, VASP POSCAR).
//!
//! - **[`engine`]: The Logic Core.** The rejection-sampling `PlacementEngine` and the
//!   `SlabMerger` that stacks the generated layer on a slab.
//!
//! - **[`workflows`]: The Public API.** Runs a complete generation from a
//!   `GenerationConfig`: obtain the slab, resolve the molecules, place and merge.

pub mod core;
pub mod engine;
pub mod workflows;
