//! Provides input/output functionality for atomic structure file formats.
//!
//! Each format implements the [`traits::StructureFile`] trait. The free functions
//! [`read_structure`] and [`write_structure`] pick the format from the file name,
//! so callers can simply pass `"combined.xyz"` or `"POSCAR"`.

pub mod error;
pub mod poscar;
pub mod traits;
pub mod xyz;

use crate::core::models::structure::{AtomicStructure, Structure};
use error::StructureFileError;
use poscar::PoscarFile;
use std::path::Path;
use traits::StructureFile;
use tracing::debug;
use xyz::ExtXyzFile;

/// Upper bound on atoms reserved up front from a file header; larger files grow as read.
pub(crate) const MAX_HEADER_RESERVATION: usize = 1 << 16;

/// The structure file formats slabpack can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    /// Extended XYZ (`.xyz`, `.extxyz`).
    ExtXyz,
    /// VASP POSCAR (`.vasp`, `.poscar`, or files named `POSCAR`/`CONTCAR`).
    Poscar,
}

impl StructureFormat {
    /// Infers the format from a path's extension or well-known file name.
    ///
    /// # Errors
    ///
    /// Returns [`StructureFileError::UnsupportedFormat`] when the name is not recognized.
    pub fn from_path(path: &Path) -> Result<Self, StructureFileError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let upper_name = file_name.to_ascii_uppercase();
        if upper_name.starts_with("POSCAR") || upper_name.starts_with("CONTCAR") {
            return Ok(StructureFormat::Poscar);
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("xyz") | Some("extxyz") => Ok(StructureFormat::ExtXyz),
            Some("vasp") | Some("poscar") => Ok(StructureFormat::Poscar),
            _ => Err(StructureFileError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Reads a structure, choosing the format from the file name.
pub fn read_structure(path: impl AsRef<Path>) -> Result<Structure, StructureFileError> {
    let path = path.as_ref();
    let format = StructureFormat::from_path(path)?;
    debug!("Reading {:?} as {:?}", path, format);
    match format {
        StructureFormat::ExtXyz => ExtXyzFile::read_from_path(path),
        StructureFormat::Poscar => PoscarFile::read_from_path(path),
    }
}

/// Writes a structure, choosing the format from the file name.
pub fn write_structure(
    path: impl AsRef<Path>,
    structure: &impl AtomicStructure,
) -> Result<(), StructureFileError> {
    let path = path.as_ref();
    let format = StructureFormat::from_path(path)?;
    debug!(
        "Writing {} atoms to {:?} as {:?}",
        structure.len(),
        path,
        format
    );
    match format {
        StructureFormat::ExtXyz => ExtXyzFile::write_to_path(structure, path),
        StructureFormat::Poscar => PoscarFile::write_to_path(structure, path),
    }
}
