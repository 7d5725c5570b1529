use thiserror::Error;

use crate::core::build::molecules::LibraryLoadError;
use crate::core::build::surface::SurfaceError;
use crate::core::io::error::StructureFileError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error(
        "Failed to find non-overlapping configuration for molecule type {molecule_index} ('{molecule_name}') after {attempts} attempts"
    )]
    PlacementExhausted {
        molecule_index: usize,
        molecule_name: String,
        attempts: usize,
    },

    #[error("Combined structure has not been generated. Call merge() first")]
    NotReady,

    #[error("Unknown molecule '{0}'")]
    MoleculeNotFound(String),

    #[error("Slab construction failed: {source}")]
    Surface {
        #[from]
        source: SurfaceError,
    },

    #[error("Molecule library error: {source}")]
    Library {
        #[from]
        source: LibraryLoadError,
    },

    #[error("Structure file error: {source}")]
    StructureFile {
        #[from]
        source: StructureFileError,
    },
}
