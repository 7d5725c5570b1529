use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Cannot infer a structure file format from '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("Invalid integer '{value}'")]
    InvalidInt { value: String },
    #[error("Invalid float in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
    #[error("Expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
    #[error("Malformed lattice specification: {0}")]
    InvalidLattice(String),
    #[error("Malformed periodic boundary specification: {0}")]
    InvalidPbc(String),
    #[error("Unsupported scale factor {0}; only positive scale factors are supported")]
    UnsupportedScale(f64),
}

pub(crate) fn parse_float(
    token: &str,
    line: usize,
    column: usize,
) -> Result<f64, StructureFileError> {
    token.parse().map_err(|_| StructureFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidFloat {
            column,
            value: token.to_string(),
        },
    })
}

pub(crate) fn parse_int(token: &str, line: usize) -> Result<usize, StructureFileError> {
    token.parse().map_err(|_| StructureFileError::Parse {
        line,
        kind: ParseErrorKind::InvalidInt {
            value: token.to_string(),
        },
    })
}
