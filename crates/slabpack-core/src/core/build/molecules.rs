use crate::core::models::template::MoleculeTemplate;
use nalgebra::Point3;
use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

type AtomRecord = (&'static str, [f64; 3]);

// Gas-phase equilibrium geometries in Angstroms, centred near the origin.
static BUILTIN_MOLECULES: Map<&'static str, &'static [AtomRecord]> = phf_map! {
    "H2" => &[
        ("H", [0.0, 0.0, 0.368583]),
        ("H", [0.0, 0.0, -0.368583]),
    ],
    "N2" => &[
        ("N", [0.0, 0.0, 0.56499]),
        ("N", [0.0, 0.0, -0.56499]),
    ],
    "O2" => &[
        ("O", [0.0, 0.0, 0.622978]),
        ("O", [0.0, 0.0, -0.622978]),
    ],
    "CO" => &[
        ("O", [0.0, 0.0, 0.493003]),
        ("C", [0.0, 0.0, -0.657337]),
    ],
    "H2O" => &[
        ("O", [0.0, 0.0, 0.119262]),
        ("H", [0.0, 0.763239, -0.477047]),
        ("H", [0.0, -0.763239, -0.477047]),
    ],
    "NH3" => &[
        ("N", [0.0, 0.0, 0.116489]),
        ("H", [0.0, 0.939731, -0.271808]),
        ("H", [0.813831, -0.469865, -0.271808]),
        ("H", [-0.813831, -0.469865, -0.271808]),
    ],
    "CH4" => &[
        ("C", [0.0, 0.0, 0.0]),
        ("H", [0.629118, 0.629118, 0.629118]),
        ("H", [-0.629118, -0.629118, 0.629118]),
        ("H", [0.629118, -0.629118, -0.629118]),
        ("H", [-0.629118, 0.629118, -0.629118]),
    ],
    "CO2" => &[
        ("C", [0.0, 0.0, 0.0]),
        ("O", [0.0, 0.0, 1.178658]),
        ("O", [0.0, 0.0, -1.178658]),
    ],
    "CH3OH" => &[
        ("C", [-0.047131, 0.664389, 0.0]),
        ("O", [-0.047131, -0.758551, 0.0]),
        ("H", [-1.092995, 0.969785, 0.0]),
        ("H", [0.878534, -1.048458, 0.0]),
        ("H", [0.437145, 1.080376, 0.891772]),
        ("H", [0.437145, 1.080376, -0.891772]),
    ],
    "CH3CH2NH2" => &[
        ("C", [0.0, 0.55, 0.0]),
        ("C", [-1.27, -0.30, 0.0]),
        ("N", [1.23, -0.24, 0.0]),
        ("H", [0.0, 1.20, 0.88]),
        ("H", [0.0, 1.20, -0.88]),
        ("H", [-2.17, 0.32, 0.0]),
        ("H", [-1.28, -0.95, 0.88]),
        ("H", [-1.28, -0.95, -0.88]),
        ("H", [2.06, 0.34, 0.0]),
        ("H", [1.20, -0.84, 0.81]),
    ],
};

/// Looks up a built-in molecule template by its formula name (e.g. `"H2O"`).
pub fn molecule(name: &str) -> Option<MoleculeTemplate> {
    let records = BUILTIN_MOLECULES.get(name)?;
    let (symbols, positions): (Vec<String>, Vec<Point3<f64>>) = records
        .iter()
        .map(|(symbol, [x, y, z])| (symbol.to_string(), Point3::new(*x, *y, *z)))
        .unzip();
    MoleculeTemplate::new(name, symbols, positions).ok()
}

/// Returns the names of all built-in molecules, sorted alphabetically.
pub fn available_molecules() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTIN_MOLECULES.keys().copied().collect();
    names.sort_unstable();
    names
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct MoleculeRecord {
    symbols: Vec<String>,
    positions: Vec<[f64; 3]>,
}

#[derive(Debug, Error)]
pub enum LibraryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Molecule '{name}' has {symbols} symbols but {positions} positions")]
    Inconsistent {
        name: String,
        symbols: usize,
        positions: usize,
    },
}

/// User-supplied molecule definitions layered on top of the built-in set.
///
/// Custom entries shadow built-in molecules of the same name.
#[derive(Debug, Clone, Default)]
pub struct MoleculeLibrary {
    custom: HashMap<String, MoleculeTemplate>,
}

impl MoleculeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads molecule definitions from a TOML file.
    ///
    /// Each table is one molecule, keyed by name:
    ///
    /// ```toml
    /// [HCN]
    /// symbols = ["H", "C", "N"]
    /// positions = [[0.0, 0.0, -1.6], [0.0, 0.0, -0.5], [0.0, 0.0, 0.65]]
    /// ```
    pub fn load(path: &Path) -> Result<Self, LibraryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LibraryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let records: HashMap<String, MoleculeRecord> =
            toml::from_str(&content).map_err(|e| LibraryLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        let mut library = Self::new();
        for (name, record) in records {
            let symbols = record.symbols.len();
            let positions = record.positions.len();
            let template = MoleculeTemplate::new(
                name.clone(),
                record.symbols,
                record
                    .positions
                    .into_iter()
                    .map(|[x, y, z]| Point3::new(x, y, z))
                    .collect(),
            )
            .map_err(|_| LibraryLoadError::Inconsistent {
                name: name.clone(),
                symbols,
                positions,
            })?;
            library.insert(template);
        }
        Ok(library)
    }

    pub fn insert(&mut self, template: MoleculeTemplate) {
        self.custom.insert(template.name().to_string(), template);
    }

    /// Resolves a molecule by name, preferring custom definitions.
    pub fn resolve(&self, name: &str) -> Option<MoleculeTemplate> {
        self.custom.get(name).cloned().or_else(|| molecule(name))
    }

    /// Names of every molecule this library can resolve, sorted and de-duplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = available_molecules()
            .into_iter()
            .map(str::to_string)
            .chain(self.custom.keys().cloned())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::AtomicStructure;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn water_template_has_expected_geometry() {
        let water = molecule("H2O").unwrap();
        assert_eq!(water.name(), "H2O");
        assert_eq!(water.atoms().formula(), "H2O");
        let positions = water.atoms().positions();
        let oh = (positions[1] - positions[0]).norm();
        assert!((oh - 0.9686).abs() < 1e-3, "O-H bond length was {}", oh);
    }

    #[test]
    fn ethylamine_template_has_expected_composition() {
        let amine = molecule("CH3CH2NH2").unwrap();
        assert_eq!(amine.len(), 10);
        assert_eq!(amine.atoms().formula(), "C2H7N");
    }

    #[test]
    fn every_builtin_molecule_resolves() {
        for name in available_molecules() {
            let template = molecule(name).unwrap();
            assert!(!template.is_empty(), "{} has no atoms", name);
        }
    }

    #[test]
    fn unknown_molecule_is_none() {
        assert!(molecule("C60").is_none());
    }

    #[test]
    fn available_molecules_are_sorted() {
        let names = available_molecules();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"CO2"));
    }

    #[test]
    fn loads_custom_library_and_shadows_builtins() {
        let content = r#"
[HCN]
symbols = ["H", "C", "N"]
positions = [[0.0, 0.0, -1.6], [0.0, 0.0, -0.5], [0.0, 0.0, 0.65]]

[H2O]
symbols = ["O"]
positions = [[0.0, 0.0, 0.0]]
"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();

        let library = MoleculeLibrary::load(file.path()).unwrap();

        assert_eq!(library.resolve("HCN").unwrap().len(), 3);
        assert_eq!(library.resolve("H2O").unwrap().len(), 1);
        assert_eq!(library.resolve("CH4").unwrap().len(), 5);
        assert!(library.names().contains(&"HCN".to_string()));
    }

    #[test]
    fn inconsistent_custom_molecule_is_rejected() {
        let content = r#"
[BAD]
symbols = ["H", "H"]
positions = [[0.0, 0.0, 0.0]]
"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();

        let result = MoleculeLibrary::load(file.path());

        assert!(matches!(
            result,
            Err(LibraryLoadError::Inconsistent { symbols: 2, positions: 1, .. })
        ));
    }

    #[test]
    fn returns_io_error_for_nonexistent_file() {
        let result = MoleculeLibrary::load(Path::new("nonexistent_molecules.toml"));
        assert!(matches!(result, Err(LibraryLoadError::Io { .. })));
    }

    #[test]
    fn returns_toml_error_for_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "this is not valid toml").unwrap();
        let result = MoleculeLibrary::load(file.path());
        assert!(matches!(result, Err(LibraryLoadError::Toml { .. })));
    }
}
