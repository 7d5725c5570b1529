use crate::cli::MoleculesArgs;
use crate::error::{CliError, Result};
use slabpack::core::build::molecules::MoleculeLibrary;
use tracing::info;

pub fn run(args: MoleculesArgs) -> Result<()> {
    let library = match &args.molecule_library {
        Some(path) => {
            info!("Loading custom molecule library from {:?}", path);
            MoleculeLibrary::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?
        }
        None => MoleculeLibrary::new(),
    };

    for line in describe(&library) {
        println!("{}", line);
    }
    Ok(())
}

/// One `name  formula  atoms` row per molecule the library can resolve.
fn describe(library: &MoleculeLibrary) -> Vec<String> {
    library
        .names()
        .into_iter()
        .filter_map(|name| library.resolve(&name))
        .map(|template| {
            format!(
                "{:<12} {:<10} {:>3} atoms",
                template.name(),
                template.atoms().formula(),
                template.len()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slabpack::core::build::molecules::available_molecules;
    use slabpack::core::models::template::MoleculeTemplate;

    #[test]
    fn lists_builtins_and_custom_entries() {
        let mut library = MoleculeLibrary::new();
        library.insert(MoleculeTemplate::single_atom("Xe"));
        let rows = describe(&library);

        assert_eq!(rows.len(), available_molecules().len() + 1);
        assert!(rows.iter().any(|r| r.starts_with("H2O") && r.ends_with("3 atoms")));
        assert!(rows.iter().any(|r| r.starts_with("Xe")));
    }
}
