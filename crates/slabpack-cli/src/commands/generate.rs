use crate::cli::GenerateArgs;
use crate::config::PartialGenerationConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use rand::SeedableRng;
use rand::rngs::StdRng;
use slabpack::core::io::write_structure;
use slabpack::core::models::structure::AtomicStructure;
use slabpack::engine::error::EngineError;
use slabpack::engine::progress::ProgressReporter;
use slabpack::workflows;
use tracing::info;

pub fn run(args: GenerateArgs) -> Result<()> {
    let partial_config = PartialGenerationConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_with_cli(&args)?;

    let mut rng = match settings.seed {
        Some(seed) => {
            info!("Seeding random number generator with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Generating structure...");
    let result = workflows::generate::run(&settings.generation, &mut rng, &reporter)?;

    write_structure(&args.output, &result.structure).map_err(EngineError::from)?;

    for (name, count) in &result.molecules {
        println!("  {:>6} x {}", count, name);
    }
    println!(
        "✓ {} atoms ({} slab + {} molecular) written to: {}",
        result.structure.len(),
        result.slab_atoms,
        result.molecule_atoms(),
        args.output.display()
    );
    Ok(())
}
