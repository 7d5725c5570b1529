use crate::cli::SlabArgs;
use crate::error::{CliError, Result};
use slabpack::core::build::surface::build_slab;
use slabpack::core::io::write_structure;
use slabpack::core::models::structure::AtomicStructure;
use slabpack::engine::error::EngineError;
use tracing::info;

pub fn run(args: SlabArgs) -> Result<()> {
    let size = parse_size(&args.size)?;
    info!(
        "Building {} {} slab of size {:?}",
        args.element, args.kind, size
    );
    let slab = build_slab(
        args.kind,
        &args.element,
        size,
        args.lattice_constant,
        args.vacuum,
    )
    .map_err(EngineError::from)?;

    write_structure(&args.output, &slab).map_err(EngineError::from)?;
    println!(
        "✓ {} slab ({} atoms) written to: {}",
        slab.formula(),
        slab.len(),
        args.output.display()
    );
    Ok(())
}

fn parse_size(values: &[usize]) -> Result<[usize; 3]> {
    <[usize; 3]>::try_from(values).map_err(|_| {
        CliError::Argument(format!(
            "--size expects exactly three values NX,NY,LAYERS, got {:?}",
            values
        ))
    })
}
