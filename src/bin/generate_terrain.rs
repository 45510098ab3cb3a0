//! Batch generator for the volcano terrain archive.
//!
//! ```text
//! generate_terrain [--config <file>] [--output <path>] [--seed <n>] [--dim <n>] [--overwrite]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use env_logger::Env;
use log::info;

use caldera::config::TerrainConfig;
use caldera::terrain;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    seed: Option<u64>,
    dim: Option<usize>,
    overwrite: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} expects a value"))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?.into()),
            "--output" => parsed.output = Some(value("--output")?.into()),
            "--seed" => {
                let seed = value("--seed")?;
                parsed.seed = Some(seed.parse().with_context(|| format!("invalid seed '{seed}'"))?);
            }
            "--dim" => {
                let dim = value("--dim")?;
                let dim = dim
                    .parse()
                    .with_context(|| format!("invalid dimension '{dim}'"))?;
                parsed.dim = Some(dim);
            }
            "--overwrite" => parsed.overwrite = true,
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let mut config = match &args.config {
        Some(path) => TerrainConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => TerrainConfig::default(),
    };
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(dim) = args.dim {
        config.dim = dim;
    }
    config.overwrite |= args.overwrite;

    let generated = terrain::generate(&config).context("generating terrain")?;
    generated
        .to_asset()
        .save(&config.output, config.overwrite)
        .with_context(|| format!("writing {}", config.output.display()))?;

    info!(
        "Crater at {:?}, lava surface at {:.2}",
        generated.crater.center, generated.crater.lava_height
    );
    Ok(())
}
