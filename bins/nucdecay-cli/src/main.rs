//! nucdecay: command-line decay calculator.
//!
//! Loads a decay dataset, optionally through a decomposition cache, and
//! decays inventories given on the command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use nucdecay_core::{Nuclide, QuantityUnit, TimeUnit};
use nucdecay_engine::{DatasetSpec, DecayDataset};
use nucdecay_inventory::{Inventory, Precision, SolverConfig, TimeGrid};
use tracing::{debug, info};

/// Analytical radioactive decay-chain calculator.
#[derive(Parser, Debug)]
#[command(name = "nucdecay", version, about = "Radioactive decay-chain solver")]
struct Cli {
    /// Config file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset JSON file, overrides the configured one
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Decomposition cache file, overrides the configured one
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decay an inventory by a time period.
    Decay(DecayArgs),
    /// Decay an inventory over a time grid and print the table as JSON.
    Series(SeriesArgs),
    /// Show the dataset, or one nuclide of it.
    Info(InfoArgs),
    /// Build the decomposition cache for the dataset.
    BuildCache,
}

#[derive(Args, Debug)]
struct InventoryArgs {
    /// Nuclide quantities as NAME=VALUE, e.g. Mo-99=1e15
    #[arg(short, long = "nuclide", value_delimiter = ',', required = true)]
    nuclides: Vec<String>,

    /// Unit of the given quantities (atoms, Bq, mCi, g, mol, ...)
    #[arg(short, long, default_value = "atoms")]
    unit: String,

    /// Use exact rational matrices
    #[arg(long)]
    high_precision: bool,

    /// Significant figures for high-precision exponentials
    #[arg(long)]
    sig_figs: Option<u32>,
}

#[derive(Args, Debug)]
struct DecayArgs {
    #[command(flatten)]
    inventory: InventoryArgs,

    /// Decay time
    #[arg(short, long, allow_negative_numbers = true)]
    time: f64,

    /// Unit of the decay time (defaults to the configured unit)
    #[arg(long)]
    time_unit: Option<String>,

    /// Unit of the reported quantities
    #[arg(short, long, default_value = "atoms")]
    output: String,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[command(flatten)]
    inventory: InventoryArgs,

    /// Total duration of a uniform grid
    #[arg(short, long, conflicts_with = "times")]
    duration: Option<f64>,

    /// Number of points of a uniform grid
    #[arg(short, long, default_value_t = 11)]
    samples: usize,

    /// Explicit time points, comma-separated
    #[arg(long, value_delimiter = ',')]
    times: Vec<f64>,

    /// Unit of the time points
    #[arg(long)]
    time_unit: Option<String>,

    /// Unit of the reported quantities
    #[arg(short, long, default_value = "atoms")]
    output: String,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Nuclide to describe
    nuclide: Option<String>,

    /// Unit for half-lives; `readable` picks one per nuclide
    #[arg(long, default_value = "readable")]
    time_unit: String,
}

impl Cli {
    /// Layer command-line overrides on top of the loaded configuration.
    fn into_config(self) -> Result<(SolverConfig, Commands)> {
        let mut config = SolverConfig::load(self.config.as_deref()).context("Failed to load config")?;
        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if let Some(cache) = self.cache {
            config.cache = Some(cache);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok((config, self.command))
    }
}

fn main() -> Result<()> {
    let (config, command) = Cli::parse().into_config()?;
    init_logging(&config.log_level, &config.log_format);
    debug!(?config, "cli: configuration");

    match command {
        Commands::Decay(args) => run_decay(&config, args),
        Commands::Series(args) => run_series(&config, args),
        Commands::Info(args) => run_info(&config, args),
        Commands::BuildCache => run_build_cache(&config),
    }
}

fn run_decay(config: &SolverConfig, args: DecayArgs) -> Result<()> {
    let dataset = load_dataset(config)?;
    let time_unit = resolve_time_unit(config, args.time_unit.as_deref())?;
    let output = parse_quantity_unit(&args.output)?;
    let inventory = build_inventory(config, dataset, &args.inventory)?;

    let decayed = inventory
        .decay(args.time, time_unit)
        .with_context(|| format!("Failed to decay by {} {time_unit}", args.time))?;

    println!("{decayed}");
    for (id, value) in decayed.quantities(output)? {
        println!("  {id:<10} {value:.6e} {output}");
    }
    let power = decayed.total_decay_power();
    if power != 0.0 {
        println!("  decay power: {power:.6e} W");
    }
    let negative = decayed.negative_nuclides();
    if !negative.is_empty() {
        println!("  negative quantities: {negative:?}");
    }
    Ok(())
}

fn run_series(config: &SolverConfig, args: SeriesArgs) -> Result<()> {
    let dataset = load_dataset(config)?;
    let time_unit = resolve_time_unit(config, args.time_unit.as_deref())?;
    let output = parse_quantity_unit(&args.output)?;
    let inventory = build_inventory(config, dataset, &args.inventory)?;

    let grid = match args.duration {
        Some(duration) => TimeGrid::Uniform {
            duration,
            samples: args.samples,
        },
        None if !args.times.is_empty() => TimeGrid::Explicit(args.times),
        None => bail!("Give either --duration or --times"),
    };
    let table = inventory.decay_series(&grid, time_unit, output)?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn run_info(config: &SolverConfig, args: InfoArgs) -> Result<()> {
    let dataset = load_dataset(config)?;
    let time_unit: Option<TimeUnit> = match args.time_unit.as_str() {
        "readable" => None,
        unit => Some(
            unit.parse()
                .with_context(|| format!("Invalid time unit: {unit}"))?,
        ),
    };
    let half_life = |nuclide: &Nuclide| -> Result<String> {
        Ok(match time_unit {
            Some(unit) if !nuclide.is_stable() => {
                format!("{:.6e} {unit}", dataset.half_life(&nuclide.id, unit)?)
            }
            _ => nuclide.readable_half_life(dataset.year_days()),
        })
    };

    let Some(name) = args.nuclide else {
        println!("Dataset:     {}", dataset.name());
        println!("Fingerprint: {}", dataset.fingerprint_hex());
        println!("Year length: {} days", dataset.year_days());
        println!("Nuclides:    {}", dataset.len());
        for nuclide in dataset.nuclides() {
            println!("  {:<10} {}", nuclide.id, half_life(nuclide)?);
        }
        return Ok(());
    };

    let nuclide = dataset.nuclide(name.as_str())?;
    println!("Nuclide:      {}", nuclide.id);
    println!("Atomic mass:  {} g/mol", nuclide.atomic_mass);
    println!("Half-life:    {}", half_life(nuclide)?);
    if !nuclide.is_stable() {
        println!("Decay const:  {:.6e} 1/s", nuclide.decay_constant);
    }
    for (mode, energy) in dataset.decay_energy(&nuclide.id)? {
        println!("Energy ({mode}): {energy} eV");
    }
    for progeny in dataset.progeny(&nuclide.id)? {
        println!(
            "  -> {:<10} {:<6} {}",
            progeny.id, progeny.mode, progeny.branching_fraction
        );
    }
    Ok(())
}

fn run_build_cache(config: &SolverConfig) -> Result<()> {
    let Some(cache) = config.cache.as_deref() else {
        bail!("No cache path configured (use --cache or NUCDECAY_CACHE)");
    };
    let dataset = DecayDataset::load(&config.dataset)
        .with_context(|| format!("Failed to load dataset: {}", config.dataset.display()))?;
    dataset
        .write_cache(cache)
        .with_context(|| format!("Failed to write cache: {}", cache.display()))?;
    println!("Cache for {} written to {}", dataset.name(), cache.display());
    Ok(())
}

/// Load the configured dataset, through the cache when one is configured.
fn load_dataset(config: &SolverConfig) -> Result<Arc<DecayDataset>> {
    let path = &config.dataset;
    let dataset = match config.cache.as_deref() {
        Some(cache) => {
            let spec = DatasetSpec::from_path(path)
                .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
            DecayDataset::from_spec_cached(&spec, cache)
        }
        None => DecayDataset::load(path),
    }
    .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    info!(dataset = dataset.name(), nuclides = dataset.len(), "cli: dataset loaded");
    Ok(Arc::new(dataset))
}

fn build_inventory(config: &SolverConfig, dataset: Arc<DecayDataset>, args: &InventoryArgs) -> Result<Inventory> {
    let unit = parse_quantity_unit(&args.unit)?;
    let entries = args
        .nuclides
        .iter()
        .map(|entry| parse_entry(entry))
        .collect::<Result<Vec<_>>>()?;

    let precision = if args.high_precision || config.high_precision {
        Precision::High {
            sig_figs: args.sig_figs.unwrap_or(config.sig_figs),
        }
    } else {
        Precision::Fixed
    };
    Ok(Inventory::new(dataset, entries, unit)?.with_precision(precision))
}

/// Parse `NAME=VALUE`.
fn parse_entry(entry: &str) -> Result<(String, f64)> {
    let Some((name, value)) = entry.split_once('=') else {
        bail!("Expected NAME=VALUE, got {entry:?}");
    };
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity for {name}: {value:?}"))?;
    Ok((name.trim().to_string(), value))
}

fn parse_quantity_unit(unit: &str) -> Result<QuantityUnit> {
    unit.parse().with_context(|| format!("Invalid quantity unit: {unit}"))
}

fn resolve_time_unit(config: &SolverConfig, unit: Option<&str>) -> Result<TimeUnit> {
    match unit {
        Some(u) => u.parse().with_context(|| format!("Invalid time unit: {u}")),
        None => config.time_unit().context("Invalid default_time_unit in config"),
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str` when set.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries() {
        assert_eq!(parse_entry("Mo-99=1e15").unwrap(), ("Mo-99".to_string(), 1e15));
        assert_eq!(parse_entry(" Tc-99m = 2.5 ").unwrap(), ("Tc-99m".to_string(), 2.5));
        assert!(parse_entry("Mo-99").is_err());
        assert!(parse_entry("Mo-99=lots").is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "nucdecay",
            "--dataset",
            "/tmp/other.json",
            "--log-level",
            "debug",
            "decay",
            "-n",
            "Mo-99=1",
            "-t",
            "-5",
        ]);
        let (config, command) = cli.into_config().unwrap();
        assert_eq!(config.dataset, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.log_level, "debug");
        match command {
            Commands::Decay(args) => assert_eq!(args.time, -5.0),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
