//! # Drop Simulator
//!
//! Rolls a case many times and compares the observed tier frequencies with
//! the advertised odds.
//!
//! ```text
//! drop_simulator [--case N] [--rolls N] [--seed N] [--config PATH]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;

use keyopen_economy::{Catalog, EconomyConfig, EconomyResult, Rarity, RollEngine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ROLLS: u64 = 100_000;

struct Options {
    case_index: usize,
    rolls: u64,
    seed: Option<u64>,
    config: Option<String>,
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>, String> {
    flag_value(args, flag)
        .map(|raw| raw.parse().map_err(|_| format!("{flag}: cannot parse {raw:?}")))
        .transpose()
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    Ok(Options {
        case_index: parse_flag(args, "--case")?.unwrap_or(0),
        rolls: parse_flag(args, "--rolls")?.unwrap_or(DEFAULT_ROLLS),
        seed: parse_flag(args, "--seed")?,
        config: flag_value(args, "--config"),
    })
}

fn print_usage() {
    println!("Usage: drop_simulator [--case N] [--rolls N] [--seed N] [--config PATH]");
    println!();
    println!("Options:");
    println!("  --case N       Catalog position of the case (default 0)");
    println!("  --rolls N      Number of rolls (default {DEFAULT_ROLLS})");
    println!("  --seed N       Fixed seed for a reproducible run");
    println!("  --config PATH  Catalog TOML (default: bundled catalog)");
}

#[allow(clippy::cast_precision_loss)]
fn run(options: &Options) -> EconomyResult<()> {
    let mut config = match &options.config {
        Some(path) => EconomyConfig::load(path)?,
        None => EconomyConfig::builtin()?,
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }

    let mut rng = config.rng()?;
    let catalog = Catalog::new(config.cases);
    let case = catalog.get(options.case_index)?;

    info!(case = case.name(), rolls = options.rolls, seed = ?options.seed, "simulating");
    let stats = RollEngine::new().simulate(case, &mut rng, options.rolls);

    println!();
    println!("┌─ {} (${}) ─ {} rolls", case.name(), case.price(), stats.total_rolls);
    println!("│ {:<28} {:>10} {:>9} {:>9}", "TIER", "COUNT", "OBSERVED", "EXPECTED");
    for rarity in Rarity::ALL {
        println!(
            "│ {:<28} {:>10} {:>8.3}% {:>8.3}%",
            rarity.label(),
            stats.tier_counts[rarity.index()],
            stats.tier_frequency(rarity) * 100.0,
            rarity.probability() * 100.0,
        );
    }
    println!("│");
    println!("│ Fallback rolls:   {}", stats.fallbacks);
    println!("│ Mean drop value:  ${:.2}", stats.mean_value());
    println!(
        "│ Mean return:      {:.1}% of price",
        stats.mean_value() / case.price().as_f64().max(f64::MIN_POSITIVE) * 100.0
    );
    println!("└──────────────────────────────────────────────");

    let mut top: Vec<(&String, &u64)> = stats.item_counts.iter().collect();
    top.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    println!();
    println!("Most frequent drops:");
    for (name, count) in top.into_iter().take(5) {
        println!("  {count:>10}  {name}");
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
