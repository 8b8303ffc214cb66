//! rollcore - roll dice formulas from the command line

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rollcore::{resolve, Criteria, Mechanic, ModifierEntry, RollRequest, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dice-formula roller
#[derive(Parser, Debug)]
#[command(name = "rollcore", version, about = "Roll dice formulas")]
struct Args {
    /// Formula to roll, e.g. 2d6+3 (defaults to the configured base formula)
    formula: Option<String>,

    /// Named modifier, NAME=VALUE with an integer or dice VALUE (repeatable)
    #[arg(short, long = "mod", value_name = "NAME=VALUE", allow_hyphen_values = true)]
    modifiers: Vec<ModifierEntry>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resolution mechanic: sum, pool or custom
    #[arg(long, value_parser = parse_mechanic)]
    mechanic: Option<Mechanic>,

    /// Comparison against the target: >=, <= or ==
    #[arg(long, value_parser = parse_criteria)]
    criteria: Option<Criteria>,

    /// Total to beat, or per-die target for pools
    #[arg(short, long, allow_hyphen_values = true)]
    target: Option<i64>,

    /// Successes a dice pool needs
    #[arg(short, long)]
    difficulty: Option<i64>,

    /// Enable exploding dice
    #[arg(short = 'x', long)]
    explode: bool,

    /// Natural roll that triggers an explosion (default: die maximum)
    #[arg(long)]
    threshold: Option<u32>,

    /// RNG seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full outcome as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn parse_mechanic(s: &str) -> Result<Mechanic, String> {
    s.parse()
        .map_err(|_| format!("Unknown mechanic '{}' (expected sum, pool or custom)", s))
}

fn parse_criteria(s: &str) -> Result<Criteria, String> {
    s.parse()
        .map_err(|_| format!("Unknown criteria '{}' (expected >=, <= or ==)", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;

    // Initialize tracing; logs go to stderr so --json output stays clean
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.log_filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Settings load before the subscriber exists, so report their source here
    match &args.config {
        Some(path) => tracing::debug!(mechanic = %settings.mechanic.mechanic, "Loaded settings from {}", path.display()),
        None => tracing::debug!(mechanic = %settings.mechanic.mechanic, "Using default settings"),
    }

    let config = &mut settings.mechanic;
    if let Some(mechanic) = args.mechanic {
        config.mechanic = mechanic;
    }
    if let Some(criteria) = args.criteria {
        config.criteria = criteria;
    }
    if args.explode || args.threshold.is_some() {
        config.exploding = true;
    }
    if args.threshold.is_some() {
        config.explode_threshold = args.threshold;
    }

    let request = RollRequest {
        formula: args.formula,
        modifiers: args.modifiers,
        target: args.target,
        difficulty: args.difficulty,
    };

    let mut rng = match args.seed.or(settings.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let outcome = resolve(&settings.mechanic, &request, &mut rng)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.description);
        for warning in &outcome.warnings {
            eprintln!("warning: {}", warning);
        }
    }

    Ok(())
}
