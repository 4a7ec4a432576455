//! Command line front end for the rating ledger
//!
//! Hosts (chat bots, scripts) call this binary with validated player ids and
//! match outcomes; every command prints its result as JSON on stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ladder_ledger::config::AppConfig;
use ladder_ledger::types::{MatchScore, StatField};
use ladder_ledger::Ladder;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Ladder Ledger - Elo ratings for singles and doubles ladders
#[derive(Parser)]
#[command(
    name = "ladder",
    version,
    about = "Apply match results to singles and doubles rating ladders",
    long_about = "Ladder Ledger keeps per-player Elo ratings, streaks, head-to-head records \
                 and match history in JSON registries, one per pool. Each command loads the \
                 registry, applies the change and atomically writes it back."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Singles registry override
    #[arg(long, value_name = "FILE", help = "Override singles registry path")]
    singles_path: Option<PathBuf>,

    /// Doubles registry override
    #[arg(long, value_name = "FILE", help = "Override doubles registry path")]
    doubles_path: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without touching registries")]
    dry_run: bool,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long, help = "Dump collected metrics in Prometheus text format to stderr")]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Register a player (or backfill a legacy record)
    Register {
        player_id: String,
        #[arg(long, help = "Use the doubles pool")]
        doubles: bool,
    },
    /// Report a singles result
    Singles {
        winner_id: String,
        loser_id: String,
        #[arg(long, help = "Winner's score, display only")]
        score_w: Option<u32>,
        #[arg(long, help = "Loser's score, display only")]
        score_l: Option<u32>,
        #[arg(long, help = "Register both players before applying the result")]
        register: bool,
    },
    /// Report a doubles result: the first team beat the second
    Doubles {
        a1: String,
        a2: String,
        b1: String,
        b2: String,
    },
    /// Show a player's record
    Show {
        player_id: String,
        #[arg(long, help = "Use the doubles pool")]
        doubles: bool,
    },
    /// Log a singles match in history without changing ratings
    LogHistory {
        winner_id: String,
        loser_id: String,
        winner_rating_after: i32,
        loser_rating_after: i32,
        #[arg(long)]
        score_w: Option<u32>,
        #[arg(long)]
        score_l: Option<u32>,
    },
    /// Overwrite one stat (elo, wins, losses, streak)
    SetStat {
        player_id: String,
        stat: StatField,
        value: i32,
        #[arg(long, help = "Use the doubles pool")]
        doubles: bool,
    },
    /// List players by rating
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, help = "Use the doubles pool")]
        doubles: bool,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }
    if let Some(path) = &args.singles_path {
        config.storage.singles_path = path.clone();
    }
    if let Some(path) = &args.doubles_path {
        config.storage.doubles_path = path.clone();
    }

    ladder_ledger::config::validate_config(&config)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(ladder: &Ladder, command: Command) -> Result<()> {
    match command {
        Command::Register { player_id, doubles } => {
            let registration = if doubles {
                ladder.doubles.register(&player_id)?
            } else {
                ladder.singles.register(&player_id)?
            };
            print_json(&serde_json::json!({
                "player_id": player_id,
                "registration": registration,
            }))
        }
        Command::Singles {
            winner_id,
            loser_id,
            score_w,
            score_l,
            register,
        } => {
            if register {
                ladder.singles.register(&winner_id)?;
                ladder.singles.register(&loser_id)?;
            }
            let summary = ladder
                .singles
                .process_match(&winner_id, &loser_id, score_w, score_l)?;
            print_json(&summary)
        }
        Command::Doubles { a1, a2, b1, b2 } => {
            let summary = ladder.doubles.process_doubles_match(&a1, &a2, &b1, &b2)?;
            print_json(&summary)
        }
        Command::Show { player_id, doubles } => {
            if doubles {
                print_json(&ladder.doubles.lookup(&player_id)?)
            } else {
                print_json(&ladder.singles.lookup(&player_id)?)
            }
        }
        Command::LogHistory {
            winner_id,
            loser_id,
            winner_rating_after,
            loser_rating_after,
            score_w,
            score_l,
        } => {
            ladder.singles.append_match_history(
                &winner_id,
                &loser_id,
                MatchScore::new(score_w, score_l),
                winner_rating_after,
                loser_rating_after,
            )?;
            print_json(&serde_json::json!({ "logged": true }))
        }
        Command::SetStat {
            player_id,
            stat,
            value,
            doubles,
        } => {
            let updated = if doubles {
                ladder.doubles.set_stat(&player_id, stat, value)?
            } else {
                ladder.singles.set_stat(&player_id, stat, value)?
            };
            print_json(&serde_json::json!({
                "player_id": player_id,
                "updated": updated,
            }))
        }
        Command::Leaderboard { limit, doubles } => {
            if doubles {
                print_json(&ladder.doubles.leaderboard(Some(limit))?)
            } else {
                print_json(&ladder.singles.leaderboard(Some(limit))?)
            }
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        info!("   Service: {}", config.service.name);
        info!("   Singles: {}", config.storage.singles_path.display());
        info!("   Doubles: {}", config.storage.doubles_path.display());
        info!("   K-factor: {}", config.rating.k_factor);
        return Ok(());
    }

    let Some(command) = args.command else {
        eprintln!("No command given; see --help");
        std::process::exit(2);
    };

    let ladder = Ladder::open(&config)?;

    let outcome = run(&ladder, command);
    if args.metrics {
        match ladder.metrics().render() {
            Ok(text) => eprint!("{}", text),
            Err(e) => error!("Failed to render metrics: {}", e),
        }
    }

    if let Err(e) = outcome {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
