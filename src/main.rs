//! Carbon Tracker CLI - estimate and track a personal carbon footprint.
//!
//! Usage:
//!   carbontrack calculate --mode car --distance 100 --food beef --energy-kwh 250
//!   carbontrack region Germany
//!   carbontrack history --user alice
//!   carbontrack dashboard
//!   carbontrack serve --port 5000  # Start API server

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use carbon_tracker::{
    config::AppConfig,
    engine::{self, compute, derive},
    models::{classify, ActivityRecord, FoodItem, Region, TransportMode, WasteType},
    storage::{Repository, RepositoryExt, SqliteRepository},
    utils::MAX_QUANTITY,
};

#[cfg(feature = "api")]
use carbon_tracker::api;

/// Carbon Tracker - your personal footprint estimator
#[derive(Parser, Debug)]
#[command(name = "carbontrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./carbontrack.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file path, overriding the configuration
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate a footprint offline and print it as JSON
    Calculate {
        /// Transport mode: car, bus, train, subway, flight, walking, bicycle
        #[arg(short, long)]
        mode: Option<String>,
        /// Distance travelled in km
        #[arg(long)]
        distance: Option<f64>,
        /// One serving of a food; repeat for more servings
        #[arg(short, long)]
        food: Vec<String>,
        /// Electricity used in kWh
        #[arg(short, long)]
        energy_kwh: Option<f64>,
        /// Waste disposal: landfill, recycling, composting
        #[arg(short, long)]
        waste_type: Option<String>,
        /// Waste produced in kg
        #[arg(long)]
        waste_amount: Option<f64>,
        /// Country used to pick regional factors
        #[arg(long)]
        country: Option<String>,
    },

    /// Show which region class a country falls in
    Region {
        /// Country name, matched exactly
        country: String,
    },

    /// Create the database schema
    Init,

    /// Show a user's recent calculations
    History {
        /// User id
        #[arg(short, long)]
        user: String,
    },

    /// Show aggregate usage statistics
    Dashboard,

    /// Start the HTTP API server
    #[cfg(feature = "api")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
}

fn non_negative(name: &str, value: Option<f64>) -> anyhow::Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 || v > MAX_QUANTITY => {
            anyhow::bail!("--{} must be between 0 and {}", name, MAX_QUANTITY)
        }
        other => Ok(other),
    }
}

async fn open_repository(config: &AppConfig) -> anyhow::Result<SqliteRepository> {
    SqliteRepository::with_config(&config.database.path, config.database.pool())
        .await
        .with_context(|| format!("opening database {}", config.database.path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber")?;

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    match cli.command {
        Commands::Calculate {
            mode,
            distance,
            food,
            energy_kwh,
            waste_type,
            waste_amount,
            country,
        } => {
            let activity = ActivityRecord {
                transport_mode: mode.map(TransportMode::from),
                transport_distance: non_negative("distance", distance)?,
                food_choices: food.into_iter().map(FoodItem::from).collect(),
                energy_kwh: non_negative("energy-kwh", energy_kwh)?,
                waste_type: waste_type.map(WasteType::from),
                waste_amount: non_negative("waste-amount", waste_amount)?,
            };

            if activity.is_empty() {
                warn!("No activities given, the footprint will be zero");
            }

            let region = match country {
                Some(c) => Region::new(c, "Unknown"),
                None => config.region.clone(),
            };

            let result = compute(&activity, region.class());
            let output = json!({
                "carbon_footprint": &result,
                "region": &region,
                "impact_metrics": derive(result.total),
                "suggestions": engine::fallback(&result),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Region { country } => {
            println!("{}: {}", country, classify(&country));
        }

        Commands::Init => {
            let repo = open_repository(&config).await?;
            repo.initialize().await?;
            info!("Database ready at {}", config.database.path);
            repo.close().await?;
        }

        Commands::History { user } => {
            let repo = open_repository(&config).await?;
            let history = repo.history(&user).await?;

            if history.is_empty() {
                println!("No calculations recorded for {}", user);
            } else {
                for entry in &history {
                    println!(
                        "{}  {:>10.2} kg  (transport {:.2}, food {:.2}, energy {:.2}, waste {:.2})",
                        entry.date.format("%Y-%m-%d %H:%M"),
                        entry.total,
                        entry.breakdown.transport,
                        entry.breakdown.food,
                        entry.breakdown.energy,
                        entry.breakdown.waste,
                    );
                }
            }
            repo.close().await?;
        }

        Commands::Dashboard => {
            let repo = open_repository(&config).await?;
            let stats = repo.dashboard_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            repo.close().await?;
        }

        #[cfg(feature = "api")]
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let repo = open_repository(&config).await?;
            let state = api::AppState::from_config(std::sync::Arc::new(repo), config);
            api::serve(state).await?;
        }
    }

    Ok(())
}
