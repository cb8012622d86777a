//! Dealdesk - real-estate deal listings, ROI analysis and AI advisory API

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealdesk::ai::{AdvisorModel, GeminiClient, MockModel};
use dealdesk::analysis::calculate_roi;
use dealdesk::api::{self, AppState};
use dealdesk::config::Config;
use dealdesk::store::{DocumentStore, FirestoreStore, MemoryStore};

#[derive(Parser)]
#[command(name = "dealdesk")]
#[command(about = "Real-estate deal listings, ROI analysis and AI advisory API")]
#[command(version)]
struct Cli {
    /// Path to a config file (default: ~/.config/dealdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Use an in-process store instead of Firestore (local development)
        #[arg(long)]
        in_memory: bool,
    },

    /// Compute the ROI for a deal without starting the server
    Analyze {
        purchase_price: f64,
        rehab_cost: f64,
        arv: f64,
        holding_costs: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("dealdesk={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load_from_path(path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Commands::Serve { port, in_memory } => {
            let port = port.unwrap_or(config.http_port);
            let state = initialize_state(&config, in_memory)?;

            tracing::info!("Starting HTTP server on port {}", port);

            let router = api::create_router(state);
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

            println!("Dealdesk server running at http://localhost:{}", port);
            println!("  API:      http://localhost:{}/api/...", port);
            println!("  API Docs: http://localhost:{}/api/docs", port);
            println!("  Health:   http://localhost:{}/health", port);

            axum::serve(listener, router).await?;
        }

        Commands::Analyze {
            purchase_price,
            rehab_cost,
            arv,
            holding_costs,
        } => {
            let total_investment = purchase_price + rehab_cost + holding_costs;
            let roi = calculate_roi(purchase_price, rehab_cost, arv, holding_costs)?;

            println!("Deal Analysis");
            println!("=============");
            println!("Purchase price:   {:>12.2}", purchase_price);
            println!("Rehab cost:       {:>12.2}", rehab_cost);
            println!("Holding costs:    {:>12.2}", holding_costs);
            println!("Total investment: {:>12.2}", total_investment);
            println!("ARV:              {:>12.2}", arv);
            println!("Net profit:       {:>12.2}", arv - total_investment);
            println!();
            println!("ROI: {:.2}%", roi);
        }
    }

    Ok(())
}

fn initialize_state(config: &Config, in_memory: bool) -> anyhow::Result<AppState> {
    let store: Arc<dyn DocumentStore> = if in_memory {
        tracing::info!("Using in-memory document store");
        Arc::new(MemoryStore::new())
    } else {
        if config.firestore.project_id.is_empty() {
            anyhow::bail!(
                "Firestore project id is not configured. Set FIRESTORE_PROJECT_ID or use --in-memory."
            );
        }
        let token = std::env::var("FIRESTORE_ACCESS_TOKEN").map_err(|_| {
            anyhow::anyhow!("FIRESTORE_ACCESS_TOKEN is not set (e.g. `gcloud auth print-access-token`)")
        })?;
        Arc::new(FirestoreStore::new(
            &config.firestore.project_id,
            &config.firestore.database_id,
            token,
        ))
    };

    let model: Arc<dyn AdvisorModel> = match std::env::var("GEMINI_API_KEY") {
        Ok(key) => Arc::new(GeminiClient::new(key, config.gemini.model.clone())),
        Err(_) if in_memory => {
            tracing::warn!("GEMINI_API_KEY not set, answering with a mock model");
            Arc::new(MockModel::default())
        }
        Err(_) => anyhow::bail!("GEMINI_API_KEY is not set"),
    };

    Ok(AppState { store, model })
}
