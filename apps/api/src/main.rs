mod config;
mod errors;
mod models;
mod routes;
mod seed;
mod sim;
mod state;
mod store;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::seed::seed_if_empty;
use crate::sim::Simulation;
use crate::state::AppState;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Open the embedded store and seed it on first run. A seeding
    // failure aborts startup.
    let store = Store::open(&config.db_path)?;
    let mut rng = StdRng::from_entropy();
    if seed_if_empty(&store, &mut rng)? {
        info!("seeded initial dataset into {}", config.db_path);
    }

    let sim = match config.sim_seed {
        Some(seed) => Simulation::seeded(seed),
        None => Simulation::new(),
    };
    let state = AppState { store, sim };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
