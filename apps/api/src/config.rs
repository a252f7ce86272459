use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a workable default; this is a one-process prototype.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub rust_log: String,
    /// When set, the latency/failure simulation draws from a seeded
    /// RNG so a demo run is reproducible.
    pub sim_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            db_path: std::env::var("TALENTFLOW_DB")
                .unwrap_or_else(|_| "talentflow.redb".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            sim_seed: match std::env::var("TALENTFLOW_SIM_SEED") {
                Ok(raw) => Some(
                    raw.parse::<u64>()
                        .context("TALENTFLOW_SIM_SEED must be an integer")?,
                ),
                Err(_) => None,
            },
        })
    }
}
