pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use error::{DataError, DataResult};
pub use models::*;

use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
}

impl AppState {
    /// State seeded with the configured synthetic table, like the dashboard's
    /// default "generate sample" mode.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::with_generated_data(config.clone())?
        );

        Ok(Self {
            config,
            recommendation_service,
        })
    }

    /// State with an empty rating table.
    pub fn empty(config: Config) -> Self {
        let config = Arc::new(config);
        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::new(config.clone())
        );

        Self {
            config,
            recommendation_service,
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
