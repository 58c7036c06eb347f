mod analysis;
mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::alignment::BucketOverlapScorer;
use crate::analysis::overview::OverviewCache;
use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Interview Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let llm: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(api_key) => {
            let client = LlmClient::new(
                api_key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )?;
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set; overviews and transcript summaries are disabled");
            None
        }
    };

    let state = AppState {
        llm,
        config: config.clone(),
        scorer: Arc::new(BucketOverlapScorer),
        overview_cache: Arc::new(OverviewCache::new(config.overview_cache_capacity)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
