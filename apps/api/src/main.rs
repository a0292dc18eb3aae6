mod admission;
mod analysis;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod records;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::admission::AdmissionGate;
use crate::analysis::analyzer::LlmAnalyzer;
use crate::analysis::cache::CompatibilityCache;
use crate::analysis::service::CompatibilityService;
use crate::config::Config;
use crate::db::create_pool;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::llm_client::{CompletionGateway, LlmClient};
use crate::records::PgRecordStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::RedisStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (profiles, postings, audit ledger, variants)
    let db = create_pool(&config.database_url).await?;
    let records = Arc::new(PgRecordStore::new(db));

    // Initialize Redis (ephemeral cache tier + rate counters)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let kv = Arc::new(RedisStore::new(redis));
    info!("Redis client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_gateway_url.clone(),
    )?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm_client::MODEL,
        llm.endpoint()
    );
    let gateway: Arc<dyn CompletionGateway> = Arc::new(llm);

    let gate = AdmissionGate::new(kv.clone(), config.rate_limits);
    info!("Rate limits: {:?}", gate.limits());

    let cache = CompatibilityCache::new(kv, records.clone());
    let compatibility = CompatibilityService::new(
        records.clone(),
        cache,
        Arc::new(LlmAnalyzer::new(gateway.clone())),
    );

    // Build app state
    let state = AppState {
        gate: Arc::new(gate),
        compatibility: Arc::new(compatibility),
        orchestrator: Arc::new(GenerationOrchestrator::new(gateway)),
        records,
        trusted_proxy_hops: config.trusted_proxy_hops,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
