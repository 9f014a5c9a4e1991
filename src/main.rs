mod catalog;
mod clock;
mod config;
mod db;
mod error;
mod history;
mod llm;
mod prompt;
mod quota;
mod rate_limit;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use clock::{Clock, SystemClock};
use store::{KvStore, MemoryKvStore, PgKvStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (chat_store, quota_store): (Arc<dyn KvStore>, Arc<dyn KvStore>) = match &config.database_url {
        Some(database_url) => {
            let pool = db::init_pool(database_url).await?;
            tracing::info!(
                chat = %config.chat_store_namespace,
                quota = %config.quota_store_namespace,
                "using postgres stores"
            );
            (
                Arc::new(PgKvStore::new(pool.clone(), config.chat_store_namespace.clone())),
                Arc::new(PgKvStore::new(pool, config.quota_store_namespace.clone())),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores; history and counters reset on restart");
            (Arc::new(MemoryKvStore::new(clock.clone())), Arc::new(MemoryKvStore::new(clock.clone())))
        }
    };

    if config.credentials.is_empty() {
        tracing::warn!("no LLM_API_KEY credentials configured; chat requests will fail");
    } else {
        let fingerprints: Vec<&str> = config
            .credentials
            .iter()
            .map(quota::Credential::fingerprint)
            .collect();
        tracing::info!(count = fingerprints.len(), ?fingerprints, "credentials loaded");
    }

    // Non-fatal: the chat route reports a configuration error instead.
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; chat disabled");
            None
        }
    };

    let port = config.port;
    let state = state::AppState::new(config, llm, chat_store, quota_store, clock)?;
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "storefront assistant listening");
    axum::serve(listener, app).await?;
    Ok(())
}
