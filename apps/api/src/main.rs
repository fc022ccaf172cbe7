mod auth;
mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;
mod tasks;
mod uploads;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, MemoryStore, SessionManagerLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::session_key;
use crate::auth::store::{MemoryUserStore, PgUserStore, UserStore};
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_api_base,
        &config.gemini_model,
    )?;
    if config.gemini_api_key.is_some() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("GEMINI_API_KEY not set; AI endpoints will answer 500");
    }

    let (users, registration_open) = connect_user_store(&config).await?;
    info!("User store: {}", users.backend());

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let state = AppState {
        llm: Arc::new(llm),
        users,
        registration_open,
        upload_dir: config.upload_dir.clone(),
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)))
        .with_signed(session_key(config.secret_key.as_deref()));

    let app = build_router(state, &config.static_dir)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend is served from a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres when reachable. Otherwise the single demo account, if allowed;
/// registration stays closed in that mode.
async fn connect_user_store(config: &Config) -> Result<(Arc<dyn UserStore>, bool)> {
    let postgres = async {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is not set")?;
        let pool = create_pool(url).await?;
        ensure_schema(&pool).await?;
        anyhow::Ok(PgUserStore::new(pool))
    };

    match postgres.await {
        Ok(store) => Ok((Arc::new(store), true)),
        Err(e) if config.demo_fallback => {
            warn!(
                "User database unavailable ({e:#}); falling back to demo account '{}'",
                config.demo_username
            );
            let store = MemoryUserStore::with_account(&config.demo_username, &config.demo_password)?;
            Ok((Arc::new(store), false))
        }
        Err(e) => Err(e.context("user database unavailable and DEMO_FALLBACK is off")),
    }
}
