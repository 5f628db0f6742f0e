//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use gatekeep::auth::TokenIssuer;
use gatekeep::config::Config;
use gatekeep::db::{self, MemoryUserStore, PgUserStore, UserStore};
use gatekeep::{create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; signing tokens with the insecure built-in secret");
    }

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            let store = PgUserStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; users are kept in memory only");
            Arc::new(MemoryUserStore::new())
        }
    };

    let tokens = TokenIssuer::new(&config.jwt_secret);
    let app = create_app(AppState::new(store, tokens));

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
