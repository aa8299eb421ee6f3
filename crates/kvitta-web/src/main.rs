//! Kvitta Web Server
//!
//! Run with: cargo run -p kvitta-web

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kvitta_web::config::Config;
use kvitta_web::router::build_router;
use kvitta_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development keeps secrets in .env; missing file is fine.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    info!("Server listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
