use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_scanner::api::router;
use course_scanner::catalog::{CatalogConfig, CatalogHttpClient};
use course_scanner::config::ServerConfig;
use course_scanner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_scanner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::new_from_env()?;
    let catalog_config = CatalogConfig::new_from_env()?;
    info!("using course catalog at {}", catalog_config.base_url);

    let catalog = Arc::new(CatalogHttpClient::new(catalog_config)?);
    let state = AppState { catalog };

    let app = router(state);

    info!("listening on http://{}", server.bind_addr);

    let listener = tokio::net::TcpListener::bind(server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
