//! Users API server: reads configuration from the environment and serves until Ctrl-C.

use tracing_subscriber::EnvFilter;
use users_api::{serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("users_api=info")),
        )
        .init();

    tracing::debug!(?config, "configuration loaded");
    serve(config).await?;
    Ok(())
}
