use tracing_subscriber::EnvFilter;

use taskdeck::{api, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        "Starting taskdeck server"
    );

    api::serve(config).await
}
