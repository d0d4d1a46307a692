use anyhow::Context;
use tokio_util::sync::CancellationToken;

use donation_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    donation_observability::init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    tracing::info!(?config, "starting donation server");

    let server = Server::bind(&config).await;
    if server.bound_endpoints() == 0 {
        anyhow::bail!("no endpoint could be bound");
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            shutdown.cancel();
        });
    }

    server.run(shutdown).await;
    Ok(())
}
