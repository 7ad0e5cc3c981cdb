//! Runs a Salvo server with the in-memory player registry.
//!
//! Listens on `0.0.0.0:$PORT` (default 3000). Log filtering follows
//! `RUST_LOG`, defaulting to `info`.

use salvo::prelude::*;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), SalvoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let server = SalvoServerBuilder::new()
        .bind(&format!("0.0.0.0:{port}"))
        .engine_config(EngineConfig::default())
        .build(PlayerRegistry::new())
        .await?;

    server.run().await
}
