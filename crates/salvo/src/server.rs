//! `SalvoServer` builder and accept loop.
//!
//! This is the entry point for running a Salvo server. It ties the
//! layers together: WebSocket → protocol → identity → engine.

use std::net::SocketAddr;
use std::sync::Arc;

use salvo_engine::{Engine, EngineConfig};
use salvo_identity::Authenticator;
use salvo_protocol::{Codec, JsonCodec};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::hub::ConnectionHub;
use crate::SalvoError;

/// Shared server state passed to each connection task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The engine
/// owns the hub as its event sink.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) engine: Engine<ConnectionHub>,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

impl<A: Authenticator, C: Codec> ServerState<A, C> {
    pub(crate) fn hub(&self) -> &ConnectionHub {
        self.engine.sink()
    }
}

/// Builder for configuring and starting a Salvo server.
///
/// # Example
///
/// ```rust,no_run
/// use salvo::prelude::*;
///
/// # async fn run() -> Result<(), SalvoError> {
/// let server = SalvoServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .build(PlayerRegistry::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SalvoServerBuilder {
    bind_addr: String,
    engine_config: EngineConfig,
}

impl SalvoServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            engine_config: EngineConfig::default(),
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the engine configuration.
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Binds the listener and builds the engine with `auth` resolving
    /// identities. Frames are JSON.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<SalvoServer<A, JsonCodec>, SalvoError> {
        let engine = Engine::new(self.engine_config, ConnectionHub::new())?;
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "listening");

        let state = Arc::new(ServerState {
            engine,
            auth,
            codec: JsonCodec,
        });

        Ok(SalvoServer { listener, state })
    }
}

impl Default for SalvoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Salvo server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SalvoServer<A: Authenticator, C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Codec> SalvoServer<A, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted socket gets its own task, which performs the
    /// WebSocket upgrade and then serves the connection.
    pub async fn run(self) -> Result<(), SalvoError> {
        tracing::info!("Salvo server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
