mod cors;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use gateway::GenerationGateway;
use hush_config::Config;
use hush_core::{HttpTransport, Transport};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration with the real HTTP transport
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or a provider cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.upstream.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build the server over an arbitrary transport
    ///
    /// # Errors
    ///
    /// Returns an error if a provider cannot be initialized
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let narrator = narration::build_narrator(config, transport.clone())?;
        let speech = speech::build_service(config, transport)?;
        let gateway = Arc::new(GenerationGateway::new(narrator.clone(), speech.clone()));

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app
            .merge(narration::endpoint_router().with_state(narrator))
            .merge(speech::endpoint_router().with_state(speech))
            .merge(gateway::endpoint_router().with_state(gateway));

        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
