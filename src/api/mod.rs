//! HTTP API server for the Telegram driver

pub mod health;
pub mod webhooks;

use std::sync::{Arc, Mutex};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use self::webhooks::telegram::UpdateDedup;
use crate::Result;
use crate::config::{DriverConfig, WebhookConfig};
use crate::driver::IncomingMessage;
use crate::transport::HttpTransport;

/// Shared state for API handlers
pub struct ApiState {
    /// Config handed to every per-request driver
    pub driver_config: Arc<DriverConfig>,

    /// Webhook handling options
    pub webhook: WebhookConfig,

    /// Outbound transport for the typing indicator
    pub transport: Option<Arc<dyn HttpTransport>>,

    /// Where normalized messages are forwarded
    pub inbox: Option<mpsc::Sender<IncomingMessage>>,

    /// Recently seen update ids
    pub dedup: Mutex<UpdateDedup>,
}

impl ApiState {
    /// State with no transport and no inbox
    #[must_use]
    pub fn new(driver_config: DriverConfig, webhook: WebhookConfig) -> Self {
        Self {
            driver_config: Arc::new(driver_config),
            webhook,
            transport: None,
            inbox: None,
            dedup: Mutex::new(UpdateDedup::default()),
        }
    }

    /// Send outbound calls through this transport
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Forward normalized messages to this channel
    #[must_use]
    pub fn with_inbox(mut self, inbox: mpsc::Sender<IncomingMessage>) -> Self {
        self.inbox = Some(inbox);
        self
    }
}

/// Build the full router: webhooks, health, and request tracing
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .nest("/api/webhooks", webhooks::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    bind_addr: String,
}

impl ApiServer {
    /// Create a new API server
    #[must_use]
    pub fn new(state: ApiState, bind_addr: impl Into<String>) -> Self {
        Self {
            state: Arc::new(state),
            bind_addr: bind_addr.into(),
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind {}: {e}", self.bind_addr)))?;

        tracing::info!(addr = %self.bind_addr, "webhook server listening");

        axum::serve(listener, router(self.state)).await?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
