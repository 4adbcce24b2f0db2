//! Telegram Driver - Telegram webhook adapter for a multi-platform messaging framework
//!
//! This library turns Telegram webhook requests into canonical messages:
//! - Payload parsing with optional, never-failing lookups
//! - Event selection (message, edited message, channel post, callback query)
//! - Request matching with attachment rejection
//! - Outbound Bot API request building and sending
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Webhook server (axum)                   │
//! │   secret check  │  dedup  │  inbox  │  typing       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 TelegramDriver                       │
//! │   payload → event → matcher / message  │  outbound   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            HttpTransport (reqwest)                   │
//! │   Telegram Bot API                                  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod transport;

pub use config::{Config, DriverConfig, ServerConfig, WebhookConfig};
pub use driver::{
    Driver, IncomingMessage, MatchVerdict, OutboundRequest, PeerId, RawUpdate, TelegramDriver,
    build_outbound_request, extract_messages,
};
pub use error::{Error, Result};
pub use transport::{HttpTransport, ReqwestTransport};
