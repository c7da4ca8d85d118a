pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod handler;
pub mod logging;
pub mod message;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use api::{ApiClient, QueryBackend, QueryRequest, QueryResponse};
pub use config::Config;
pub use controller::{BusyState, ChatController, Controls, Focus};
pub use error::ApiError;
pub use format::{format_message, FormattedLine};
pub use message::{Message, MessageLog, Role};
