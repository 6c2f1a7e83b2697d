//! HTTP JSON API for basho.
//!
//! Serves prefecture lists, municipalities per prefecture, and postal code
//! lookups for address forms. List responses carry a public `Cache-Control`
//! header since the underlying data changes only with a new release.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::BashoServer;
