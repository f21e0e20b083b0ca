//! Client facade for quarry requests
//!
//! The crate does not open connections. Callers provide a [`Transport`] that
//! turns a method, path and body into a status, headers and a response body;
//! [`Client`] compiles requests, applies [`ClientConfig`] defaults, sends them
//! through the transport and decodes the responses.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use transport::{Method, Transport, TransportError, TransportRequest, TransportResponse};
