//! oVirt exporter library
//!
//! Polls the oVirt engine REST API for hosts, virtual machines and storage
//! domains and republishes their state and statistics as Prometheus metrics.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod logging;
pub mod metric;
pub mod server;
pub mod shutdown;

// Application state
pub mod state;
pub use state::AppState;

pub use error::{ExporterError, Result};
