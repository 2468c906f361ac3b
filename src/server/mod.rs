//! HTTP surface of the exporter
//!
//! ```text
//! GET /            landing page linking to the metrics path
//! GET /metrics     serialized scrape, Prometheus text format
//! GET /health      JSON liveness report
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cron_exporter::config::Config;
//! use cron_exporter::server::ExporterServer;
//!
//! let server = ExporterServer::new(Config::default())?;
//! server.start_with_shutdown(shutdown_signal()).await?;
//! ```

pub mod api;
#[allow(clippy::module_inception)]
pub mod server;
pub mod trigger;

pub use api::{create_router, HealthResponse};
pub use server::{AppState, ExporterServer, ServerError, ServerInfo};
pub use trigger::ScrapeTrigger;
