//! Exporter server implementation
//!
//! Wires the scraper, snapshot store and scrape trigger into an axum
//! application.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ConfigError};
use crate::scrape::{Scraper, SnapshotStore};

use super::api::create_router;
use super::trigger::ScrapeTrigger;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Serialized scrape trigger, owner of the snapshot store
    pub trigger: Arc<ScrapeTrigger>,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: Arc<Config>,
}

// ============================================================================
// Exporter Server
// ============================================================================

/// HTTP server exposing cron metrics
pub struct ExporterServer {
    config: Arc<Config>,
    bind_address: SocketAddr,
    state: AppState,
}

impl ExporterServer {
    /// Create a server scraping the system crontabs and syslog
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let scraper = Scraper::from_config(&config);
        Self::with_scraper(config, scraper)
    }

    /// Create a server around an existing scraper
    pub fn with_scraper(config: Config, scraper: Scraper) -> Result<Self, ServerError> {
        config.validate()?;
        let bind_address = config.bind_address()?;
        let config = Arc::new(config);

        let trigger = Arc::new(ScrapeTrigger::new(
            Arc::new(scraper),
            Arc::new(SnapshotStore::new()),
        ));

        let state = AppState {
            trigger,
            start_time: Instant::now(),
            config: config.clone(),
        };

        Ok(Self {
            config,
            bind_address,
            state,
        })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                address: self.bind_address,
                source,
            })?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let local = listener.local_addr().unwrap_or(self.bind_address);

        tracing::info!(
            address = %local,
            metrics_path = %self.config.server.metrics_path,
            users = ?self.config.cron.users,
            "Starting cron exporter"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("Cron exporter shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.bind_address,
            metrics_path: self.config.server.metrics_path.clone(),
            users: self.config.cron.users.clone(),
            syslog_file: self.config.cron.syslog_file.display().to_string(),
            request_logging_enabled: self.config.server.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub metrics_path: String,
    pub users: Vec<String>,
    pub syslog_file: String,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Cron Exporter\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Metrics Path: {}\n\
             Users: {}\n\
             Syslog File: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.metrics_path,
            self.users.join(","),
            self.syslog_file,
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryLog, MemorySchedules};

    fn scraper() -> Scraper {
        Scraper::new(
            vec!["ops".to_string()],
            Arc::new(MemorySchedules::new().with_user("ops", ["0 4 * * * /bin/true"])),
            Arc::new(MemoryLog::new(Vec::<String>::new())),
        )
    }

    #[test]
    fn test_server_creation() {
        let server = ExporterServer::with_scraper(Config::default(), scraper());
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.metrics_path = "/".to_string();
        let result = ExporterServer::with_scraper(config, scraper());
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_server_info() {
        let server = ExporterServer::with_scraper(Config::default(), scraper()).unwrap();
        let info = server.info();

        assert_eq!(info.bind_address.port(), 9114);
        assert_eq!(info.metrics_path, "/metrics");
        assert!(info.display().contains("Users: ubuntu,user2,user3"));
    }

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let mut config = Config::default();
        config.server.listen_address = "127.0.0.1:0".to_string();
        let server = ExporterServer::with_scraper(config, scraper()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = server.serve(listener, async {}).await;
        assert!(result.is_ok());
    }
}
