//! Prometheus exposition for cron snapshots
//!
//! This module provides two kinds of metrics:
//! - Snapshot gauges: rebuilt from scratch for every response, so a series
//!   for a removed crontab line disappears with the next scrape
//! - Exporter self-metrics: process-lifetime counters in the default registry
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register the self-metrics.
//! If initialization fails, self-metric operations become no-ops and snapshot
//! encoding still works.

use prometheus::{
    register_counter, register_histogram, Counter, Encoder, Gauge, GaugeVec, Histogram, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;
use thiserror::Error;

use crate::scrape::Snapshot;

/// Namespace shared by every exported metric
pub const NAMESPACE: &str = "cron";

/// Label names of `cron_status`
pub const STATUS_LABELS: [&str; 6] = [
    "user",
    "pattern",
    "readable",
    "command",
    "nextrun",
    "previousrun",
];

/// Metrics encoding errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoded metrics are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ============================================================================
// Exporter Self-Metrics
// ============================================================================

/// Container for exporter process metrics
struct ExporterMetrics {
    scrapes: Counter,
    scrape_failures: Counter,
    scrape_duration: Histogram,
}

/// Global storage for exporter metrics
static EXPORTER_METRICS: OnceLock<ExporterMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Register exporter self-metrics in the default registry
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() -> Result<(), MetricsError> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = ExporterMetrics {
        scrapes: register_counter!(
            "cron_exporter_scrapes_total",
            "Total number of crontab scrapes performed"
        )?,
        scrape_failures: register_counter!(
            "cron_exporter_scrape_failures_total",
            "Total number of scrapes that aborted before producing a snapshot"
        )?,
        scrape_duration: register_histogram!(
            "cron_exporter_scrape_duration_seconds",
            "Time spent scraping crontabs and the execution log",
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
    };

    // Only fails if another thread won the race, which the flag above prevents
    EXPORTER_METRICS.set(metrics).ok();

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if self-metrics have been initialized
pub fn metrics_initialized() -> bool {
    EXPORTER_METRICS.get().is_some()
}

/// Record a completed scrape
pub fn record_scrape(duration_secs: f64) {
    if let Some(m) = EXPORTER_METRICS.get() {
        m.scrapes.inc();
        m.scrape_duration.observe(duration_secs);
    }
}

/// Record a scrape that aborted
pub fn record_scrape_failure() {
    if let Some(m) = EXPORTER_METRICS.get() {
        m.scrape_failures.inc();
    }
}

// ============================================================================
// Snapshot Encoding
// ============================================================================

fn gauge(registry: &Registry, name: &str, help: &str, value: f64) -> Result<(), MetricsError> {
    let gauge = Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    gauge.set(value);
    registry.register(Box::new(gauge))?;
    Ok(())
}

/// Registry holding the gauges for one snapshot
pub fn snapshot_registry(snapshot: &Snapshot) -> Result<Registry, MetricsError> {
    let registry = Registry::new();

    gauge(
        &registry,
        "total_crons",
        "Total no of crons",
        snapshot.total_count as f64,
    )?;

    let status = GaugeVec::new(
        Opts::new("status", "cronjob last running status").namespace(NAMESPACE),
        &STATUS_LABELS,
    )?;
    for record in &snapshot.records {
        let next_run = record.next_run_label();
        let previous_run = record.previous_run_label();
        status
            .with_label_values(&[
                record.user.as_str(),
                record.pattern.as_str(),
                record.human_readable.as_str(),
                record.command.as_str(),
                next_run.as_str(),
                previous_run.as_str(),
            ])
            .set(record.outcome.as_gauge());
    }
    registry.register(Box::new(status))?;

    gauge(
        &registry,
        "parse_errors",
        "Crontab lines skipped as malformed in the last scrape",
        snapshot.errors.parse_errors as f64,
    )?;
    gauge(
        &registry,
        "occurrence_errors",
        "Crontab entries without an occurrence in the search window",
        snapshot.errors.occurrence_errors as f64,
    )?;
    gauge(
        &registry,
        "user_errors",
        "Users whose crontab could not be read in the last scrape",
        snapshot.errors.user_errors as f64,
    )?;
    gauge(
        &registry,
        "log_available",
        "Whether the execution log could be read (1 = yes, 0 = no)",
        if snapshot.log_available { 1.0 } else { 0.0 },
    )?;

    if let Some(generated_at) = snapshot.generated_at {
        gauge(
            &registry,
            "last_scrape_timestamp_seconds",
            "Unix time the current snapshot was produced",
            generated_at.timestamp() as f64,
        )?;
        gauge(
            &registry,
            "last_scrape_duration_seconds",
            "Duration of the scrape that produced the current snapshot",
            snapshot.duration.as_secs_f64(),
        )?;
    }

    Ok(registry)
}

/// Encode a snapshot plus self-metrics in Prometheus text format
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, MetricsError> {
    let mut families = snapshot_registry(snapshot)?.gather();
    families.extend(prometheus::gather());

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Content type of [`encode_snapshot`] output
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::ExecutionOutcome;
    use crate::scrape::{MetricRecord, ScrapeErrors};
    use chrono::{Local, NaiveDate};

    fn snapshot() -> Snapshot {
        let t = |d, h, m| {
            NaiveDate::from_ymd_opt(2026, 10, d)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        Snapshot {
            total_count: 3,
            records: vec![
                MetricRecord {
                    user: "ops".to_string(),
                    pattern: "*/15 9-17 * * 1-5".to_string(),
                    human_readable: "every 15 minutes".to_string(),
                    command: "/usr/bin/backup.sh".to_string(),
                    next_run: t(19, 9, 0),
                    previous_run: t(16, 17, 45),
                    outcome: ExecutionOutcome::Success,
                },
                MetricRecord {
                    user: "ops".to_string(),
                    pattern: "0 4 * * *".to_string(),
                    human_readable: "every day at 04:00".to_string(),
                    command: "/usr/bin/report.sh".to_string(),
                    next_run: t(18, 4, 0),
                    previous_run: t(17, 4, 0),
                    outcome: ExecutionOutcome::Failure,
                },
            ],
            errors: ScrapeErrors {
                parse_errors: 1,
                occurrence_errors: 0,
                user_errors: 2,
            },
            log_available: true,
            generated_at: Some(Local::now()),
            ..Snapshot::empty()
        }
    }

    #[test]
    fn test_init_metrics() {
        assert!(init_metrics().is_ok());
        // Second call should also be Ok (idempotent)
        assert!(init_metrics().is_ok());
        assert!(metrics_initialized());
    }

    #[test]
    fn test_encode_snapshot() {
        let text = encode_snapshot(&snapshot()).unwrap();

        assert!(text.contains("# TYPE cron_total_crons gauge"));
        assert!(text.contains("cron_total_crons 3"));
        assert!(text.contains("cron_parse_errors 1"));
        assert!(text.contains("cron_user_errors 2"));
        assert!(text.contains("cron_log_available 1"));

        let backup = text
            .lines()
            .find(|l| l.starts_with("cron_status{") && l.contains("backup.sh"))
            .unwrap();
        for label in [
            r#"user="ops""#,
            r#"pattern="*/15 9-17 * * 1-5""#,
            r#"readable="every 15 minutes""#,
            r#"command="/usr/bin/backup.sh""#,
            r#"nextrun="2026-10-19 09:00""#,
            r#"previousrun="2026-10-16 17:45""#,
        ] {
            assert!(backup.contains(label), "missing {} in {}", label, backup);
        }
        assert!(backup.ends_with(" 1"));
    }

    #[test]
    fn test_failure_gauge_zero() {
        let text = encode_snapshot(&snapshot()).unwrap();
        let line = text
            .lines()
            .find(|l| l.starts_with("cron_status{") && l.contains("report.sh"))
            .unwrap();
        assert!(line.ends_with(" 0"));
    }

    #[test]
    fn test_empty_snapshot_encodes() {
        let text = encode_snapshot(&Snapshot::empty()).unwrap();
        assert!(text.contains("cron_total_crons 0"));
        assert!(!text.contains("cron_last_scrape_timestamp_seconds"));
    }

    #[test]
    fn test_registry_is_per_snapshot() {
        // Building twice must not hit duplicate registration errors
        assert!(snapshot_registry(&snapshot()).is_ok());
        assert!(snapshot_registry(&snapshot()).is_ok());
    }

    #[test]
    fn test_metrics_noop_without_init() {
        record_scrape(0.01);
        record_scrape_failure();
    }

    #[test]
    fn test_content_type() {
        assert!(content_type().starts_with("text/plain"));
    }
}
