//! Request-driven, serialized scrape trigger
//!
//! Every metrics request asks the trigger for a snapshot. At most one scrape
//! runs at a time; a request that had to wait while another scrape finished
//! is served that scrape's snapshot instead of starting a new one.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::metrics;
use crate::scrape::{Scraper, Snapshot, SnapshotStore};

/// Serializes scrapes and installs their results in the store
#[derive(Clone)]
pub struct ScrapeTrigger {
    scraper: Arc<Scraper>,
    store: Arc<SnapshotStore>,
    lock: Arc<Mutex<()>>,
}

impl ScrapeTrigger {
    pub fn new(scraper: Arc<Scraper>, store: Arc<SnapshotStore>) -> Self {
        Self {
            scraper,
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn scraper(&self) -> &Arc<Scraper> {
        &self.scraper
    }

    /// Snapshot produced by a scrape that completed after this call began
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        let seen = self.store.generation();
        let guard = self.lock.clone().lock_owned().await;

        let current = self.store.read();
        if current.generation > seen {
            tracing::debug!(
                generation = current.generation,
                "Serving snapshot from concurrent scrape"
            );
            return current;
        }

        // The guard moves into the task so that an abandoned request neither
        // cancels the scrape nor releases the lock before the store is updated
        let scraper = self.scraper.clone();
        let store = self.store.clone();
        let task = tokio::spawn(async move {
            let snapshot = run_scrape(scraper, store).await;
            drop(guard);
            snapshot
        });

        match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Scrape task failed, serving previous snapshot");
                self.store.read()
            }
        }
    }
}

async fn run_scrape(scraper: Arc<Scraper>, store: Arc<SnapshotStore>) -> Arc<Snapshot> {
    let started = Instant::now();
    tracing::debug!(users = scraper.users().len(), "Scrape started");

    match tokio::task::spawn_blocking(move || scraper.scrape()).await {
        Ok(snapshot) => {
            metrics::record_scrape(started.elapsed().as_secs_f64());
            let snapshot = store.replace(snapshot);
            tracing::info!(
                generation = snapshot.generation,
                total = snapshot.total_count,
                records = snapshot.records.len(),
                skipped = snapshot.errors.total(),
                duration_ms = snapshot.duration.as_millis() as u64,
                "Scrape completed"
            );
            snapshot
        }
        Err(e) => {
            metrics::record_scrape_failure();
            tracing::error!(error = %e, "Scrape aborted, keeping previous snapshot");
            store.read()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ExecutionLog, MemoryLog, MemorySchedules, SourceResult};

    fn trigger(schedules: MemorySchedules) -> ScrapeTrigger {
        let scraper = Scraper::new(
            vec!["ops".to_string()],
            Arc::new(schedules),
            Arc::new(MemoryLog::new(Vec::<String>::new())),
        );
        ScrapeTrigger::new(Arc::new(scraper), Arc::new(SnapshotStore::new()))
    }

    #[tokio::test]
    async fn test_each_request_scrapes() {
        let trigger = trigger(MemorySchedules::new().with_user("ops", ["0 4 * * * /bin/true"]));

        let first = trigger.snapshot().await;
        let second = trigger.snapshot().await;

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(second.records.len(), 1);
    }

    struct PanickingLog;

    impl ExecutionLog for PanickingLog {
        fn read_log(&self, _tag: &str) -> SourceResult<Vec<String>> {
            panic!("log reader crashed");
        }
    }

    #[tokio::test]
    async fn test_panic_keeps_previous_snapshot() {
        let store = Arc::new(SnapshotStore::new());
        let good = ScrapeTrigger::new(
            Arc::new(Scraper::new(
                vec!["ops".to_string()],
                Arc::new(MemorySchedules::new().with_user("ops", ["0 4 * * * /bin/true"])),
                Arc::new(MemoryLog::new(Vec::<String>::new())),
            )),
            store.clone(),
        );
        assert_eq!(good.snapshot().await.records.len(), 1);

        let broken = ScrapeTrigger::new(
            Arc::new(Scraper::new(
                vec!["ops".to_string()],
                Arc::new(MemorySchedules::new()),
                Arc::new(PanickingLog),
            )),
            store.clone(),
        );
        let served = broken.snapshot().await;

        assert_eq!(served.generation, 1);
        assert_eq!(served.records.len(), 1);
        assert_eq!(store.generation(), 1);
    }
}
