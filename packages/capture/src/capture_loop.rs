//! The recurring scrape-forward-advance driver.
//!
//! One tick: snapshot the page, run the extraction engine, forward whatever
//! came out, nudge the page to reveal more content. The period is
//! deliberately slow (seconds, not milliseconds) so the loop never outruns
//! the host page's own lazy rendering.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ForwardError;
use crate::extract::scrape_snapshot;
use crate::traits::{BatchSink, SnapshotSource};

#[derive(Debug, Clone)]
pub struct CaptureLoopConfig {
    /// Tick period.
    pub period: Duration,
    /// Downward viewport nudge per tick, in pixels.
    pub scroll_step: i64,
}

impl Default for CaptureLoopConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(4),
            scroll_step: 150,
        }
    }
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Timer-driven capture loop with idempotent start/stop.
pub struct CaptureLoop {
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn BatchSink>,
    config: CaptureLoopConfig,
    running: Mutex<Option<RunningLoop>>,
}

impl CaptureLoop {
    pub fn new(source: Arc<dyn SnapshotSource>, sink: Arc<dyn BatchSink>) -> Self {
        Self::with_config(source, sink, CaptureLoopConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn SnapshotSource>,
        sink: Arc<dyn BatchSink>,
        config: CaptureLoopConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
            running: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap()
            .as_ref()
            .map(|run| !run.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start ticking. A no-op while already running. The first tick fires
    /// immediately.
    pub fn start(&self) {
        let mut running = self.running.lock().unwrap();
        if running.as_ref().is_some_and(|run| !run.handle.is_finished()) {
            return;
        }

        info!(period = ?self.config.period, "starting capture loop");
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let source = Arc::clone(&self.source);
        let sink = Arc::clone(&self.sink);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !tick(source.as_ref(), sink.as_ref(), &config).await {
                    break;
                }
            }
            debug!("capture loop task exited");
        });

        *running = Some(RunningLoop { cancel, handle });
    }

    /// Cancel the recurring timer. A no-op while already stopped. An
    /// in-flight tick finishes on its own.
    pub fn stop(&self) {
        let mut running = self.running.lock().unwrap();
        if let Some(run) = running.take() {
            info!("stopping capture loop");
            run.cancel.cancel();
        }
    }
}

/// Returns false when the loop must halt.
async fn tick(source: &dyn SnapshotSource, sink: &dyn BatchSink, config: &CaptureLoopConfig) -> bool {
    let snapshot = source.snapshot().await;
    let records = scrape_snapshot(&snapshot);

    if !records.is_empty() {
        debug!(count = records.len(), "scraped posts");
        match sink.forward(&records).await {
            Ok(()) => {}
            Err(ForwardError::ContextInvalidated) => {
                error!("host context invalidated; stopping capture loop");
                return false;
            }
            Err(err) => {
                // The batch is lost, but the next tick re-discovers the same
                // posts and the hub ingests idempotently.
                warn!(error = %err, "failed to forward batch; retrying on next tick");
            }
        }
    }

    source.advance(config.scroll_step).await;
    true
}
