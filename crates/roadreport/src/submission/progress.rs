//! Simulated upload progress.
//!
//! The HTTP client gives no byte-level feedback for a multipart body, so the
//! progress value advances on a timer while the request is in flight. It is
//! held below a cap until the response arrives, then jumps to 1.0 on success
//! or back to 0.0 on failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::config::Config;

/// Timing and bounds of the simulated progress ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSettings {
    /// Time between steps.
    pub interval: Duration,
    /// Amount added per step.
    pub step: f64,
    /// Highest value reached before completion.
    pub cap: f64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            step: 0.05,
            cap: 0.95,
        }
    }
}

impl ProgressSettings {
    /// Read the settings from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.progress_interval(),
            step: config.submission.progress_step,
            cap: config.submission.progress_cap,
        }
    }
}

/// Next progress value after one step.
#[must_use]
pub fn next_value(current: f64, settings: &ProgressSettings) -> f64 {
    (current + settings.step).min(settings.cap)
}

/// A running progress ticker.
///
/// The ticker stops on [`complete`](Self::complete), [`reset`](Self::reset),
/// or when the value is dropped.
#[derive(Debug)]
pub struct SimulatedProgress {
    tx: Arc<watch::Sender<f64>>,
    ticker: JoinHandle<()>,
}

impl SimulatedProgress {
    /// Start ticking from 0.0. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(settings: ProgressSettings) -> Self {
        let (tx, _rx) = watch::channel(0.0);
        let tx = Arc::new(tx);

        let ticker_tx = Arc::clone(&tx);
        let ticker = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + settings.interval, settings.interval);
            loop {
                ticks.tick().await;
                let value = next_value(*ticker_tx.borrow(), &settings);
                ticker_tx.send_replace(value);
                tracing::trace!("Simulated upload progress: {:.0}%", value * 100.0);
                if value >= settings.cap {
                    break;
                }
            }
        });

        Self { tx, ticker }
    }

    /// Receiver observing every progress change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.tx.subscribe()
    }

    /// Current progress value in `[0.0, 1.0]`.
    #[must_use]
    pub fn value(&self) -> f64 {
        *self.tx.borrow()
    }

    /// Stop ticking and report the upload as finished.
    pub fn complete(&self) {
        self.ticker.abort();
        self.tx.send_replace(1.0);
    }

    /// Stop ticking and return to zero.
    pub fn reset(&self) {
        self.ticker.abort();
        self.tx.send_replace(0.0);
    }
}

impl Drop for SimulatedProgress {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
