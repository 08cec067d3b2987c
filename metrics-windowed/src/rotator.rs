use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use tracing::{debug, trace};

use crate::registry::MetricRegistry;

/// Background thread which periodically rotates every histogram of a registry.
pub(crate) struct Rotator {
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Rotator {
    pub fn spawn(registry: Arc<MetricRegistry>, interval: Duration) -> io::Result<Rotator> {
        let (shutdown_tx, shutdown_rx) = bounded(0);

        let handle = thread::Builder::new()
            .name("metrics-windowed-rotator".to_string())
            .spawn(move || run(registry, interval, shutdown_rx))?;

        Ok(Rotator { shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    /// Signals the thread to stop and waits for it to exit.
    pub fn stop(&mut self) {
        // Disconnecting the channel wakes the thread up.
        drop(self.shutdown_tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("Histogram rotator exited with a panic.");
            }
        }
    }
}

impl Drop for Rotator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(registry: Arc<MetricRegistry>, interval: Duration, shutdown_rx: Receiver<()>) {
    debug!(?interval, "Histogram rotator started.");

    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                let histograms = registry.rotate_histograms();
                trace!(histograms, "Rotated histograms.");
            }
            recv(shutdown_rx) -> _ => break,
        }
    }

    debug!("Histogram rotator stopped.");
}
