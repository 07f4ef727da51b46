// vpn/scheduler.rs - Owned periodic driver for VpnConnectivityMonitor

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::monitor::VpnConnectivityMonitor;

/// Runs `tick()` once at start, then every `period`. A tick that overruns the
/// period suppresses the firings it covered instead of queueing them.
pub struct MonitorScheduler {
    monitor: Arc<VpnConnectivityMonitor>,
    period: Duration,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorScheduler {
    pub fn new(monitor: Arc<VpnConnectivityMonitor>, period: Duration) -> Self {
        Self {
            monitor,
            period: period.max(Duration::from_millis(1)),
            shutdown: None,
            handle: None,
        }
    }

    /// Spawn the loop on the current runtime; a no-op when already running
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::warn!("VPN monitor scheduler already running");
            return;
        }

        let (tx, rx) = watch::channel(false);
        let monitor = self.monitor.clone();
        let period = self.period;

        self.handle = Some(tokio::spawn(run_loop(monitor, period, rx)));
        self.shutdown = Some(tx);
        tracing::info!("VPN monitor scheduled every {:?}", period);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Signal the loop and wait for it to finish; safe to call repeatedly
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!("VPN monitor loop ended abnormally: {}", e);
            }
            tracing::info!("VPN monitor stopped");
        }
    }
}

async fn run_loop(
    monitor: Arc<VpnConnectivityMonitor>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // The first tick of an interval completes immediately: that is the startup run.
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = Instant::now();
                match monitor.try_tick().await {
                    Some(result) => tracing::debug!(?result, "Scheduled VPN tick finished"),
                    None => tracing::debug!("VPN tick already in progress; skipping"),
                }
                if started.elapsed() >= period {
                    tracing::warn!("VPN tick took {:?}, longer than the {:?} period", started.elapsed(), period);
                    ticker.reset();
                }
            }
            // Sender dropped or stop requested
            _ = shutdown.changed() => break,
        }
    }
}
