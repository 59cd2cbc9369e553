use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::fetch::Fetcher;

use super::controller::PollingEngine;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Background task that re-arms a one-shot delay after every cycle.
pub struct Poller {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Poller {
    pub fn spawn<F: Fetcher>(engine: PollingEngine<F>, interval: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(polling_loop(engine, interval, cancel_token.clone()));

        Self {
            handle,
            cancel_token,
        }
    }

    /// Cancel the pending delay and wait for the task. A cycle already in
    /// flight runs to completion first.
    pub async fn stop(self) -> Result<()> {
        self.cancel_token.cancel();
        self.handle.await.context("polling task failed to join")
    }
}

async fn polling_loop<F: Fetcher>(
    engine: PollingEngine<F>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    log_info!("polling every {}s", interval.as_secs());

    loop {
        // Delay counts from the previous publish, not from a fixed clock.
        tokio::select! {
            _ = time::sleep(interval) => {
                if engine.start().await.is_none() {
                    log_debug!("scheduled cycle skipped, a fetch is already in flight");
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("polling loop shutting down");
                break;
            }
        }
    }
}
