//! Service-mode driver: run the updater on a fixed period until a stop
//! notification arrives.

use crate::{error::Error, update::RecordUpdater};
use std::{future::Future, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Drive `updater` every `every` until `shutdown` resolves.
///
/// * the first update fires immediately, then once per period;
/// * ticks that elapse while an update is in flight are coalesced, never
///   queued; at most one update runs at a time;
/// * a tick failure is fatal: the error is returned and no further tick
///   runs;
/// * once `shutdown` resolves the loop exits without waiting for another
///   tick (the select is biased toward stop); an in-flight update is
///   awaited to completion, never cancelled.
///
/// The stop future is injected so the binary can wire it to SIGINT/SIGTERM
/// while tests drive the lifecycle deterministically.
pub async fn run_service(
    updater: &RecordUpdater,
    every: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                let result = updater.apply().await?;
                info!("updated {}.{} -> {}", result.record, result.zone, result.ip);
            }
        }
    }
}
