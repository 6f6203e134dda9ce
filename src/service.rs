use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::control::Control;
use crate::monitor::Monitor;

/// Drives the monitor: one `select!` loop over the tick interval and the
/// control channel, so lifecycle signals and sampling cycles are
/// serialized onto a single task and never interleave.
///
/// Returns when `Control::Shutdown` arrives or every control handle has
/// been dropped.
pub async fn run(
    mut monitor: Monitor,
    mut controls: mpsc::UnboundedReceiver<Control>,
    tick_rate: Duration,
) {
    let mut ticker = tokio::time::interval(tick_rate);
    // A stalled counter read must not cause a burst of catch-up ticks.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while monitor.running {
        tokio::select! {
            maybe_control = controls.recv() => {
                match maybe_control {
                    Some(control) => monitor.dispatch(control),
                    None => {
                        info!("all control handles dropped; shutting down");
                        monitor.dispatch(Control::Shutdown);
                    }
                }
            }
            _ = ticker.tick() => {
                monitor.on_tick();
            }
        }
    }
}
