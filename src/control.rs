use tokio::sync::mpsc;

use crate::sink::Rgb;

/// Lifecycle signals and configuration mutations accepted by the monitor.
///
/// External adapters (a preference UI, a screen-state watcher, a power
/// manager hook) translate their delivery mechanism into these messages;
/// the core has no dependency on where they come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// User toggle. `true` starts or resumes sampling and shows the
    /// indicator; `false` stops sampling and hides it.
    SetEnabled(bool),
    /// Screen state. Off pauses sampling and hides the indicator
    /// regardless of the enabled flag.
    ScreenChanged(bool),
    /// Informational; reserved for throttling the cadence under power
    /// save.
    PowerSaveChanged(bool),
    SetLockscreenVisible(bool),
    /// `None` means transparent.
    SetAccentColor(Option<Rgb>),
    /// Stop sampling and exit the service loop.
    Shutdown,
}

/// Cloneable sender half of the control channel; the only way to address
/// the monitor from outside its execution context. All methods are
/// fire-and-forget and safe to call from any task; the service loop
/// serializes them with the sampling ticks.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::UnboundedSender<Control>,
}

impl MonitorHandle {
    pub fn set_enabled(&self, enabled: bool) {
        self.send(Control::SetEnabled(enabled));
    }

    pub fn screen_changed(&self, is_on: bool) {
        self.send(Control::ScreenChanged(is_on));
    }

    pub fn power_save_changed(&self, active: bool) {
        self.send(Control::PowerSaveChanged(active));
    }

    pub fn set_lockscreen_visible(&self, visible: bool) {
        self.send(Control::SetLockscreenVisible(visible));
    }

    pub fn set_accent_color(&self, color: Option<Rgb>) {
        self.send(Control::SetAccentColor(color));
    }

    pub fn shutdown(&self) {
        self.send(Control::Shutdown);
    }

    fn send(&self, control: Control) {
        // A closed channel means the service loop already exited; the
        // signal has nowhere to go and can be dropped.
        let _ = self.tx.send(control);
    }
}

/// Creates the control channel: the handle goes to external adapters, the
/// receiver to [`crate::service::run`].
pub fn control_channel() -> (MonitorHandle, mpsc::UnboundedReceiver<Control>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MonitorHandle { tx }, rx)
}
