use tracing::{debug, error, info};

use crate::config::Config;
use crate::control::Control;
use crate::error::SampleError;
use crate::sampler::Sampler;
use crate::sink::{RenderOptions, RenderSink, parse_hex_color, render};

/// Run state of the sampling loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    Paused,
}

type SamplerFactory = Box<dyn FnMut() -> Result<Sampler, SampleError>>;

/// The lifecycle controller: single owner of the run state, the user
/// flags, and the sampler.
///
/// Every mutation goes through [`dispatch`](Self::dispatch) or
/// [`on_tick`](Self::on_tick), and the service loop calls both from one
/// task, so a transition and a tick never interleave.
///
/// Transitions follow two rules. Screen-off always wins: the indicator is
/// hidden whenever the screen is off, enabled or not. And the estimator
/// baseline never survives a gap: resuming after a pause (or restarting
/// after a stop) resets it, so the first sample afterwards is a warm-up
/// sample.
pub struct Monitor {
    /// Cleared by `Control::Shutdown`; the service loop exits when false.
    pub running: bool,
    state: LoopState,
    enabled: bool,
    screen_on: bool,
    options: RenderOptions,
    sampler: Option<Sampler>,
    open_sampler: SamplerFactory,
    sink: Box<dyn RenderSink>,
}

impl Monitor {
    /// Builds a monitor over the default platform sources. Sampling does
    /// not begin until [`start`](Self::start) is called.
    pub fn new(config: &Config, sink: Box<dyn RenderSink>) -> Self {
        Self::with_sampler_factory(config, sink, Box::new(Sampler::open))
    }

    /// Like [`new`](Self::new) but with an injected sampler constructor,
    /// so tests can substitute scripted sources.
    pub fn with_sampler_factory(
        config: &Config,
        sink: Box<dyn RenderSink>,
        open_sampler: SamplerFactory,
    ) -> Self {
        Monitor {
            running: true,
            state: LoopState::Stopped,
            enabled: config.general.enabled,
            screen_on: true,
            options: RenderOptions {
                lockscreen_visible: config.notification.lockscreen,
                accent_color: parse_hex_color(&config.notification.color),
                level_labels: config.notification.level_labels.clone(),
            },
            sampler: None,
            open_sampler,
            sink,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Starts sampling, or resumes it when paused. Idempotent while
    /// running. The only operation that can fail: opening the counter
    /// source. That failure is returned synchronously and leaves the
    /// monitor stopped.
    pub fn start(&mut self) -> Result<(), SampleError> {
        match self.state {
            LoopState::Running => Ok(()),
            LoopState::Paused => {
                self.resume();
                Ok(())
            }
            LoopState::Stopped => {
                self.sampler = Some((self.open_sampler)()?);
                self.state = LoopState::Running;
                info!("sampling started");
                Ok(())
            }
        }
    }

    /// Suspends ticking without releasing the counter source.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
            info!("sampling paused");
        }
    }

    /// Stops sampling and releases the counter-source handle. A later
    /// start opens a fresh one.
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            info!("sampling stopped");
        }
        self.sampler = None;
        self.state = LoopState::Stopped;
    }

    fn resume(&mut self) {
        match self.sampler.as_mut() {
            Some(sampler) => {
                // Deltas across the pause gap would be meaningless.
                sampler.reset_estimator();
                self.state = LoopState::Running;
                info!("sampling resumed");
            }
            None => {
                // Paused without a sampler should be unreachable; fall
                // back to a clean stop so a later start reopens.
                self.state = LoopState::Stopped;
            }
        }
    }

    pub fn dispatch(&mut self, control: Control) {
        match control {
            Control::SetEnabled(enabled) => self.on_enabled_changed(enabled),
            Control::ScreenChanged(is_on) => self.on_screen_changed(is_on),
            Control::PowerSaveChanged(active) => {
                // Reserved for cadence throttling; sampling is unchanged.
                debug!(active, "power save signal");
            }
            Control::SetLockscreenVisible(visible) => {
                self.options.lockscreen_visible = visible;
            }
            Control::SetAccentColor(color) => {
                self.options.accent_color = color;
            }
            Control::Shutdown => {
                info!("shutdown requested");
                self.stop();
                self.running = false;
            }
        }
    }

    /// User toggle: `true` starts or resumes and shows the indicator,
    /// `false` stops and hides it.
    pub fn on_enabled_changed(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
            self.sink.hide();
            return;
        }

        match self.start() {
            Ok(()) => {
                if self.screen_on {
                    self.sink.show();
                } else {
                    // Screen-off wins: sample state is ready but the
                    // indicator stays hidden until the screen comes back.
                    self.pause();
                    self.sink.hide();
                }
            }
            Err(err) => {
                error!(error = %err, "cannot start sampling; staying stopped");
            }
        }
    }

    /// Screen signal: off pauses and hides unconditionally; on resumes
    /// and shows only if the enabled flag is true at this instant.
    pub fn on_screen_changed(&mut self, is_on: bool) {
        self.screen_on = is_on;
        if !is_on {
            self.pause();
            self.sink.hide();
            return;
        }

        if self.enabled {
            match self.start() {
                Ok(()) => self.sink.show(),
                Err(err) => {
                    error!(error = %err, "cannot resume sampling on screen-on");
                }
            }
        }
    }

    /// One cycle of the sampling cadence. No-op unless running; a failed
    /// field or an unreachable sink never stops the loop.
    pub fn on_tick(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        let Some(sampler) = self.sampler.as_mut() else {
            return;
        };

        let sample = sampler.tick();
        let notification = render(&sample, &self.options);
        if let Err(err) = self.sink.publish(&notification) {
            debug!(error = %err, "sink unreachable; dropping this sample");
        }
    }
}
