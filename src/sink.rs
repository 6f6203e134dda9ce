use std::io::{self, Write};

use crate::error::SampleError;
use crate::format::format_percent;
use crate::sampler::memory::LEVEL_COUNT;
use crate::sampler::snapshot::Sample;

/// Number of usage icons the indicator cycles through (one per 10%).
pub const ICON_BUCKETS: usize = 10;

/// An RGB accent color for the indicator. `None` where a color is expected
/// means transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parses a `#rrggbb` hex string. Empty or unparseable input yields `None`
/// (transparent), matching the config default.
pub fn parse_hex_color(s: &str) -> Option<Rgb> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

/// Presentation-side settings carried along with each render. Mutated live
/// by the controller; the sink sees the current values on the next tick.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub lockscreen_visible: bool,
    pub accent_color: Option<Rgb>,
    /// Ordered labels for the memory levels, scarcest first.
    pub level_labels: [String; LEVEL_COUNT],
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            lockscreen_visible: true,
            accent_color: None,
            level_labels: default_level_labels(),
        }
    }
}

pub fn default_level_labels() -> [String; LEVEL_COUNT] {
    ["Critical", "Low", "Moderate", "Plenty"].map(str::to_string)
}

/// The fully rendered indicator content for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Icon index in `0..ICON_BUCKETS`, one step per 10% of CPU usage.
    pub icon_bucket: usize,
    /// Memory level label.
    pub title: String,
    /// "<percent>% @ <clock>".
    pub info: String,
    /// "<free>MB / <total>MB".
    pub body: String,
    pub lockscreen_visible: bool,
    pub accent_color: Option<Rgb>,
}

/// Renders a sample into notification content. Pure function; fields whose
/// reading failed this tick render as placeholders.
pub fn render(sample: &Sample, options: &RenderOptions) -> Notification {
    let icon_bucket = sample
        .cpu_percent
        .map(|percent| (percent / 10.0).floor().clamp(0.0, (ICON_BUCKETS - 1) as f64) as usize)
        .unwrap_or(0);

    let percent_text = sample
        .cpu_percent
        .map(format_percent)
        .unwrap_or_else(|| "--%".to_string());
    let info = match &sample.clock_label {
        Some(clock) => format!("{percent_text} @ {clock}"),
        None => percent_text,
    };

    let (title, body) = match &sample.memory {
        Some(memory) => (
            options.level_labels[memory.level].clone(),
            format!("{}MB / {}MB", memory.free_mb, memory.total_mb),
        ),
        None => ("--".to_string(), "--".to_string()),
    };

    Notification {
        icon_bucket,
        title,
        info,
        body,
        lockscreen_visible: options.lockscreen_visible,
        accent_color: options.accent_color,
    }
}

/// The presentation sink the monitor publishes into.
///
/// `publish` delivers the freshly rendered content; `show`/`hide` toggle
/// whether the indicator is displayed at all. A sink that is not reachable
/// returns `SinkUnavailable` from `publish`; the monitor drops that tick's
/// sample and keeps going, since only the latest state matters.
pub trait RenderSink {
    fn show(&mut self);
    fn hide(&mut self);
    fn publish(&mut self, notification: &Notification) -> Result<(), SampleError>;
}

/// Writes each notification as one stdout line. Stand-in for a platform
/// notification area when running from a terminal.
#[derive(Default)]
pub struct ConsoleSink {
    visible: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink { visible: true }
    }
}

impl RenderSink for ConsoleSink {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn publish(&mut self, notification: &Notification) -> Result<(), SampleError> {
        if !self.visible {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "[{:<width$}] {} | {} | {}",
            "#".repeat(notification.icon_bucket + 1),
            notification.info,
            notification.title,
            notification.body,
            width = ICON_BUCKETS,
        )
        .map_err(|_| SampleError::SinkUnavailable)
    }
}
