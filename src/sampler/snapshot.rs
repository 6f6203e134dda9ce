use std::time::Instant;

use crate::sampler::memory::MemoryReading;

/// One tick's worth of readings, as delivered to the presentation sink.
///
/// Each sample supersedes the previous one; nothing is retained. A field
/// is `None` when its source failed on this tick (the loop keeps going and
/// the field usually returns on the next tick).
#[derive(Clone, Debug)]
pub struct Sample {
    /// Unclamped usage percentage; nominally in `[0, 100]`.
    pub cpu_percent: Option<f64>,
    pub memory: Option<MemoryReading>,
    /// Human-readable current clock speed, e.g. "1.42 GHz".
    pub clock_label: Option<String>,
    /// Instant of the counter read; assembly time when that read failed.
    pub taken_at: Instant,
}

impl Sample {
    pub fn new(
        cpu_percent: Option<f64>,
        memory: Option<MemoryReading>,
        clock_label: Option<String>,
    ) -> Self {
        Sample {
            cpu_percent,
            memory,
            clock_label,
            taken_at: Instant::now(),
        }
    }
}
