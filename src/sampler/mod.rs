use std::time::Instant;

use tracing::debug;

use crate::error::SampleError;
use crate::format::format_frequency;
use crate::sampler::estimator::{CpuUsageEstimator, parse_counter_line};
use crate::sampler::memory::classify;
use crate::sampler::snapshot::Sample;
use crate::sampler::source::{
    CounterSource, CpuFreqFile, FrequencySource, MemorySource, ProcStatFile, SysinfoMemory,
};

pub mod estimator;
pub mod memory;
pub mod snapshot;
pub mod source;

/// Bundles the counter/memory/frequency sources with the estimator state
/// and turns one tick into one [`Sample`].
///
/// A `Sampler` exists only while the loop is running: stopping the monitor
/// drops it (releasing the counter-source handle) and starting again opens
/// a fresh one.
pub struct Sampler {
    counters: Box<dyn CounterSource>,
    memory: Box<dyn MemorySource>,
    frequency: Option<Box<dyn FrequencySource>>,
    estimator: CpuUsageEstimator,
}

impl Sampler {
    /// Opens the default platform sources. Fails when the CPU counter
    /// source cannot be opened; the loop cannot start without it.
    pub fn open() -> Result<Self, SampleError> {
        let counters = ProcStatFile::open()?;
        Ok(Self::new(
            Box::new(counters),
            Box::new(SysinfoMemory::new()),
            Some(Box::new(CpuFreqFile::default())),
        ))
    }

    pub fn new(
        counters: Box<dyn CounterSource>,
        memory: Box<dyn MemorySource>,
        frequency: Option<Box<dyn FrequencySource>>,
    ) -> Self {
        Sampler {
            counters,
            memory,
            frequency,
            estimator: CpuUsageEstimator::default(),
        }
    }

    /// Clears the previous-counter state so the next sample is computed
    /// from scratch. Required after a pause: deltas across a gap would be
    /// meaningless.
    pub fn reset_estimator(&mut self) {
        self.estimator.reset();
    }

    /// Produces one sample. Never fails as a whole: a field whose source
    /// errors on this tick is omitted and logged, and the estimator keeps
    /// its previous state for the next attempt.
    pub fn tick(&mut self) -> Sample {
        // The sample carries the instant of the counter read itself; only
        // when that read fails does it fall back to assembly time.
        let (cpu_percent, taken_at) = match self.read_cpu_percent() {
            Ok((percent, taken_at)) => (Some(percent), taken_at),
            Err(err) => {
                debug!(error = %err, "skipping cpu field for this tick");
                (None, Instant::now())
            }
        };

        let memory = match self.memory.read() {
            Ok(snapshot) => Some(classify(&snapshot)),
            Err(err) => {
                debug!(error = %err, "skipping memory fields for this tick");
                None
            }
        };

        let clock_label = self
            .frequency
            .as_mut()
            .and_then(|source| source.read_khz())
            .map(format_frequency);

        Sample {
            cpu_percent,
            memory,
            clock_label,
            taken_at,
        }
    }

    fn read_cpu_percent(&mut self) -> Result<(f64, Instant), SampleError> {
        let line = self.counters.read_line()?;
        let snapshot = parse_counter_line(&line)?;
        let percent = self.estimator.update(&snapshot);
        Ok((percent, snapshot.taken_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::memory::MemorySnapshot;
    use std::io;

    struct ScriptedCounters {
        lines: Vec<Result<String, ()>>,
        next: usize,
    }

    impl ScriptedCounters {
        fn new(lines: Vec<Result<&str, ()>>) -> Self {
            ScriptedCounters {
                lines: lines
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
                next: 0,
            }
        }
    }

    impl CounterSource for ScriptedCounters {
        fn read_line(&mut self) -> Result<String, SampleError> {
            let entry = self.lines[self.next.min(self.lines.len() - 1)].clone();
            self.next += 1;
            entry.map_err(|()| {
                SampleError::CounterUnavailable(io::Error::other("scripted failure"))
            })
        }
    }

    struct FixedMemory(Option<MemorySnapshot>);

    impl MemorySource for FixedMemory {
        fn read(&mut self) -> Result<MemorySnapshot, SampleError> {
            self.0.ok_or(SampleError::MemoryQueryFailure)
        }
    }

    struct FixedFrequency(u64);

    impl FrequencySource for FixedFrequency {
        fn read_khz(&mut self) -> Option<u64> {
            Some(self.0)
        }
    }

    fn mb(n: u64) -> u64 {
        n * 1_048_576
    }

    #[test]
    fn tick_assembles_all_fields() {
        let mut sampler = Sampler::new(
            Box::new(ScriptedCounters::new(vec![Ok("cpu  100 0 200 300 0 0 0 0 0 0")])),
            Box::new(FixedMemory(Some(MemorySnapshot {
                available_bytes: mb(512),
                total_bytes: mb(2048),
            }))),
            Some(Box::new(FixedFrequency(1_420_000))),
        );

        let sample = sampler.tick();
        assert!(sample.cpu_percent.is_some());
        let memory = sample.memory.expect("memory fields populated");
        assert_eq!(memory.free_mb, 512);
        assert_eq!(memory.total_mb, 2048);
        assert_eq!(sample.clock_label.as_deref(), Some("1.42 GHz"));
    }

    #[test]
    fn failed_cpu_read_omits_only_the_cpu_field() {
        let mut sampler = Sampler::new(
            Box::new(ScriptedCounters::new(vec![Err(())])),
            Box::new(FixedMemory(Some(MemorySnapshot {
                available_bytes: mb(100),
                total_bytes: mb(400),
            }))),
            None,
        );

        let sample = sampler.tick();
        assert!(sample.cpu_percent.is_none());
        assert!(sample.memory.is_some());
        assert!(sample.clock_label.is_none());
    }

    #[test]
    fn malformed_line_retains_estimator_state() {
        // Tick 1 establishes the baseline, tick 2 is garbage, tick 3 must
        // compute its delta against tick 1, not a reset baseline.
        let mut sampler = Sampler::new(
            Box::new(ScriptedCounters::new(vec![
                Ok("cpu  0 0 100 100 0 0 0 0 0 0"),
                Ok("cpu  0 0 garbage 100 0 0 0 0 0 0"),
                Ok("cpu  0 0 300 200 0 0 0 0 0 0"),
            ])),
            Box::new(FixedMemory(None)),
            None,
        );

        sampler.tick();
        let bad = sampler.tick();
        assert!(bad.cpu_percent.is_none());

        // totals: 200 -> 500, idle: 100 -> 200; usage = (300 - 100) / 300
        let good = sampler.tick();
        let percent = good.cpu_percent.expect("cpu field recovered");
        assert!((percent - 100.0 * 200.0 / 300.01).abs() < 0.01);
    }

    #[test]
    fn failed_memory_query_omits_memory_fields() {
        let mut failing = FixedMemory(None);
        assert!(matches!(
            failing.read(),
            Err(SampleError::MemoryQueryFailure)
        ));

        let mut sampler = Sampler::new(
            Box::new(ScriptedCounters::new(vec![Ok("cpu  0 0 10 10 0 0 0 0 0 0")])),
            Box::new(FixedMemory(None)),
            None,
        );

        let sample = sampler.tick();
        assert!(sample.cpu_percent.is_some());
        assert!(sample.memory.is_none());
    }

    #[test]
    fn sample_timestamp_comes_from_the_counter_read() {
        let mut sampler = Sampler::new(
            Box::new(ScriptedCounters::new(vec![Ok("cpu  0 0 10 10 0 0 0 0 0 0")])),
            Box::new(FixedMemory(None)),
            None,
        );

        let before = std::time::Instant::now();
        let sample = sampler.tick();
        assert!(sample.taken_at >= before);
        assert!(sample.taken_at <= std::time::Instant::now());
    }
}
