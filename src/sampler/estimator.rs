use std::time::Instant;

use crate::error::SampleError;

/// Index of the idle bucket within the numeric columns of the aggregate
/// "cpu" line (user, nice, system, idle, iowait, irq, softirq, ...).
const IDLE_FIELD: usize = 3;

/// Added to the delta denominator so a zero-activity interval divides
/// cleanly instead of panicking or producing infinity.
const EPSILON: f64 = 0.01;

/// One point-in-time read of the cumulative kernel CPU counters.
///
/// `total_ticks` deliberately excludes the user and nice columns; see
/// [`parse_counter_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub idle_ticks: u64,
    pub total_ticks: u64,
    pub taken_at: Instant,
}

/// Parses the aggregate "cpu" line of the kernel statistics table into a
/// [`CounterSnapshot`].
///
/// The idle bucket is read at its fixed column, and the total sums every
/// numeric column except user and nice. That selection is not the textbook
/// utilization formula, but it is the observed behavior this monitor
/// reproduces; changing it would change every reported percentage.
pub fn parse_counter_line(line: &str) -> Result<CounterSnapshot, SampleError> {
    let rest = line
        .strip_prefix("cpu")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .ok_or_else(|| SampleError::MalformedCounterLine(format!("not an aggregate cpu line: {line:?}")))?;

    let fields: Vec<u64> = rest
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|err| SampleError::MalformedCounterLine(format!("{err}: {line:?}")))?;

    if fields.len() <= IDLE_FIELD {
        return Err(SampleError::MalformedCounterLine(format!(
            "expected at least {} columns, got {}",
            IDLE_FIELD + 1,
            fields.len()
        )));
    }

    Ok(CounterSnapshot {
        idle_ticks: fields[IDLE_FIELD],
        total_ticks: fields.iter().skip(2).sum(),
        taken_at: Instant::now(),
    })
}

/// Turns successive counter snapshots into an instantaneous usage
/// percentage by delta computation.
///
/// Holds the only state that survives between ticks: the previous idle and
/// total counters. The very first call after construction (or after
/// [`reset`](Self::reset)) computes against a zero baseline, so it reports
/// the lifetime-cumulative ratio rather than a true interval rate. That
/// warm-up sample is emitted as-is.
#[derive(Debug, Default)]
pub struct CpuUsageEstimator {
    previous_idle: u64,
    previous_total: u64,
}

impl CpuUsageEstimator {
    /// Computes the usage percentage for the interval since the previous
    /// call and advances the baseline.
    ///
    /// The result is not clamped: with monotonically non-decreasing
    /// counters it lies in `[0, 100]`, and a counter reset shows up as an
    /// out-of-range value rather than being silently masked.
    pub fn update(&mut self, snapshot: &CounterSnapshot) -> f64 {
        let idle_delta = snapshot.idle_ticks as f64 - self.previous_idle as f64;
        let total_delta = snapshot.total_ticks as f64 - self.previous_total as f64;

        self.previous_idle = snapshot.idle_ticks;
        self.previous_total = snapshot.total_ticks;

        let usage_delta = total_delta - idle_delta;
        100.0 * usage_delta / (total_delta + EPSILON)
    }

    /// Drops the baseline so the next sample is a warm-up sample again.
    pub fn reset(&mut self) {
        self.previous_idle = 0;
        self.previous_total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(idle: u64, total: u64) -> CounterSnapshot {
        CounterSnapshot {
            idle_ticks: idle,
            total_ticks: total,
            taken_at: Instant::now(),
        }
    }

    #[test]
    fn delta_between_two_snapshots() {
        let mut estimator = CpuUsageEstimator::default();
        estimator.update(&snapshot(100, 400));

        // idle 100 -> 150, total 400 -> 600: usage = (200 - 50) / 200
        let percent = estimator.update(&snapshot(150, 600));
        let expected = 100.0 * 150.0 / 200.01;
        assert!((percent - expected).abs() < 1e-9);
    }

    #[test]
    fn first_update_is_a_warm_up_sample() {
        let mut estimator = CpuUsageEstimator::default();

        // Previous values are zero, so the deltas equal the absolute
        // cumulative counters since boot.
        let percent = estimator.update(&snapshot(300, 1000));
        let expected = 100.0 * 700.0 / 1000.01;
        assert!((percent - expected).abs() < 1e-9);
    }

    #[test]
    fn reset_restores_warm_up_behavior() {
        let mut estimator = CpuUsageEstimator::default();
        let first = estimator.update(&snapshot(300, 1000));
        estimator.update(&snapshot(400, 1500));

        estimator.reset();
        let after_reset = estimator.update(&snapshot(300, 1000));
        assert_eq!(first, after_reset);
    }

    #[test]
    fn idle_interval_reports_zero_usage() {
        let mut estimator = CpuUsageEstimator::default();
        estimator.update(&snapshot(100, 200));

        // All new ticks are idle ticks.
        let percent = estimator.update(&snapshot(150, 250));
        assert!(percent.abs() < 0.1);
    }

    #[test]
    fn unchanged_counters_stay_finite() {
        let mut estimator = CpuUsageEstimator::default();
        estimator.update(&snapshot(100, 200));

        let percent = estimator.update(&snapshot(100, 200));
        assert!(percent.is_finite());
        assert!(percent.abs() < f64::EPSILON);
    }

    #[test]
    fn parses_aggregate_line_with_double_space() {
        let snap = parse_counter_line("cpu  4705 150 1120 16250 520 20 5 0 0 0").unwrap();
        assert_eq!(snap.idle_ticks, 16250);
        // user (4705) and nice (150) excluded from the total.
        assert_eq!(snap.total_ticks, 1120 + 16250 + 520 + 20 + 5);
    }

    #[test]
    fn rejects_per_cpu_lines() {
        assert!(parse_counter_line("cpu0 1 2 3 4 5 6 7 0 0 0").is_err());
    }

    #[test]
    fn rejects_non_numeric_columns() {
        assert!(parse_counter_line("cpu  1 2 x 4 5").is_err());
    }

    #[test]
    fn rejects_truncated_lines() {
        assert!(parse_counter_line("cpu  1 2 3").is_err());
        assert!(parse_counter_line("intr 12345").is_err());
    }
}
