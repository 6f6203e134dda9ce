use thiserror::Error;

/// Failures that can occur while producing or delivering a sample.
///
/// None of these stop the sampling loop once it is running: a failed tick
/// logs, omits the affected field, and the loop reschedules. Only
/// `CounterUnavailable` at construction time is fatal, and then only to
/// `Monitor::start`.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cannot open cpu counter source: {0}")]
    CounterUnavailable(#[source] std::io::Error),

    #[error("malformed cpu counter line: {0}")]
    MalformedCounterLine(String),

    #[error("memory totals query failed")]
    MemoryQueryFailure,

    #[error("render sink is not reachable")]
    SinkUnavailable,
}
