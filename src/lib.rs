//! Background CPU/memory monitor.
//!
//! `sysgauge` samples the kernel's cumulative CPU counters and the system
//! memory totals on a fixed cadence and publishes each reading to a
//! presentation sink as a [`sampler::snapshot::Sample`]. The
//! [`monitor::Monitor`] state machine decides when sampling runs, pauses,
//! and resumes in response to lifecycle signals (screen on/off, power save,
//! user enable/disable) delivered over the [`control`] channel.

pub mod config;
pub mod control;
pub mod error;
pub mod format;
pub mod monitor;
pub mod sampler;
pub mod service;
pub mod sink;
