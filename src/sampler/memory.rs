/// Number of discrete memory-pressure levels.
pub const LEVEL_COUNT: usize = 4;

const BYTES_PER_MB: u64 = 1_048_576;

/// Guards the free/total division when the total rounds down to zero.
const EPSILON: f64 = 0.01;

/// Raw memory totals from the operating environment. Read fresh per tick,
/// used once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub available_bytes: u64,
    pub total_bytes: u64,
}

/// Memory figures as they appear in a sample: binary-megabyte truncated
/// totals plus the discrete pressure level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryReading {
    pub free_mb: u64,
    pub total_mb: u64,
    /// Pressure bucket in `0..LEVEL_COUNT`; 0 means almost no free memory.
    pub level: usize,
}

/// Maps a memory snapshot to megabyte totals and a level bucket.
///
/// The free ratio is computed from the truncated megabyte values, not the
/// raw byte counts, and the bucket is clamped: a ratio of exactly 100
/// would otherwise index one past the last level.
pub fn classify(snapshot: &MemorySnapshot) -> MemoryReading {
    let free_mb = snapshot.available_bytes / BYTES_PER_MB;
    let total_mb = snapshot.total_bytes / BYTES_PER_MB;

    let ratio = 100.0 * free_mb as f64 / (total_mb as f64 + EPSILON);
    let level = ((ratio / 25.0) as usize).min(LEVEL_COUNT - 1);

    MemoryReading {
        free_mb,
        total_mb,
        level,
    }
}
