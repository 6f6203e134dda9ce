/// Formats a clock frequency in kHz (the sysfs unit) as a human label.
pub fn format_frequency(khz: u64) -> String {
    const KHZ_PER_MHZ: u64 = 1_000;
    const KHZ_PER_GHZ: u64 = 1_000_000;

    if khz >= KHZ_PER_GHZ {
        format!("{:.2} GHz", khz as f64 / KHZ_PER_GHZ as f64)
    } else if khz >= KHZ_PER_MHZ {
        format!("{} MHz", khz / KHZ_PER_MHZ)
    } else {
        format!("{khz} kHz")
    }
}

/// Formats a usage percentage the way the notification shows it: whole
/// percent, truncated.
pub fn format_percent(percent: f64) -> String {
    format!("{}%", percent as i64)
}
