use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;

use sysinfo::System;

use crate::error::SampleError;
use crate::sampler::memory::MemorySnapshot;

/// Reads the raw aggregate CPU counter line from the operating
/// environment. Pure I/O adapter; parsing happens in the estimator module.
pub trait CounterSource {
    fn read_line(&mut self) -> Result<String, SampleError>;
}

/// Reads the raw memory totals.
pub trait MemorySource {
    fn read(&mut self) -> Result<MemorySnapshot, SampleError>;
}

/// Optional reader of the current CPU clock speed in kHz.
pub trait FrequencySource {
    fn read_khz(&mut self) -> Option<u64>;
}

/// `/proc/stat` held open for the lifetime of a sampling session and
/// re-read from offset zero on every tick.
pub struct ProcStatFile {
    file: File,
}

impl ProcStatFile {
    const PATH: &'static str = "/proc/stat";

    pub fn open() -> Result<Self, SampleError> {
        let file = File::open(Self::PATH).map_err(SampleError::CounterUnavailable)?;
        Ok(ProcStatFile { file })
    }
}

impl CounterSource for ProcStatFile {
    fn read_line(&mut self) -> Result<String, SampleError> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(SampleError::CounterUnavailable)?;

        let mut line = String::new();
        BufReader::new(&mut self.file)
            .read_line(&mut line)
            .map_err(SampleError::CounterUnavailable)?;
        Ok(line)
    }
}

/// Memory totals via sysinfo, refreshed per tick.
pub struct SysinfoMemory {
    sys: System,
}

impl Default for SysinfoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoMemory {
    pub fn new() -> Self {
        SysinfoMemory { sys: System::new() }
    }
}

impl MemorySource for SysinfoMemory {
    fn read(&mut self) -> Result<MemorySnapshot, SampleError> {
        self.sys.refresh_memory();
        let total_bytes = self.sys.total_memory();
        // A zero total means the refresh produced nothing usable.
        if total_bytes == 0 {
            return Err(SampleError::MemoryQueryFailure);
        }
        Ok(MemorySnapshot {
            available_bytes: self.sys.available_memory(),
            total_bytes,
        })
    }
}

/// Current clock speed of cpu0 from sysfs. Stateless pass-through; a
/// missing or unreadable file simply omits the clock label for that tick.
pub struct CpuFreqFile {
    path: PathBuf,
}

impl Default for CpuFreqFile {
    fn default() -> Self {
        CpuFreqFile {
            path: PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq"),
        }
    }
}

impl CpuFreqFile {
    pub fn with_path(path: PathBuf) -> Self {
        CpuFreqFile { path }
    }
}

impl FrequencySource for CpuFreqFile {
    fn read_khz(&mut self) -> Option<u64> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        contents.trim().parse().ok()
    }
}
