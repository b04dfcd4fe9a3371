use parking_lot::Mutex;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Resident memory of a set of processes at one instant, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MemorySnapshot(f64);

impl MemorySnapshot {
    pub fn from_megabytes(megabytes: f64) -> Self {
        Self(megabytes)
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes as f64 / BYTES_PER_MEGABYTE)
    }

    pub fn megabytes(&self) -> f64 {
        self.0
    }

    /// Signed difference from a baseline. Negative if memory shrank below the baseline.
    pub fn growth_over(&self, baseline: MemorySnapshot) -> f64 {
        self.0 - baseline.0
    }
}

/// Case-insensitive substring match against process names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatcher {
    pattern: String,
}

impl ProcessMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, process_name: &str) -> bool {
        process_name.to_lowercase().contains(&self.pattern)
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[display("process memory cannot be read on this platform")]
    Unsupported,
    #[display("{msg}")]
    Failed { msg: String },
}

/// A source of memory snapshots.
///
/// Implementations are called from the sampling thread while the primary thread is driving the
/// workload, so they must be cheap compared to the sampling interval.
pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> Result<MemorySnapshot, ProbeError>;
}

/// Sums the resident memory of every process whose name matches a [ProcessMatcher].
///
/// Processes that exit between the process table refresh and the read are simply not counted.
pub struct SysinfoProbe {
    matcher: ProcessMatcher,
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new(matcher: ProcessMatcher) -> Self {
        Self {
            matcher,
            system: Mutex::new(System::new()),
        }
    }

    pub fn matcher(&self) -> &ProcessMatcher {
        &self.matcher
    }
}

impl MemoryProbe for SysinfoProbe {
    fn sample(&self) -> Result<MemorySnapshot, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::Unsupported);
        }

        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let mut matched = 0usize;
        let total_bytes = system
            .processes()
            .values()
            // Threads share their parent's memory and would be counted twice
            .filter(|process| process.thread_kind().is_none())
            .filter(|process| self.matcher.matches(&process.name().to_string_lossy()))
            .map(|process| {
                matched += 1;
                process.memory()
            })
            .sum::<u64>();

        log::trace!(
            "Matched {} processes for `{}` using {} bytes",
            matched,
            self.matcher.pattern(),
            total_bytes
        );

        Ok(MemorySnapshot::from_bytes(total_bytes))
    }
}

/// One-off read of the resident memory of all processes matching `name_pattern`.
pub fn memory_of(name_pattern: &str) -> Result<MemorySnapshot, ProbeError> {
    SysinfoProbe::new(ProcessMatcher::new(name_pattern)).sample()
}
