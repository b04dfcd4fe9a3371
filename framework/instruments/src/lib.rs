mod probe;
mod report;
mod sampler;
mod window;

#[cfg(any(test, feature = "test_utils"))]
pub mod scripted;

pub use probe::{
    memory_of, MemoryProbe, MemorySnapshot, ProbeError, ProcessMatcher, SysinfoProbe,
    BYTES_PER_MEGABYTE,
};
pub use report::{print_summary, summary_table};
pub use sampler::{
    FinalGrowth, GrowthTrack, MemorySampler, SamplerError, DEFAULT_SAMPLE_INTERVAL,
};
pub use window::{MeasurementWindow, WindowMeasurement};
