use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of simulated concurrent users in one test run.
pub type LoadLevel = u32;

/// One monitoring sample, tagged with the load level of the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub timestamp: DateTime<Utc>,
    /// Offset from the earliest sample of the same source, always >= 0
    pub elapsed_seconds: f64,
    pub cpu_usage: f64,
    pub memory_usage_percent: f64,
    pub load_level: LoadLevel,
}

impl SampleRow {
    /// Total order used before summation so that means never depend on input order.
    pub fn canonical_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.elapsed_seconds
            .total_cmp(&other.elapsed_seconds)
            .then_with(|| self.cpu_usage.total_cmp(&other.cpu_usage))
            .then_with(|| {
                self.memory_usage_percent
                    .total_cmp(&other.memory_usage_percent)
            })
    }
}

/// One point of the companion response-time view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseTimePoint {
    pub users: LoadLevel,
    pub mean_time_ms: f64,
}
