use super::sample::{LoadLevel, SampleRow};
use serde::Serialize;

/// Resource metric that can be projected out of a [`LoadGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
}

impl Metric {
    pub fn of(&self, row: &SampleRow) -> f64 {
        match self {
            Metric::Cpu => row.cpu_usage,
            Metric::Memory => row.memory_usage_percent,
        }
    }
}

/// All samples recorded at one load level, merged across sources.
#[derive(Debug, Clone, Serialize)]
pub struct LoadGroup {
    pub load_level: LoadLevel,
    /// Sorted by elapsed seconds (ties broken by value)
    #[serde(skip)]
    pub rows: Vec<SampleRow>,
    pub mean_cpu: f64,
    pub mean_memory: f64,
    pub sample_count: usize,
    pub source_count: usize,
}

impl LoadGroup {
    pub fn mean(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.mean_cpu,
            Metric::Memory => self.mean_memory,
        }
    }

    /// (elapsed_seconds, value) pairs for a time-series panel.
    pub fn time_series(&self, metric: Metric) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.elapsed_seconds, metric.of(r)))
            .collect()
    }
}
