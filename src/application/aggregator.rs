use crate::domain::load_group::{LoadGroup, Metric};
use crate::domain::sample::{LoadLevel, SampleRow};
use statrs::statistics::{Data, Distribution};
use std::collections::BTreeMap;

/// Per-load-level means as parallel arrays, ascending by load level.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub load_levels: Vec<LoadLevel>,
    pub means: Vec<f64>,
}

impl MetricSeries {
    pub fn pairs(&self) -> Vec<(LoadLevel, f64)> {
        self.load_levels
            .iter()
            .copied()
            .zip(self.means.iter().copied())
            .collect()
    }
}

/// Merges per-source samples into one [`LoadGroup`] per load level.
///
/// Means are unweighted over rows (not over sources or time). Rows are put
/// into a canonical order before summing, so the result depends only on
/// the multiset of rows and never on file or row order.
pub struct Aggregator;

impl Aggregator {
    pub fn aggregate(sources: Vec<Vec<SampleRow>>) -> Vec<LoadGroup> {
        let mut by_level: BTreeMap<LoadLevel, (Vec<SampleRow>, usize)> = BTreeMap::new();
        for rows in sources {
            let Some(load_level) = rows.first().map(|r| r.load_level) else {
                continue;
            };
            let entry = by_level.entry(load_level).or_default();
            entry.0.extend(rows);
            entry.1 += 1;
        }

        by_level
            .into_iter()
            .map(|(load_level, (mut rows, source_count))| {
                rows.sort_by(SampleRow::canonical_cmp);
                let mean_cpu = mean(rows.iter().map(|r| r.cpu_usage).collect());
                let mean_memory = mean(rows.iter().map(|r| r.memory_usage_percent).collect());
                LoadGroup {
                    load_level,
                    sample_count: rows.len(),
                    rows,
                    mean_cpu,
                    mean_memory,
                    source_count,
                }
            })
            .collect()
    }

    pub fn mean_series(groups: &[LoadGroup], metric: Metric) -> MetricSeries {
        let mut ordered: Vec<&LoadGroup> = groups.iter().collect();
        ordered.sort_by_key(|g| g.load_level);
        MetricSeries {
            load_levels: ordered.iter().map(|g| g.load_level).collect(),
            means: ordered.iter().map(|g| g.mean(metric)).collect(),
        }
    }
}

// Groups are never empty
fn mean(values: Vec<f64>) -> f64 {
    Data::new(values).mean().unwrap_or(0.0)
}
