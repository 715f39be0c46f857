use super::efficiency::EfficiencyPoint;
use super::load_group::LoadGroup;
use super::sample::LoadLevel;
use super::trend::TrendModel;
use serde::Serialize;
use std::path::PathBuf;

/// A source that was skipped because it failed to load.
#[derive(Debug, Clone, Serialize)]
pub struct SourceWarning {
    pub path: PathBuf,
    pub load_level: LoadLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub groups: Vec<LoadGroup>,
    pub efficiency: Vec<EfficiencyPoint>,
    /// Mean CPU usage against ln(users), when at least two load levels exist
    pub cpu_trend: Option<TrendModel>,
    pub response_trend: Option<TrendModel>,
    pub warnings: Vec<SourceWarning>,
    pub artifacts: Vec<PathBuf>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No samples to chart; nothing was written. Sources skipped on the
    /// way still show up here.
    NoData { warnings: Vec<SourceWarning> },
    Completed(RunReport),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::NoData { .. } => None,
            RunOutcome::Completed(report) => Some(report),
        }
    }

    pub fn warnings(&self) -> &[SourceWarning] {
        match self {
            RunOutcome::NoData { warnings } => warnings,
            RunOutcome::Completed(report) => &report.warnings,
        }
    }
}
