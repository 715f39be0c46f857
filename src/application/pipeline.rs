use crate::application::aggregator::Aggregator;
use crate::application::discovery::{DiscoveredSource, FileDiscovery};
use crate::application::loader::DatasetLoader;
use crate::application::response_times::ResponseTimeLoader;
use crate::config::{Config, LoadPolicy};
use crate::domain::efficiency::EfficiencyCalculator;
use crate::domain::errors::PipelineError;
use crate::domain::load_group::Metric;
use crate::domain::ports::ChartRenderer;
use crate::domain::run_report::{RunOutcome, RunReport, SourceWarning};
use crate::domain::sample::SampleRow;
use crate::domain::trend::TrendFitter;
use crate::infrastructure::render::RenderContext;
use tracing::{debug, info, warn};

/// One forward pass from result files to chart artifacts.
///
/// Everything that can fail on bad data runs before the render context is
/// opened, and the context only publishes on commit, so a failed run never
/// leaves a partial set of charts behind.
pub struct Pipeline<R: ChartRenderer> {
    config: Config,
    renderer: R,
}

impl<R: ChartRenderer> Pipeline<R> {
    pub fn new(config: Config, renderer: R) -> Self {
        Self { config, renderer }
    }

    pub fn run(&self) -> Result<RunOutcome, PipelineError> {
        let input_dir = &self.config.input_dir;
        let sources = FileDiscovery::discover(input_dir)?;
        if sources.is_empty() {
            info!("No monitoring result files found in {:?}", input_dir);
            return Ok(RunOutcome::NoData {
                warnings: Vec::new(),
            });
        }
        info!("Found {} result files in {:?}", sources.len(), input_dir);

        let (loaded, warnings) = self.load_sources(&sources)?;
        if loaded.is_empty() {
            return Err(PipelineError::NoUsableSources {
                failed: warnings.len(),
            });
        }

        let groups = Aggregator::aggregate(loaded);
        if groups.is_empty() {
            info!("Result files contain no samples, nothing to chart");
            return Ok(RunOutcome::NoData { warnings });
        }
        let efficiency = EfficiencyCalculator::calculate(&groups)?;

        let fitter = TrendFitter::new(self.config.trend_grid_points);
        let cpu_series = Aggregator::mean_series(&groups, Metric::Cpu);
        let cpu_trend = match fitter.fit(&cpu_series.pairs()) {
            Ok(fit) => Some(fit.model),
            Err(e) => {
                debug!("No CPU trend: {}", e);
                None
            }
        };

        let response = match ResponseTimeLoader::load(input_dir)? {
            Some(points) => {
                let pairs: Vec<_> = points.iter().map(|p| (p.users, p.mean_time_ms)).collect();
                let fit = fitter.fit(&pairs)?;
                info!(
                    "Response time trend: {:.4}·ln(users) + {:.4} (r² = {:.4})",
                    fit.model.a, fit.model.b, fit.model.r_squared
                );
                Some((points, fit))
            }
            None => None,
        };

        let mut ctx = RenderContext::new(&self.config.output_dir)?;
        self.renderer.render_scaling_summary(&mut ctx, &groups)?;
        self.renderer.render_scaling_efficiency(&mut ctx, &efficiency)?;
        if let Some((points, fit)) = &response {
            self.renderer.render_response_trend(&mut ctx, points, fit)?;
        }
        let artifacts = ctx.commit()?;

        Ok(RunOutcome::Completed(RunReport {
            groups,
            efficiency,
            cpu_trend,
            response_trend: response.map(|(_, fit)| fit.model),
            warnings,
            artifacts,
        }))
    }

    fn load_sources(
        &self,
        sources: &[DiscoveredSource],
    ) -> Result<(Vec<Vec<SampleRow>>, Vec<SourceWarning>), PipelineError> {
        let mut loaded = Vec::with_capacity(sources.len());
        let mut warnings = Vec::new();

        for source in sources {
            match DatasetLoader::load(&source.path, source.load_level) {
                Ok(rows) => loaded.push(rows),
                Err(e) => match self.config.load_policy {
                    LoadPolicy::FailFast => return Err(e.into()),
                    LoadPolicy::Isolate => {
                        warn!("Skipping {:?}: {}", source.path, e);
                        warnings.push(SourceWarning {
                            path: source.path.clone(),
                            load_level: source.load_level,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok((loaded, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::efficiency::EfficiencyPoint;
    use crate::domain::errors::RenderError;
    use crate::domain::load_group::LoadGroup;
    use crate::domain::ports::ArtifactSink;
    use crate::domain::sample::ResponseTimePoint;
    use crate::domain::trend::TrendFit;
    use std::fs;
    use tempfile::TempDir;

    /// Stages the summary chart, then fails on the efficiency chart.
    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render_scaling_summary(
            &self,
            sink: &mut dyn ArtifactSink,
            _groups: &[LoadGroup],
        ) -> Result<(), RenderError> {
            sink.write_artifact("performance_analysis.json", b"{}")
        }

        fn render_scaling_efficiency(
            &self,
            _sink: &mut dyn ArtifactSink,
            _points: &[EfficiencyPoint],
        ) -> Result<(), RenderError> {
            Err(RenderError::Write {
                name: "scaling_efficiency.json".to_string(),
                reason: "disk full".to_string(),
            })
        }

        fn render_response_trend(
            &self,
            _sink: &mut dyn ArtifactSink,
            _points: &[ResponseTimePoint],
            _fit: &TrendFit,
        ) -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn test_render_failure_leaves_no_partial_artifacts() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("results_10users.csv"),
            "timestamp,cpu_usage,memory_usage_percent\n2025-03-01 12:00:00,20,50\n",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = Pipeline::new(config, FailingRenderer).run().unwrap_err();
        assert!(matches!(err, PipelineError::Render(RenderError::Write { .. })));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n != "results_10users.csv")
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    }

    #[test]
    fn test_header_only_sources_mean_no_data() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("results_10users.csv"),
            "timestamp,cpu_usage,memory_usage_percent\n",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let outcome = Pipeline::new(config, FailingRenderer).run().unwrap();
        assert!(matches!(outcome, RunOutcome::NoData { ref warnings } if warnings.is_empty()));
    }

    #[test]
    fn test_no_data_keeps_warnings_of_skipped_sources() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("results_10users.csv"),
            "timestamp,cpu_usage,memory_usage_percent\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("results_20users.csv"),
            "timestamp,cpu_usage\n2025-03-01 12:00:00,20\n",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let outcome = Pipeline::new(config, FailingRenderer).run().unwrap();

        assert!(matches!(outcome, RunOutcome::NoData { .. }));
        let warnings = outcome.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].load_level, 20);
        assert!(warnings[0].message.contains("memory_usage_percent"));
    }
}
