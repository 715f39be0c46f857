use loadscope::application::pipeline::Pipeline;
use loadscope::config::{Config, LoadPolicy};
use loadscope::domain::errors::{ParseError, PipelineError};
use loadscope::infrastructure::render::JsonChartRenderer;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GOOD: &str = "timestamp,cpu_usage,memory_usage_percent\n\
                    2025-03-01T12:00:00Z,20.0,50.0\n\
                    2025-03-01T12:00:05Z,20.0,52.0\n";

/// Directory with two readable sources and one with a broken cpu column.
fn mixed_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("results_10users.csv"), GOOD).unwrap();
    fs::write(dir.path().join("results_50users.csv"), GOOD).unwrap();
    fs::write(
        dir.path().join("results_30users.csv"),
        "timestamp,cpu_usage,memory_usage_percent\n2025-03-01T12:00:00Z,busy,50.0\n",
    )
    .unwrap();
    dir
}

fn config(dir: &Path, load_policy: LoadPolicy) -> Config {
    Config {
        input_dir: dir.to_path_buf(),
        output_dir: dir.to_path_buf(),
        load_policy,
        trend_grid_points: 100,
    }
}

fn output_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter(|e| {
            let name = e.as_ref().unwrap().file_name();
            !name.to_string_lossy().starts_with("results_")
        })
        .count()
}

#[test]
fn test_isolate_skips_broken_source_with_warning() {
    let dir = mixed_dir();

    let outcome = Pipeline::new(config(dir.path(), LoadPolicy::Isolate), JsonChartRenderer::new())
        .run()
        .unwrap();
    let report = outcome.report().unwrap();

    let levels: Vec<u32> = report.groups.iter().map(|g| g.load_level).collect();
    assert_eq!(levels, vec![10, 50]);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].load_level, 30);
    assert!(report.warnings[0].message.contains("cpu_usage"));

    // 50 users on the same CPU as 10 users: five times as efficient
    assert!((report.efficiency[1].normalized_efficiency - 5.0).abs() < 1e-12);
    assert_eq!(output_files(dir.path()), 3);
}

#[test]
fn test_fail_fast_aborts_and_writes_nothing() {
    let dir = mixed_dir();

    let err = Pipeline::new(config(dir.path(), LoadPolicy::FailFast), JsonChartRenderer::new())
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Parse(ParseError::InvalidValue { row: 1, .. })
    ));
    assert_eq!(output_files(dir.path()), 0);
}

#[test]
fn test_all_sources_broken_is_fatal_even_when_isolating() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("results_10users.csv"), "timestamp,cpu_usage\n").unwrap();
    fs::write(dir.path().join("results_20users.csv"), "when,cpu,mem\n").unwrap();

    let err = Pipeline::new(config(dir.path(), LoadPolicy::Isolate), JsonChartRenderer::new())
        .run()
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoUsableSources { failed: 2 }));
    assert_eq!(output_files(dir.path()), 0);
}
