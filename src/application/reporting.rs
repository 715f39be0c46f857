use crate::domain::run_report::{RunOutcome, RunReport, SourceWarning};

const WIDTH: usize = 72;

/// Console rendering of a finished run.
pub struct RunSummary;

impl RunSummary {
    pub fn format(outcome: &RunOutcome) -> String {
        let mut lines = match outcome {
            RunOutcome::NoData { .. } => {
                vec!["No monitoring samples found, no charts written.".to_string()]
            }
            RunOutcome::Completed(report) => Self::report_lines(report),
        };
        lines.extend(Self::warning_lines(outcome.warnings()));
        lines.push(String::new());
        lines.join("\n")
    }

    pub fn print(outcome: &RunOutcome) {
        print!("{}", Self::format(outcome));
    }

    pub fn to_json(outcome: &RunOutcome) -> serde_json::Result<String> {
        serde_json::to_string_pretty(outcome)
    }

    fn report_lines(report: &RunReport) -> Vec<String> {
        let rule = "=".repeat(WIDTH);
        let mut lines = vec![
            String::new(),
            rule.clone(),
            "LOAD TEST SCALING SUMMARY".to_string(),
            rule.clone(),
            format!(
                "{:>8} | {:>8} | {:>11} | {:>11} | {:>10} | {:>10}",
                "Users", "Samples", "Mean CPU%", "Mean Mem%", "Raw eff.", "Norm. eff."
            ),
            "-".repeat(WIDTH),
        ];

        for (group, eff) in report.groups.iter().zip(&report.efficiency) {
            lines.push(format!(
                "{:>8} | {:>8} | {:>11.2} | {:>11.2} | {:>10.4} | {:>10.4}",
                group.load_level,
                group.sample_count,
                group.mean_cpu,
                group.mean_memory,
                eff.raw_efficiency,
                eff.normalized_efficiency
            ));
        }
        lines.push(rule);

        if let Some(trend) = &report.cpu_trend {
            lines.push(format!(
                "Mean CPU trend:      {:.4}·ln(users) + {:.4}  (r² = {:.4})",
                trend.a, trend.b, trend.r_squared
            ));
        }
        if let Some(trend) = &report.response_trend {
            lines.push(format!(
                "Response time trend: {:.4}·ln(users) + {:.4}  (r² = {:.4})",
                trend.a, trend.b, trend.r_squared
            ));
        }

        lines.push(String::new());
        lines.push("Artifacts:".to_string());
        lines.extend(report.artifacts.iter().map(|p| format!("  {}", p.display())));
        lines
    }

    fn warning_lines(warnings: &[SourceWarning]) -> Vec<String> {
        if warnings.is_empty() {
            return Vec::new();
        }
        let mut lines = vec![
            String::new(),
            format!("WARNINGS: {} source(s) skipped", warnings.len()),
            "-".repeat(WIDTH),
        ];
        lines.extend(warnings.iter().map(|w| {
            format!("  {} ({} users): {}", w.path.display(), w.load_level, w.message)
        }));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::efficiency::EfficiencyPoint;
    use crate::domain::load_group::LoadGroup;
    use std::path::PathBuf;

    fn skipped() -> SourceWarning {
        SourceWarning {
            path: PathBuf::from("results_30users.csv"),
            load_level: 30,
            message: "Missing required column 'cpu_usage'".to_string(),
        }
    }

    fn report() -> RunReport {
        RunReport {
            groups: vec![LoadGroup {
                load_level: 10,
                rows: Vec::new(),
                mean_cpu: 20.0,
                mean_memory: 41.5,
                sample_count: 12,
                source_count: 1,
            }],
            efficiency: vec![EfficiencyPoint {
                load_level: 10,
                mean_cpu: 20.0,
                raw_efficiency: 0.5,
                normalized_efficiency: 1.0,
            }],
            cpu_trend: None,
            response_trend: None,
            warnings: vec![skipped()],
            artifacts: vec![PathBuf::from("scaling_efficiency.json")],
        }
    }

    #[test]
    fn test_summary_lists_groups_warnings_and_artifacts() {
        let text = RunSummary::format(&RunOutcome::Completed(report()));
        assert!(text.contains("20.00"));
        assert!(text.contains("1.0000"));
        assert!(text.contains("results_30users.csv (30 users)"));
        assert!(text.contains("scaling_efficiency.json"));
    }

    #[test]
    fn test_json_is_tagged_by_status() {
        let json = RunSummary::to_json(&RunOutcome::NoData {
            warnings: Vec::new(),
        })
        .unwrap();
        assert!(json.contains("\"status\": \"no_data\""));

        let json = RunSummary::to_json(&RunOutcome::Completed(report())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["groups"][0]["load_level"], 10);
        assert!(value["groups"][0].get("rows").is_none());
    }

    #[test]
    fn test_no_data_still_reports_skipped_sources() {
        let outcome = RunOutcome::NoData {
            warnings: vec![skipped()],
        };

        let text = RunSummary::format(&outcome);
        assert!(text.contains("no charts written"));
        assert!(text.contains("WARNINGS: 1 source(s) skipped"));
        assert!(text.contains("results_30users.csv (30 users)"));

        let value: serde_json::Value =
            serde_json::from_str(&RunSummary::to_json(&outcome).unwrap()).unwrap();
        assert_eq!(value["status"], "no_data");
        assert_eq!(value["warnings"][0]["load_level"], 30);
    }
}
