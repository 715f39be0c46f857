use super::chart_spec::{
    Annotation, Axis, ChartDocument, LineStyle, Panel, ReferenceLine, Series, SeriesKind,
};
use crate::domain::efficiency::EfficiencyPoint;
use crate::domain::errors::RenderError;
use crate::domain::load_group::{LoadGroup, Metric};
use crate::domain::ports::{ArtifactSink, ChartRenderer};
use crate::domain::sample::ResponseTimePoint;
use crate::domain::trend::TrendFit;
use serde::Serialize;

pub const PERFORMANCE_ANALYSIS: &str = "performance_analysis.json";
pub const SCALING_SUMMARY_TABLE: &str = "scaling_summary.csv";
pub const SCALING_EFFICIENCY: &str = "scaling_efficiency.json";
pub const MEAN_TIME_CHART: &str = "mean_time.json";
pub const MEAN_TIME_TABLE: &str = "mean_time.csv";

const DPI: u32 = 300;

#[derive(Serialize)]
struct SummaryRow {
    users: u32,
    samples: usize,
    sources: usize,
    mean_cpu_usage: f64,
    mean_memory_usage_percent: f64,
}

#[derive(Serialize)]
struct MeanTimeRow {
    users: u32,
    mean_time_ms: f64,
    trend_ms: f64,
}

/// Writes chart documents as JSON and their underlying tables as CSV.
#[derive(Debug, Default)]
pub struct JsonChartRenderer;

impl JsonChartRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_json(
        sink: &mut dyn ArtifactSink,
        name: &str,
        doc: &ChartDocument,
    ) -> Result<(), RenderError> {
        let json = serde_json::to_vec_pretty(doc).map_err(|e| RenderError::Write {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        sink.write_artifact(name, &json)
    }

    fn write_csv<T: Serialize>(
        sink: &mut dyn ArtifactSink,
        name: &str,
        rows: &[T],
    ) -> Result<(), RenderError> {
        let write_error = |reason: String| RenderError::Write {
            name: name.to_string(),
            reason,
        };
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.serialize(row).map_err(|e| write_error(e.to_string()))?;
        }
        let bytes = wtr.into_inner().map_err(|e| write_error(e.to_string()))?;
        sink.write_artifact(name, &bytes)
    }

    fn time_panel(groups: &[LoadGroup], metric: Metric) -> Panel {
        let (title, y_label) = match metric {
            Metric::Cpu => ("CPU usage by number of users", "CPU usage (%)"),
            Metric::Memory => ("Memory usage by number of users", "Memory usage (%)"),
        };
        Panel {
            title: title.to_string(),
            x_axis: Axis::new("Time (seconds)"),
            y_axis: Axis::new(y_label),
            secondary_y_axis: None,
            series: groups
                .iter()
                .map(|g| {
                    Series::new(
                        format!("{} users", g.load_level),
                        SeriesKind::Line,
                        g.time_series(metric).into_iter().map(|(x, y)| [x, y]).collect(),
                    )
                })
                .collect(),
            reference_lines: Vec::new(),
            annotations: Vec::new(),
            grid: true,
            legend: true,
        }
    }

    fn means_panel(groups: &[LoadGroup]) -> Panel {
        let points = |metric: Metric| -> Vec<[f64; 2]> {
            groups
                .iter()
                .map(|g| [f64::from(g.load_level), g.mean(metric)])
                .collect()
        };
        Panel {
            title: "Mean resource usage by number of users".to_string(),
            x_axis: Axis::new("Number of users"),
            y_axis: Axis::new("Mean CPU usage (%)").colored("blue"),
            secondary_y_axis: Some(Axis::new("Mean memory usage (%)").colored("red")),
            series: vec![
                Series::new("Mean CPU usage", SeriesKind::Line, points(Metric::Cpu))
                    .colored("blue")
                    .with_marker("o"),
                Series::new("Mean memory usage", SeriesKind::Line, points(Metric::Memory))
                    .colored("red")
                    .with_marker("s")
                    .on_secondary_axis(),
            ],
            reference_lines: Vec::new(),
            annotations: Vec::new(),
            grid: true,
            legend: true,
        }
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render_scaling_summary(
        &self,
        sink: &mut dyn ArtifactSink,
        groups: &[LoadGroup],
    ) -> Result<(), RenderError> {
        let doc = ChartDocument {
            title: "Performance analysis".to_string(),
            width: 16.0,
            height: 20.0,
            dpi: DPI,
            panels: vec![
                Self::time_panel(groups, Metric::Cpu),
                Self::time_panel(groups, Metric::Memory),
                Self::means_panel(groups),
            ],
        };
        Self::write_json(sink, PERFORMANCE_ANALYSIS, &doc)?;

        let rows: Vec<SummaryRow> = groups
            .iter()
            .map(|g| SummaryRow {
                users: g.load_level,
                samples: g.sample_count,
                sources: g.source_count,
                mean_cpu_usage: g.mean_cpu,
                mean_memory_usage_percent: g.mean_memory,
            })
            .collect();
        Self::write_csv(sink, SCALING_SUMMARY_TABLE, &rows)
    }

    fn render_scaling_efficiency(
        &self,
        sink: &mut dyn ArtifactSink,
        points: &[EfficiencyPoint],
    ) -> Result<(), RenderError> {
        let panel = Panel {
            title: "System scaling efficiency".to_string(),
            x_axis: Axis::new("Number of users"),
            y_axis: Axis::new("Relative efficiency"),
            secondary_y_axis: None,
            series: vec![
                Series::new(
                    "Normalized efficiency",
                    SeriesKind::Line,
                    points
                        .iter()
                        .map(|p| [f64::from(p.load_level), p.normalized_efficiency])
                        .collect(),
                )
                .colored("green")
                .with_marker("D"),
            ],
            reference_lines: vec![ReferenceLine {
                y: 1.0,
                label: "Ideal scaling".to_string(),
                color: "red".to_string(),
                line_style: LineStyle::Dashed,
                alpha: 0.5,
            }],
            annotations: Vec::new(),
            grid: true,
            legend: true,
        };
        let doc = ChartDocument {
            title: "Scaling efficiency".to_string(),
            width: 10.0,
            height: 6.0,
            dpi: DPI,
            panels: vec![panel],
        };
        Self::write_json(sink, SCALING_EFFICIENCY, &doc)
    }

    fn render_response_trend(
        &self,
        sink: &mut dyn ArtifactSink,
        points: &[ResponseTimePoint],
        fit: &TrendFit,
    ) -> Result<(), RenderError> {
        let observed: Vec<[f64; 2]> = points
            .iter()
            .map(|p| [f64::from(p.users), p.mean_time_ms])
            .collect();

        let panel = Panel {
            title: "Mean response time by number of users".to_string(),
            x_axis: Axis::new("Number of users").with_ticks(observed.iter().map(|p| p[0]).collect()),
            y_axis: Axis::new("Response time (ms)"),
            secondary_y_axis: None,
            series: vec![
                Series::new("Mean response time, ms", SeriesKind::Scatter, observed.clone())
                    .colored("blue"),
                Series::new("", SeriesKind::DropLines, observed.clone())
                    .colored("lightblue")
                    .dashed(0.5),
                Series::new(
                    "Logarithmic fit",
                    SeriesKind::Line,
                    fit.curve.points.iter().map(|&(x, y)| [x, y]).collect(),
                )
                .colored("red")
                .dashed(0.7),
            ],
            reference_lines: Vec::new(),
            annotations: points
                .iter()
                .map(|p| Annotation {
                    x: f64::from(p.users),
                    y: p.mean_time_ms,
                    text: format!("{}", p.mean_time_ms),
                })
                .collect(),
            grid: true,
            legend: true,
        };
        let doc = ChartDocument {
            title: "Mean response time".to_string(),
            width: 10.0,
            height: 7.0,
            dpi: DPI,
            panels: vec![panel],
        };
        Self::write_json(sink, MEAN_TIME_CHART, &doc)?;

        let rows: Vec<MeanTimeRow> = points
            .iter()
            .map(|p| MeanTimeRow {
                users: p.users,
                mean_time_ms: p.mean_time_ms,
                trend_ms: fit.model.predict(f64::from(p.users)),
            })
            .collect();
        Self::write_csv(sink, MEAN_TIME_TABLE, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trend::TrendFitter;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemorySink {
        files: BTreeMap<String, Vec<u8>>,
    }

    impl ArtifactSink for MemorySink {
        fn write_artifact(&mut self, name: &str, bytes: &[u8]) -> Result<(), RenderError> {
            self.files.insert(name.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    fn group(load_level: u32, mean_cpu: f64, mean_memory: f64) -> LoadGroup {
        LoadGroup {
            load_level,
            rows: Vec::new(),
            mean_cpu,
            mean_memory,
            sample_count: 4,
            source_count: 1,
        }
    }

    #[test]
    fn test_scaling_summary_has_three_panels_and_table() {
        let mut sink = MemorySink::default();
        let groups = vec![group(10, 20.0, 40.0), group(100, 40.0, 55.0)];
        JsonChartRenderer::new()
            .render_scaling_summary(&mut sink, &groups)
            .unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&sink.files[PERFORMANCE_ANALYSIS]).unwrap();
        assert_eq!(doc["panels"].as_array().unwrap().len(), 3);
        assert_eq!(doc["panels"][0]["series"][1]["label"], "100 users");
        assert_eq!(doc["panels"][2]["series"][1]["axis"], "secondary");

        let table = String::from_utf8(sink.files[SCALING_SUMMARY_TABLE].clone()).unwrap();
        let mut lines = table.lines();
        assert_eq!(
            lines.next().unwrap(),
            "users,samples,sources,mean_cpu_usage,mean_memory_usage_percent"
        );
        assert_eq!(lines.next().unwrap(), "10,4,1,20.0,40.0");
    }

    #[test]
    fn test_efficiency_chart_has_ideal_reference_line() {
        let mut sink = MemorySink::default();
        let points = vec![EfficiencyPoint {
            load_level: 10,
            mean_cpu: 20.0,
            raw_efficiency: 0.5,
            normalized_efficiency: 1.0,
        }];
        JsonChartRenderer::new()
            .render_scaling_efficiency(&mut sink, &points)
            .unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&sink.files[SCALING_EFFICIENCY]).unwrap();
        assert_eq!(doc["panels"][0]["reference_lines"][0]["y"], 1.0);
        assert_eq!(doc["panels"][0]["series"][0]["points"][0][1], 1.0);
    }

    #[test]
    fn test_response_trend_writes_chart_and_table() {
        let mut sink = MemorySink::default();
        let points = vec![
            ResponseTimePoint { users: 10, mean_time_ms: 18.3 },
            ResponseTimePoint { users: 100, mean_time_ms: 21.0 },
            ResponseTimePoint { users: 200, mean_time_ms: 22.5 },
        ];
        let pairs: Vec<(u32, f64)> = points.iter().map(|p| (p.users, p.mean_time_ms)).collect();
        let fit = TrendFitter::new(50).fit(&pairs).unwrap();

        JsonChartRenderer::new()
            .render_response_trend(&mut sink, &points, &fit)
            .unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&sink.files[MEAN_TIME_CHART]).unwrap();
        let series = doc["panels"][0]["series"].as_array().unwrap();
        assert_eq!(series[0]["kind"], "scatter");
        assert_eq!(series[2]["points"].as_array().unwrap().len(), 50);
        assert_eq!(doc["panels"][0]["annotations"][0]["text"], "18.3");
        assert_eq!(doc["panels"][0]["x_axis"]["ticks"][2], 200.0);

        let table = String::from_utf8(sink.files[MEAN_TIME_TABLE].clone()).unwrap();
        assert_eq!(table.lines().count(), 4);
    }
}
