//! Renderer-neutral chart documents.
//!
//! These are plain data: a downstream plotting tool only has to map panels,
//! series and reference lines onto its own primitives.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ChartDocument {
    pub title: String,
    /// Figure size in inches
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_y_axis: Option<Axis>,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_lines: Vec<ReferenceLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    pub grid: bool,
    pub legend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Explicit tick positions; `None` lets the renderer choose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Vec<f64>>,
}

impl Axis {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
            ticks: None,
        }
    }

    pub fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.ticks = Some(ticks);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Line,
    Scatter,
    /// Vertical segments from y = 0 to each point
    DropLines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    pub axis: AxisSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub line_style: LineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    pub alpha: f64,
    pub points: Vec<[f64; 2]>,
}

impl Series {
    pub fn new(label: impl Into<String>, kind: SeriesKind, points: Vec<[f64; 2]>) -> Self {
        Self {
            label: label.into(),
            kind,
            axis: AxisSide::Primary,
            color: None,
            line_style: LineStyle::Solid,
            marker: None,
            alpha: 1.0,
            points,
        }
    }

    pub fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.axis = AxisSide::Secondary;
        self
    }

    pub fn dashed(mut self, alpha: f64) -> Self {
        self.line_style = LineStyle::Dashed;
        self.alpha = alpha;
        self
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub label: String,
    pub color: String,
    pub line_style: LineStyle,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}
