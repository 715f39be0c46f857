pub mod chart_spec;
pub mod context;
pub mod json_renderer;

pub use context::RenderContext;
pub use json_renderer::JsonChartRenderer;
