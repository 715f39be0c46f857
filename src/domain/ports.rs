use super::efficiency::EfficiencyPoint;
use super::errors::RenderError;
use super::load_group::LoadGroup;
use super::sample::ResponseTimePoint;
use super::trend::TrendFit;

/// Destination for rendered artifacts.
///
/// Implementations stage writes and only publish them once the whole run
/// has succeeded.
pub trait ArtifactSink {
    fn write_artifact(&mut self, name: &str, bytes: &[u8]) -> Result<(), RenderError>;
}

/// Turns aggregated series into chart artifacts.
///
/// Every call receives the sink explicitly; a renderer holds no drawing
/// state between calls.
pub trait ChartRenderer {
    /// CPU and memory over time per load level, plus means against load level
    fn render_scaling_summary(
        &self,
        sink: &mut dyn ArtifactSink,
        groups: &[LoadGroup],
    ) -> Result<(), RenderError>;

    fn render_scaling_efficiency(
        &self,
        sink: &mut dyn ArtifactSink,
        points: &[EfficiencyPoint],
    ) -> Result<(), RenderError>;

    /// Companion single-metric view with its logarithmic trend
    fn render_response_trend(
        &self,
        sink: &mut dyn ArtifactSink,
        points: &[ResponseTimePoint],
        fit: &TrendFit,
    ) -> Result<(), RenderError>;
}
