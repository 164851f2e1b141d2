mod mapper;
mod render;
mod surface;
mod svg;

pub use mapper::{ChartMapper, DOMAIN_HEADROOM, XLayout, value_domain};
pub use render::{
    BAR_WIDTH_RATIO, CHART_PADDING, ChartSeries, GRID_LINES, LABEL_THINNING_THRESHOLD,
    MARKER_RADIUS, NamedSeries, label_stride, render_bar_chart, render_line_chart,
};
pub use surface::{
    Color, DrawCommand, DrawingSurface, Fill, GradientId, Point, Rect, RecordingSurface, Stroke,
    TextAlign, TextStyle,
};
pub use svg::SvgSurface;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart needs at least one label and one series")]
    EmptySeries,
    #[error("series `{series}` has {actual} values but there are {expected} labels")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },
    #[error("series `{0}` contains a non-finite value")]
    NonFiniteValue(String),
}
