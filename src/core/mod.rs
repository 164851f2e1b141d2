mod engine;
mod types;

pub use engine::{classify_insight, comparison_rows, project, summarize};
pub use types::{
    ComparisonRow, Insight, ProjectionInput, ProjectionResult, SummaryMetrics, Trend,
};
