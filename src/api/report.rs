use serde::Serialize;
use std::fmt::Write;

use crate::chart::{
    ChartError, ChartSeries, Color, SvgSurface, render_bar_chart, render_line_chart,
};
use crate::core::{
    ComparisonRow, Insight, ProjectionInput, ProjectionResult, SummaryMetrics, classify_insight,
    comparison_rows, project, summarize,
};
use crate::format::{format_currency, format_percent, format_signed_percent};

const NOMINAL_COLOR: Color = Color::rgb(0x3b, 0x82, 0xf6);
const REAL_COLOR: Color = Color::rgb(0xef, 0x44, 0x44);
const SAVINGS_COLOR: Color = Color::rgb(0x10, 0xb9, 0x81);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSummary {
    pub current_annual_income: String,
    pub future_nominal_income: String,
    pub future_real_income: String,
    pub purchasing_power_change: String,
    pub current_savings: String,
    pub future_real_savings: String,
    pub total_purchasing_power_loss: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    #[serde(flatten)]
    pub metrics: SummaryMetrics,
    pub total_purchasing_power_loss_percent: f64,
    pub formatted: FormattedSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightView {
    pub kind: Insight,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedRow {
    pub nominal_income: String,
    pub real_income: String,
    pub real_savings: String,
    pub purchasing_power: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRowView {
    #[serde(flatten)]
    pub row: ComparisonRow,
    pub formatted: FormattedRow,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsView {
    pub width: u32,
    pub height: u32,
    pub income_svg: String,
    pub savings_svg: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub input: ProjectionInput,
    pub summary: SummaryView,
    pub insight: InsightView,
    pub table: Vec<TableRowView>,
    pub charts: ChartsView,
    pub projection: ProjectionResult,
}

pub fn build_report(input: &ProjectionInput, viewport: Viewport) -> Result<Report, ChartError> {
    let projection = project(input);
    let metrics = summarize(input, &projection);
    let insight = classify_insight(input);

    let formatted = FormattedSummary {
        current_annual_income: format_currency(metrics.current_annual_income as f64),
        future_nominal_income: format_currency(metrics.future_nominal_income as f64),
        future_real_income: format_currency(metrics.future_real_income as f64),
        purchasing_power_change: format_signed_percent(metrics.purchasing_power_change_percent),
        current_savings: format_currency(metrics.current_savings as f64),
        future_real_savings: format_currency(metrics.future_real_savings as f64),
        total_purchasing_power_loss: format_percent(Some(
            projection.total_purchasing_power_loss_percent,
        )),
    };

    let table = comparison_rows(&projection)
        .into_iter()
        .map(|row| TableRowView {
            formatted: FormattedRow {
                nominal_income: format_currency(row.nominal_income as f64),
                real_income: format_currency(row.real_income as f64),
                real_savings: format_currency(row.real_savings as f64),
                purchasing_power: format_percent(row.purchasing_power_percent),
            },
            row,
        })
        .collect();

    let charts = render_charts(&projection, viewport)?;

    Ok(Report {
        input: *input,
        summary: SummaryView {
            metrics,
            total_purchasing_power_loss_percent: projection.total_purchasing_power_loss_percent,
            formatted,
        },
        insight: InsightView {
            kind: insight,
            message: insight.message().to_string(),
        },
        table,
        charts,
        projection,
    })
}

fn render_charts(
    projection: &ProjectionResult,
    viewport: Viewport,
) -> Result<ChartsView, ChartError> {
    let (width, height) = (f64::from(viewport.width), f64::from(viewport.height));

    let income = ChartSeries::new(projection.year_labels.clone())
        .with_series(
            "Nominal income",
            as_f64(&projection.nominal_income),
            NOMINAL_COLOR,
        )
        .with_series(
            "Real income (today's money)",
            as_f64(&projection.real_income),
            REAL_COLOR,
        );
    let mut income_surface = SvgSurface::new(width, height);
    render_line_chart(&mut income_surface, &income)?;

    let savings = ChartSeries::new(projection.year_labels.clone()).with_series(
        "Real value of savings",
        as_f64(&projection.real_savings),
        SAVINGS_COLOR,
    );
    let mut savings_surface = SvgSurface::new(width, height);
    render_bar_chart(&mut savings_surface, &savings)?;

    Ok(ChartsView {
        width: viewport.width,
        height: viewport.height,
        income_svg: income_surface.finish(),
        savings_svg: savings_surface.finish(),
    })
}

fn as_f64(values: &[u64]) -> Vec<f64> {
    values.iter().map(|v| *v as f64).collect()
}

pub fn render_text(report: &Report) -> String {
    let f = &report.summary.formatted;
    let mut out = String::new();
    let _ = writeln!(out, "Current annual income:   {}", f.current_annual_income);
    let _ = writeln!(out, "Future nominal income:   {}", f.future_nominal_income);
    let _ = writeln!(out, "Future real income:      {}", f.future_real_income);
    let _ = writeln!(out, "Purchasing power change: {}", f.purchasing_power_change);
    let _ = writeln!(
        out,
        "Savings today / future:  {} / {}",
        f.current_savings, f.future_real_savings
    );
    let _ = writeln!(out, "Currency value lost:     {}", f.total_purchasing_power_loss);
    let _ = writeln!(out, "\n{}\n", report.insight.message);
    let _ = writeln!(
        out,
        "{:<9} {:>15} {:>15} {:>15} {:>16}",
        "Year", "Nominal income", "Real income", "Real savings", "Purchasing power"
    );
    for row in &report.table {
        let _ = writeln!(
            out,
            "{:<9} {:>15} {:>15} {:>15} {:>16}",
            row.row.year_label,
            row.formatted.nominal_income,
            row.formatted.real_income,
            row.formatted.real_savings,
            row.formatted.purchasing_power,
        );
    }
    out
}

#[derive(Debug, Clone)]
pub struct Presenter {
    input: ProjectionInput,
    viewport: Viewport,
    latest: Option<Report>,
}

impl Presenter {
    pub fn new(input: ProjectionInput, viewport: Viewport) -> Self {
        Self {
            input,
            viewport,
            latest: None,
        }
    }

    pub fn input(&self) -> &ProjectionInput {
        &self.input
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn latest(&self) -> Option<&Report> {
        self.latest.as_ref()
    }

    pub fn set_input(&mut self, input: ProjectionInput) {
        self.input = input;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn recompute(&mut self) -> Result<&Report, ChartError> {
        let report = build_report(&self.input, self.viewport)?;
        Ok(self.latest.insert(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> ProjectionInput {
        ProjectionInput {
            monthly_income: 5_000.0,
            current_savings: 20_000.0,
            inflation_rate_percent: 3.0,
            income_growth_rate_percent: 2.0,
            years: 10,
        }
    }

    #[test]
    fn report_formats_summary_and_table() {
        let report = build_report(&sample_input(), Viewport::default()).expect("report");

        let f = &report.summary.formatted;
        assert_eq!(f.current_annual_income, "$60,000");
        assert_eq!(f.future_nominal_income, "$73,140");
        assert_eq!(f.future_real_income, "$54,423");
        assert_eq!(f.purchasing_power_change, "-9.3%");
        assert_eq!(f.current_savings, "$20,000");
        assert_eq!(f.future_real_savings, "$14,882");
        assert_eq!(f.total_purchasing_power_loss, "25.6%");

        assert_eq!(report.table.len(), 11);
        assert_eq!(report.table[0].formatted.purchasing_power, "100.0%");
        assert_eq!(report.table[10].formatted.real_savings, "$14,882");
        assert_eq!(report.table[10].formatted.purchasing_power, "74.4%");
        assert_eq!(report.insight.kind, Insight::FallingBehind);
    }

    #[test]
    fn report_renders_both_charts_at_viewport_size() {
        let viewport = Viewport {
            width: 640,
            height: 320,
        };
        let report = build_report(&sample_input(), viewport).expect("report");

        assert!(report.charts.income_svg.contains("width=\"640\" height=\"320\""));
        assert!(report.charts.income_svg.contains("Nominal income"));
        assert!(report.charts.income_svg.contains("Real income (today&apos;s money)"));
        assert_eq!(report.charts.income_svg.matches("<circle").count(), 22);
        assert_eq!(report.charts.savings_svg.matches("<linearGradient").count(), 11);
    }

    #[test]
    fn zero_income_report_uses_sentinels() {
        let mut input = sample_input();
        input.monthly_income = 0.0;
        let report = build_report(&input, Viewport::default()).expect("report");

        assert_eq!(report.summary.metrics.purchasing_power_change_percent, None);
        assert_eq!(report.summary.formatted.purchasing_power_change, "N/A");
        assert!(!report.summary.formatted.purchasing_power_change.contains("NaN"));
        assert_eq!(report.table[5].formatted.nominal_income, "$0");

        let json = serde_json::to_string(&report).expect("serializes");
        assert!(json.contains("\"purchasingPowerChangePercent\":null"));
        assert!(!json.contains("NaN"));
    }

    #[test]
    fn outpacing_growth_selects_winning_insight() {
        let mut input = sample_input();
        input.income_growth_rate_percent = 5.0;
        input.years = 25;
        let report = build_report(&input, Viewport::default()).expect("report");

        assert_eq!(report.insight.kind, Insight::OutpacingInflation);
        assert!(report.summary.formatted.purchasing_power_change.starts_with('+'));
    }

    #[test]
    fn report_serializes_camel_case_fields() {
        let report = build_report(&sample_input(), Viewport::default()).expect("report");
        let json = serde_json::to_string(&report).expect("serializes");

        assert!(json.contains("\"currentAnnualIncome\":60000"));
        assert!(json.contains("\"purchasingPowerTrend\":\"negative\""));
        assert!(json.contains("\"kind\":\"falling-behind\""));
        assert!(json.contains("\"yearLabel\":\"Now\""));
        assert!(json.contains("\"incomeSvg\""));
        assert!(json.contains("\"savingsSvg\""));
        assert!(json.contains("\"monthlyIncome\":5000.0"));
    }

    #[test]
    fn text_output_lists_every_year() {
        let report = build_report(&sample_input(), Viewport::default()).expect("report");
        let text = render_text(&report);

        assert!(text.contains("Current annual income:   $60,000"));
        assert!(text.contains("Year 10"));
        assert!(text.contains(&format!(
            "Currency value lost:     25.6%\n\n{}\n\nYear ",
            report.insight.message
        )));
        assert!(text.ends_with("74.4%\n"));
        let year_rows = text
            .lines()
            .filter(|l| l.starts_with("Year ") && l.contains('$'))
            .count();
        assert_eq!(year_rows, 10);
    }

    #[test]
    fn presenter_keeps_latest_report() {
        let mut presenter = Presenter::new(sample_input(), Viewport::default());
        assert!(presenter.latest().is_none());

        presenter.recompute().expect("report");
        assert_eq!(presenter.latest().map(|r| r.projection.horizon()), Some(10));

        let mut input = sample_input();
        input.years = 20;
        presenter.set_input(input);
        presenter.resize(Viewport {
            width: 500,
            height: 250,
        });
        let report = presenter.recompute().expect("report");
        assert_eq!(report.projection.horizon(), 20);
        assert_eq!(report.charts.width, 500);
        assert_eq!(presenter.viewport().height, 250);
        assert_eq!(presenter.input().years, 20);
    }
}
