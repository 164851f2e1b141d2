use super::types::{
    ComparisonRow, Insight, ProjectionInput, ProjectionResult, SummaryMetrics, Trend,
};

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn project(input: &ProjectionInput) -> ProjectionResult {
    let years = input.years as usize;
    let inflation_factor = 1.0 + input.inflation_rate_percent / 100.0;
    let growth_factor = 1.0 + input.income_growth_rate_percent / 100.0;

    let mut year_labels = Vec::with_capacity(years + 1);
    let mut nominal_income = Vec::with_capacity(years + 1);
    let mut real_income = Vec::with_capacity(years + 1);
    let mut real_savings = Vec::with_capacity(years + 1);

    // Compounding runs on the unrounded value; only the stored series are rounded.
    let mut nominal = input.monthly_income * MONTHS_PER_YEAR;
    for year in 0..=years {
        if year > 0 {
            nominal *= growth_factor;
        }
        let deflator = cumulative_factor(inflation_factor, year);

        year_labels.push(year_label(year));
        nominal_income.push(to_currency_units(nominal));
        real_income.push(to_currency_units(nominal / deflator));
        real_savings.push(to_currency_units(input.current_savings / deflator));
    }

    let purchasing_power_change_percent =
        relative_change_percent(real_income[0], real_income[years]);
    let total_purchasing_power_loss_percent =
        100.0 - 100.0 / cumulative_factor(inflation_factor, years);
    let final_real_savings = real_savings[years];

    ProjectionResult {
        year_labels,
        nominal_income,
        real_income,
        real_savings,
        purchasing_power_change_percent,
        total_purchasing_power_loss_percent,
        final_real_savings,
    }
}

pub fn summarize(input: &ProjectionInput, result: &ProjectionResult) -> SummaryMetrics {
    let last = result.horizon();
    let change = result.purchasing_power_change_percent;
    SummaryMetrics {
        current_annual_income: result.nominal_income[0],
        future_nominal_income: result.nominal_income[last],
        future_real_income: result.real_income[last],
        purchasing_power_change_percent: change,
        purchasing_power_trend: trend_of(change),
        current_savings: to_currency_units(input.current_savings),
        future_real_savings: result.final_real_savings,
    }
}

pub fn classify_insight(input: &ProjectionInput) -> Insight {
    let inflation = input.inflation_rate_percent;
    let growth = input.income_growth_rate_percent;
    if inflation == 0.0 {
        Insight::NoInflation
    } else if growth > inflation {
        Insight::OutpacingInflation
    } else if growth == inflation {
        Insight::KeepingPace
    } else {
        Insight::FallingBehind
    }
}

pub fn comparison_rows(result: &ProjectionResult) -> Vec<ComparisonRow> {
    let baseline_savings = result.real_savings[0];
    result
        .year_labels
        .iter()
        .enumerate()
        .map(|(idx, label)| ComparisonRow {
            year_label: label.clone(),
            nominal_income: result.nominal_income[idx],
            real_income: result.real_income[idx],
            real_savings: result.real_savings[idx],
            purchasing_power_percent: (baseline_savings > 0)
                .then(|| 100.0 * result.real_savings[idx] as f64 / baseline_savings as f64),
        })
        .collect()
}

fn cumulative_factor(factor: f64, years: usize) -> f64 {
    factor.powi(years as i32)
}

fn year_label(year: usize) -> String {
    if year == 0 {
        "Now".to_string()
    } else {
        format!("Year {year}")
    }
}

fn to_currency_units(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn relative_change_percent(start: u64, end: u64) -> Option<f64> {
    if start == 0 {
        return None;
    }
    Some((end as f64 - start as f64) / start as f64 * 100.0)
}

fn trend_of(change: Option<f64>) -> Trend {
    match change {
        Some(v) if v > 0.0 => Trend::Positive,
        Some(v) if v < 0.0 => Trend::Negative,
        _ => Trend::Neutral,
    }
}
