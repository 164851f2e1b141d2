use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub monthly_income: f64,
    pub current_savings: f64,
    pub inflation_rate_percent: f64,
    pub income_growth_rate_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub year_labels: Vec<String>,
    pub nominal_income: Vec<u64>,
    pub real_income: Vec<u64>,
    pub real_savings: Vec<u64>,
    /// `None` when today's real income is zero and a relative change is undefined.
    pub purchasing_power_change_percent: Option<f64>,
    pub total_purchasing_power_loss_percent: f64,
    pub final_real_savings: u64,
}

impl ProjectionResult {
    pub fn horizon(&self) -> usize {
        self.year_labels.len().saturating_sub(1)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub current_annual_income: u64,
    pub future_nominal_income: u64,
    pub future_real_income: u64,
    pub purchasing_power_change_percent: Option<f64>,
    pub purchasing_power_trend: Trend,
    pub current_savings: u64,
    pub future_real_savings: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Insight {
    NoInflation,
    OutpacingInflation,
    KeepingPace,
    FallingBehind,
}

impl Insight {
    pub fn message(self) -> &'static str {
        match self {
            Insight::NoInflation => {
                "With zero inflation your money keeps its value: real and nominal figures are identical."
            }
            Insight::OutpacingInflation => {
                "Your income is growing faster than inflation, so your purchasing power increases over time."
            }
            Insight::KeepingPace => {
                "Your income growth matches inflation, so your purchasing power stays flat."
            }
            Insight::FallingBehind => {
                "Inflation is outpacing your income growth, so your purchasing power shrinks every year."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub year_label: String,
    pub nominal_income: u64,
    pub real_income: u64,
    pub real_savings: u64,
    pub purchasing_power_percent: Option<f64>,
}
