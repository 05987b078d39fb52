use serde::Serialize;

use super::model::RoiResult;

/// Placeholder rendered for undefined ratios.
pub const NOT_APPLICABLE: &str = "N/A";

/// Whole-dollar currency string with thousands separators, e.g. `-$11,000`.
pub fn currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_APPLICABLE.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.1}%"),
        _ => NOT_APPLICABLE.to_string(),
    }
}

pub fn months(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.1} months"),
        _ => NOT_APPLICABLE.to_string(),
    }
}

pub fn hours(value: f64) -> String {
    format!("{value:.1} hrs")
}

/// Rendered strings for every headline figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiDisplay {
    pub weekly_manual_cost: String,
    pub monthly_manual_cost: String,
    pub yearly_manual_cost: String,
    pub time_saved_per_week: String,
    pub weekly_savings: String,
    pub monthly_savings: String,
    pub yearly_savings: String,
    pub first_year_cost: String,
    pub net_first_year: String,
    pub roi: String,
    pub payback_period: String,
    pub year1: String,
    pub year2: String,
    pub year3: String,
    pub three_year_total: String,
    pub positive_roi: bool,
}

impl RoiDisplay {
    pub fn from_result(result: &RoiResult) -> Self {
        let projection = &result.three_year_projection;
        Self {
            weekly_manual_cost: currency(result.current_manual_cost.weekly),
            monthly_manual_cost: currency(result.current_manual_cost.monthly),
            yearly_manual_cost: currency(result.current_manual_cost.yearly),
            time_saved_per_week: hours(result.savings.time_saved_per_week),
            weekly_savings: currency(result.savings.weekly),
            monthly_savings: currency(result.savings.monthly),
            yearly_savings: currency(result.savings.yearly),
            first_year_cost: currency(result.investment.first_year),
            net_first_year: currency(result.investment.net_first_year),
            roi: percent(result.investment.roi),
            payback_period: months(result.investment.payback_period),
            year1: currency(projection.year1),
            year2: currency(projection.year2),
            year3: currency(projection.year3),
            three_year_total: currency(projection.total),
            positive_roi: result.investment.net_first_year >= 0.0,
        }
    }
}
