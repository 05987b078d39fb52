use serde::{Deserialize, Serialize};

use super::input::CalculatorInput;

/// Average number of weeks in a month.
pub const WEEKS_PER_MONTH: f64 = 4.33;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCost {
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    /// Hours saved per person each week.
    pub time_saved_per_week: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub first_year: f64,
    pub net_first_year: f64,
    /// Percentage; `None` when the first-year cost is zero.
    pub roi: Option<f64>,
    /// Months; `None` when the ratio is undefined.
    pub payback_period: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeYearProjection {
    pub year1: f64,
    pub year2: f64,
    pub year3: f64,
    pub total: f64,
}

/// Every figure derived from a [`CalculatorInput`]. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub current_manual_cost: ManualCost,
    pub savings: Savings,
    pub investment: Investment,
    pub three_year_projection: ThreeYearProjection,
}

/// Compute the full ROI picture for a set of inputs.
///
/// Figures are neither rounded nor clamped; a negative ROI is a valid result.
pub fn compute_roi(input: &CalculatorInput) -> RoiResult {
    let weekly_manual_cost = input.manual_hours * input.hourly_rate * input.team_size;
    let monthly_manual_cost = weekly_manual_cost * WEEKS_PER_MONTH;
    let yearly_manual_cost = monthly_manual_cost * MONTHS_PER_YEAR;

    let time_saved_per_person = input.manual_hours * (input.automation_percentage / 100.0);
    let weekly_savings = time_saved_per_person * input.hourly_rate * input.team_size;
    let monthly_savings = weekly_savings * WEEKS_PER_MONTH;
    let yearly_savings = monthly_savings * MONTHS_PER_YEAR;

    let yearly_subscription = input.software_cost * MONTHS_PER_YEAR;
    let total_first_year_cost = yearly_subscription + input.implementation_cost;
    let net_first_year_savings = yearly_savings - total_first_year_cost;
    let roi = ratio(yearly_savings - total_first_year_cost, total_first_year_cost)
        .map(|fraction| fraction * 100.0);
    let payback_period = ratio(total_first_year_cost, monthly_savings);

    // Implementation cost is paid once; later years only carry the subscription.
    let year2 = yearly_savings - yearly_subscription;
    let year3 = yearly_savings - yearly_subscription;

    RoiResult {
        current_manual_cost: ManualCost {
            weekly: weekly_manual_cost,
            monthly: monthly_manual_cost,
            yearly: yearly_manual_cost,
        },
        savings: Savings {
            time_saved_per_week: time_saved_per_person,
            weekly: weekly_savings,
            monthly: monthly_savings,
            yearly: yearly_savings,
        },
        investment: Investment {
            first_year: total_first_year_cost,
            net_first_year: net_first_year_savings,
            roi,
            payback_period,
        },
        three_year_projection: ThreeYearProjection {
            year1: net_first_year_savings,
            year2,
            year3,
            total: net_first_year_savings + year2 + year3,
        },
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

impl CalculatorInput {
    pub fn compute(&self) -> RoiResult {
        compute_roi(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_input() -> CalculatorInput {
        CalculatorInput {
            manual_hours: 40.0,
            hourly_rate: 50.0,
            team_size: 5.0,
            automation_percentage: 60.0,
            software_cost: 500.0,
            implementation_cost: 5000.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn seed_scenario_matches_reference_figures() {
        let result = compute_roi(&seed_input());

        assert_close(result.current_manual_cost.weekly, 10_000.0);
        assert_close(result.current_manual_cost.yearly, 519_600.0);
        assert_close(result.savings.time_saved_per_week, 24.0);
        assert_close(result.savings.weekly, 6_000.0);
        assert_close(result.savings.monthly, 25_980.0);
        assert_close(result.savings.yearly, 311_760.0);
        assert_close(result.investment.first_year, 11_000.0);
        assert_close(result.investment.net_first_year, 300_760.0);

        let roi = result.investment.roi.expect("roi defined");
        assert!((roi - 2734.18).abs() < 0.01, "roi was {roi}");
        let payback = result.investment.payback_period.expect("payback defined");
        assert!((payback - 0.4234).abs() < 0.001, "payback was {payback}");
    }

    #[test]
    fn later_years_skip_implementation_cost() {
        let result = compute_roi(&seed_input());
        assert_close(result.three_year_projection.year1, 300_760.0);
        assert_close(result.three_year_projection.year2, 305_760.0);
        assert_eq!(
            result.three_year_projection.year2,
            result.three_year_projection.year3
        );
        assert_close(result.three_year_projection.total, 912_280.0);
    }

    #[test]
    fn zero_cost_yields_sentinels() {
        let input = CalculatorInput {
            manual_hours: 10.0,
            hourly_rate: 20.0,
            team_size: 1.0,
            automation_percentage: 10.0,
            software_cost: 0.0,
            implementation_cost: 0.0,
        };
        let result = compute_roi(&input);
        assert_eq!(result.investment.first_year, 0.0);
        assert_eq!(result.investment.roi, None);
        assert_eq!(result.investment.payback_period, None);
        assert!(result.savings.yearly > 0.0);
    }

    #[test]
    fn negative_roi_is_not_clamped() {
        let input = CalculatorInput {
            manual_hours: 10.0,
            hourly_rate: 20.0,
            team_size: 1.0,
            automation_percentage: 10.0,
            software_cost: 1_000.0,
            implementation_cost: 20_000.0,
        };
        let result = compute_roi(&input);
        assert!(result.investment.roi.expect("roi defined") < 0.0);
        assert!(result.investment.net_first_year < 0.0);
    }

    #[test]
    fn zero_savings_leaves_payback_undefined() {
        let input = CalculatorInput {
            automation_percentage: 0.0,
            ..seed_input()
        };
        let result = compute_roi(&input);
        assert_eq!(result.investment.payback_period, None);
        assert_close(result.investment.roi.expect("roi defined"), -100.0);
    }

    #[test]
    fn serializes_sentinel_as_null() {
        let input = CalculatorInput {
            software_cost: 0.0,
            implementation_cost: 0.0,
            ..seed_input()
        };
        let value = serde_json::to_value(compute_roi(&input)).expect("serializes");
        assert!(value["investment"]["roi"].is_null());
        assert!(value["investment"]["paybackPeriod"].is_null());
        assert!(value["threeYearProjection"]["total"].is_number());
    }
}
