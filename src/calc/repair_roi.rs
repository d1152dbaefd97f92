// 🔧 Repair ROI Calculator
//
// Sums the valid budget allocations against the category table:
// - value added = Σ budget × roi
// - time reduction = Σ days for every funded category (flat, capped at 45)
// Dollar outputs are whole dollars; the percentage uses the unrounded sums.

use crate::entities::{RepairBudgetMap, RepairCategoryTable};
use crate::error::CalcError;
use crate::validation::{is_in_range, round_half_up};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_CATEGORY_BUDGET: f64 = 1_000_000.0;
pub const MAX_TIME_REDUCTION_DAYS: u32 = 45;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRoi {
    pub total_investment: f64,
    pub value_added: f64,
    pub net_roi: f64,
    /// One-decimal text, e.g. "94.0".
    pub roi_percent: String,
    /// Unformatted percentage used for threshold decisions.
    #[serde(skip)]
    pub roi_percent_exact: f64,
    pub time_reduction_days: u32,
    pub new_estimated_value: f64,
    pub error: Option<CalcError>,
}

impl Default for RepairRoi {
    fn default() -> Self {
        RepairRoi {
            total_investment: 0.0,
            value_added: 0.0,
            net_roi: 0.0,
            roi_percent: "0.0".to_string(),
            roi_percent_exact: 0.0,
            time_reduction_days: 0,
            new_estimated_value: 0.0,
            error: None,
        }
    }
}

pub fn calculate_repair_roi(
    budgets: &RepairBudgetMap,
    table: &RepairCategoryTable,
    current_value: f64,
) -> RepairRoi {
    let mut total_investment = 0.0;
    let mut value_added = 0.0;
    let mut time_reduction = 0.0;

    for (key, amount) in budgets.iter() {
        let Some(category) = table.get(key) else {
            debug!(key, "ignoring budget for unknown repair category");
            continue;
        };
        if !is_in_range(amount, 0.0, MAX_CATEGORY_BUDGET) {
            debug!(key, amount, "ignoring invalid budget");
            continue;
        }

        total_investment += amount;
        if amount > 0.0 {
            value_added += amount * category.roi;
            time_reduction += category.days_reduction as f64;
        }
    }

    let net_roi = value_added - total_investment;
    let roi_percent = if total_investment > 0.0 {
        net_roi / total_investment * 100.0
    } else {
        0.0
    };
    let time_reduction_days = (round_half_up(time_reduction) as u32).min(MAX_TIME_REDUCTION_DAYS);

    RepairRoi {
        total_investment,
        value_added: round_half_up(value_added),
        net_roi: round_half_up(net_roi),
        roi_percent: format!("{:.1}", roi_percent),
        roi_percent_exact: roi_percent,
        time_reduction_days,
        new_estimated_value: round_half_up(current_value + value_added),
        error: None,
    }
}
