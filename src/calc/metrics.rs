// 📊 Property Metrics - value the subject from its comparables
//
// Only non-subject comparables with plausible price/sqft and size count.

use crate::entities::{ComparableListing, PropertyRecord};
use crate::error::CalcError;
use crate::validation::{is_in_range, round_half_up, round_one_decimal};
use serde::{Deserialize, Serialize};

const PRICE_PER_SQFT_RANGE: (f64, f64) = (1.0, 10_000.0);
const SQFT_RANGE: (f64, f64) = (100.0, 50_000.0);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetrics {
    pub avg_price_per_sqft: f64,
    pub estimated_value: f64,
    pub equity: f64,
    pub appreciation_percent: f64,
    pub comparables_used: usize,
    pub error: Option<CalcError>,
}

/// Comparables that participate in the valuation.
pub fn valid_comparables(comparables: &[ComparableListing]) -> Vec<&ComparableListing> {
    comparables
        .iter()
        .filter(|c| !c.is_subject())
        .filter(|c| is_in_range(c.price_per_sqft, PRICE_PER_SQFT_RANGE.0, PRICE_PER_SQFT_RANGE.1))
        .filter(|c| is_in_range(c.sqft, SQFT_RANGE.0, SQFT_RANGE.1))
        .collect()
}

pub fn calculate_property_metrics(
    comparables: &[ComparableListing],
    subject: &PropertyRecord,
    loan_amount: f64,
) -> PropertyMetrics {
    if comparables.is_empty() {
        return PropertyMetrics {
            error: Some(CalcError::NoComparableData),
            ..PropertyMetrics::default()
        };
    }

    let valid = valid_comparables(comparables);
    if valid.is_empty() {
        return PropertyMetrics {
            estimated_value: subject.list_price,
            error: Some(CalcError::NoValidComparables),
            ..PropertyMetrics::default()
        };
    }

    let avg = valid.iter().map(|c| c.price_per_sqft).sum::<f64>() / valid.len() as f64;
    let estimated = subject.sqft * avg;
    let equity = estimated - loan_amount;
    let appreciation = if subject.purchase_price > 0.0 {
        (estimated - subject.purchase_price) / subject.purchase_price * 100.0
    } else {
        0.0
    };

    PropertyMetrics {
        avg_price_per_sqft: round_half_up(avg),
        estimated_value: round_half_up(estimated),
        equity: round_half_up(equity),
        appreciation_percent: round_one_decimal(appreciation),
        comparables_used: valid.len(),
        error: None,
    }
}
