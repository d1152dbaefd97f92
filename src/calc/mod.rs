// 🧮 Calculators
//
// Stateless leaves first: mortgage → metrics → repair ROI → recommendations.
// Each takes an immutable snapshot and returns a result record whose
// `error` field carries any calculation failure.

pub mod mortgage;
pub mod metrics;
pub mod repair_roi;
pub mod summary;

pub use mortgage::{calculate_mortgage, MortgageBreakdown};
pub use metrics::{calculate_property_metrics, valid_comparables, PropertyMetrics};
pub use repair_roi::{calculate_repair_roi, RepairRoi};
pub use summary::{CompetitiveAdvantage, Recommendation, RecommendationEngine};
