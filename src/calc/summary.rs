// 🧠 Recommendation Engine - condition rules → budgets → narrative report
//
// The only calculator with a side effect: applying the rules overwrites the
// budget map, then the ROI calculator is re-run on the new allocation.
// Rules are a pure function of the feature conditions, so a second run with
// unchanged conditions produces the same budgets.

use super::repair_roi::{calculate_repair_roi, RepairRoi};
use crate::entities::{
    Condition, FeatureConditions, PropertyRecord, RepairBudgetMap, RepairCategoryTable, RepairKind,
    StagingNeed,
};
use crate::validation::{format_thousands, round_half_up};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

const CURRENT_MARKET: &str = "buyer's market with increasing inventory";
const SEASONAL_FACTORS: &str = "Peak selling season approaching (spring market)";

const BASELINE_DAYS_TO_SELL: u32 = 43;
const MAX_DAYS_CREDIT: u32 = 25;

const QUICK_WINS: [&str; 4] = [
    "Professional photography and virtual tour ($500-800)",
    "Deep cleaning and decluttering ($200-500)",
    "Minor landscaping improvements ($500-1,500)",
    "Fresh interior paint touch-ups ($800-2,000)",
];

// ============================================================================
// RULE OUTCOME
// ============================================================================

/// What one condition rule decided for its category.
struct RuleOutcome {
    fraction: f64,
    priority_action: Option<&'static str>,
    recommendation: Option<&'static str>,
}

impl RuleOutcome {
    fn budget(fraction: f64) -> Self {
        RuleOutcome {
            fraction,
            priority_action: None,
            recommendation: None,
        }
    }

    fn priority(mut self, action: &'static str) -> Self {
        self.priority_action = Some(action);
        self
    }

    fn recommend(mut self, text: &'static str) -> Self {
        self.recommendation = Some(text);
        self
    }
}

fn rule_for(kind: RepairKind, conditions: &FeatureConditions) -> Option<RuleOutcome> {
    use Condition::*;

    match kind {
        RepairKind::Kitchen => match conditions.kitchen {
            Poor => Some(
                RuleOutcome::budget(0.9)
                    .priority("Kitchen requires major renovation")
                    .recommend("Kitchen is in poor condition - major remodel recommended for maximum ROI"),
            ),
            Fair => Some(
                RuleOutcome::budget(0.6).recommend("Kitchen updates will significantly improve marketability"),
            ),
            Good => Some(RuleOutcome::budget(0.3).recommend("Minor kitchen updates for competitive edge")),
            Excellent => None,
        },
        RepairKind::Bathroom => match conditions.bathroom {
            Poor => Some(RuleOutcome::budget(0.8).priority("Bathroom needs complete renovation")),
            Fair => Some(RuleOutcome::budget(0.5)),
            _ => None,
        },
        RepairKind::Flooring => match conditions.flooring {
            Poor => Some(RuleOutcome::budget(0.7).priority("Flooring replacement is critical")),
            Fair => Some(RuleOutcome::budget(0.4)),
            _ => None,
        },
        RepairKind::Painting => conditions.painting.then(|| {
            RuleOutcome::budget(0.8)
                .priority("Fresh paint is essential - highest ROI improvement")
                .recommend("Painting provides 194% ROI - highest priority")
        }),
        RepairKind::Roofing => match conditions.roofing {
            Poor => Some(RuleOutcome::budget(1.0).priority("Roof replacement is critical for sale")),
            Fair => Some(RuleOutcome::budget(0.3)),
            _ => None,
        },
        RepairKind::Hvac => match conditions.hvac {
            Poor => Some(RuleOutcome::budget(0.9).priority("HVAC system needs replacement")),
            Fair => Some(RuleOutcome::budget(0.4)),
            _ => None,
        },
        RepairKind::Landscaping => match conditions.landscaping {
            Poor => Some(RuleOutcome::budget(0.7).recommend("Curb appeal is critical in current market")),
            Fair => Some(RuleOutcome::budget(0.5)),
            _ => None,
        },
        RepairKind::Staging => Some(match conditions.staging {
            StagingNeed::High | StagingNeed::Needed => {
                RuleOutcome::budget(0.8).priority("Professional staging essential in buyer's market")
            }
            StagingNeed::Medium => RuleOutcome::budget(0.5),
            StagingNeed::Low => RuleOutcome::budget(0.2),
        }),
    }
}

/// Display text for the rating behind `kind`.
pub fn condition_label(kind: RepairKind, conditions: &FeatureConditions) -> &'static str {
    match kind {
        RepairKind::Kitchen => conditions.kitchen.as_str(),
        RepairKind::Bathroom => conditions.bathroom.as_str(),
        RepairKind::Flooring => conditions.flooring.as_str(),
        RepairKind::Painting => {
            if conditions.painting {
                "Needed"
            } else {
                "Not needed"
            }
        }
        RepairKind::Roofing => conditions.roofing.as_str(),
        RepairKind::Hvac => conditions.hvac.as_str(),
        RepairKind::Landscaping => conditions.landscaping.as_str(),
        RepairKind::Staging => conditions.staging.as_str(),
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitiveAdvantage {
    Strong,
    Moderate,
    Limited,
}

impl CompetitiveAdvantage {
    pub fn from_roi_percent(roi_percent: f64) -> Self {
        if roi_percent > 50.0 {
            CompetitiveAdvantage::Strong
        } else if roi_percent > 20.0 {
            CompetitiveAdvantage::Moderate
        } else {
            CompetitiveAdvantage::Limited
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitiveAdvantage::Strong => "Strong",
            CompetitiveAdvantage::Moderate => "Moderate",
            CompetitiveAdvantage::Limited => "Limited",
        }
    }

    pub fn success_probability(&self) -> &'static str {
        match self {
            CompetitiveAdvantage::Strong => "HIGH (85-95%)",
            CompetitiveAdvantage::Moderate => "MODERATE (70-85%)",
            CompetitiveAdvantage::Limited => "STANDARD (60-75%)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub generated_at: DateTime<Utc>,
    pub priority_actions: Vec<String>,
    pub recommendations: Vec<String>,
    pub roi: RepairRoi,
    pub advantage: CompetitiveAdvantage,
    pub expected_days_to_sell: u32,
    pub summary: String,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct RecommendationEngine {
    table: RepairCategoryTable,
}

impl RecommendationEngine {
    pub fn new(table: RepairCategoryTable) -> Self {
        RecommendationEngine { table }
    }

    /// Overwrite `budgets` from the condition rules and report on the result.
    pub fn run(
        &self,
        property: &PropertyRecord,
        budgets: &mut RepairBudgetMap,
        generated_at: DateTime<Utc>,
    ) -> Recommendation {
        let conditions = &property.conditions;
        let mut priority_actions = Vec::new();
        let mut recommendations = Vec::new();

        for kind in RepairKind::ALL {
            let (Some(outcome), Some(category)) = (rule_for(kind, conditions), self.table.category(kind))
            else {
                continue;
            };

            budgets.set_budget(kind, round_half_up(category.max_budget * outcome.fraction));
            priority_actions.extend(outcome.priority_action.map(String::from));
            recommendations.extend(outcome.recommendation.map(String::from));
        }

        let roi = calculate_repair_roi(budgets, &self.table, property.current_value);
        let advantage = CompetitiveAdvantage::from_roi_percent(roi.roi_percent_exact);
        let expected_days_to_sell =
            BASELINE_DAYS_TO_SELL - roi.time_reduction_days.min(MAX_DAYS_CREDIT);

        info!(
            investment = roi.total_investment,
            roi_percent = %roi.roi_percent,
            advantage = advantage.as_str(),
            "recommendations generated"
        );

        let mut recommendation = Recommendation {
            generated_at,
            priority_actions,
            recommendations,
            roi,
            advantage,
            expected_days_to_sell,
            summary: String::new(),
        };
        recommendation.summary = self.render(conditions, budgets, &recommendation);
        recommendation
    }

    fn render(
        &self,
        conditions: &FeatureConditions,
        budgets: &RepairBudgetMap,
        rec: &Recommendation,
    ) -> String {
        let roi = &rec.roi;
        let mut out = String::new();

        out.push_str("🏠 CMA DASHBOARD - MARKET ANALYSIS\n");
        out.push_str(&format!("Generated: {}\n\n", rec.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));

        out.push_str("📊 PROPERTY CONDITION ANALYSIS:\n");
        for kind in RepairKind::ALL {
            out.push_str(&format!(
                "• {}: {} → Budget: ${}\n",
                kind.label(),
                condition_label(kind, conditions),
                money(budgets.budget(kind))
            ));
        }

        out.push_str("\n🔧 IDENTIFIED DEFECTS:\n");
        push_bullets(&mut out, &conditions.defects, "No major defects identified");

        out.push_str("\n🎯 PRIORITY ACTIONS:\n");
        push_bullets(&mut out, &rec.priority_actions, "Standard market preparation recommended");

        out.push_str("\n💰 INVESTMENT ANALYSIS:\n");
        out.push_str(&format!("- Total Investment Required: ${}\n", money(roi.total_investment)));
        out.push_str(&format!("- Expected Value Added: ${}\n", money(roi.value_added)));
        out.push_str(&format!("- Net ROI: ${} ({}%)\n", money(roi.net_roi), roi.roi_percent));
        out.push_str(&format!("- Time Reduction: {} days\n", roi.time_reduction_days));
        out.push_str(&format!("- New Estimated Value: ${}\n", money(roi.new_estimated_value)));

        out.push_str("\n📈 MARKET POSITIONING:\n");
        out.push_str(&format!("- Current Market: {}\n", CURRENT_MARKET));
        out.push_str(&format!("- Seasonal Factors: {}\n", SEASONAL_FACTORS));
        out.push_str(&format!("- Competitive Advantage: {}\n", rec.advantage.as_str()));

        out.push_str("\n💡 KEY RECOMMENDATIONS:\n");
        push_bullets(&mut out, &rec.recommendations, "Follow standard market preparation guidelines");

        out.push_str("\n⚡ QUICK WINS (High ROI/Low Cost):\n");
        for win in QUICK_WINS {
            out.push_str(&format!("- {}\n", win));
        }

        out.push_str("\n🏆 SUCCESS PROBABILITY:\n");
        out.push_str(&format!(
            "Based on current investments and market conditions, this property has a {} \
             probability of selling within {} days at list price.\n",
            rec.advantage.success_probability(),
            rec.expected_days_to_sell
        ));

        out
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        RecommendationEngine::new(RepairCategoryTable::standard())
    }
}

fn money(amount: f64) -> String {
    format_thousands(round_half_up(amount) as i64)
}

fn push_bullets(out: &mut String, items: &[String], fallback: &str) {
    if items.is_empty() {
        out.push_str(&format!("• {}\n", fallback));
    }
    for item in items {
        out.push_str(&format!("• {}\n", item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    fn all_poor() -> PropertyRecord {
        let mut property = PropertyRecord::sample();
        property.conditions = FeatureConditions {
            kitchen: Condition::Poor,
            bathroom: Condition::Poor,
            flooring: Condition::Poor,
            painting: true,
            roofing: Condition::Poor,
            hvac: Condition::Poor,
            landscaping: Condition::Poor,
            staging: StagingNeed::Needed,
            defects: vec!["Cracked slab in garage".to_string()],
        };
        property
    }

    #[test]
    fn test_default_conditions_assign_budgets() {
        let engine = RecommendationEngine::default();
        let property = PropertyRecord::sample();
        let mut budgets = RepairBudgetMap::zeroed(&RepairCategoryTable::standard());

        let rec = engine.run(&property, &mut budgets, fixed_time());

        // Fair/Fair/Fair/no paint/Good/Good/Fair/Medium
        assert_eq!(budgets.budget(RepairKind::Kitchen), 15_000.0);
        assert_eq!(budgets.budget(RepairKind::Bathroom), 7500.0);
        assert_eq!(budgets.budget(RepairKind::Flooring), 4800.0);
        assert_eq!(budgets.budget(RepairKind::Painting), 0.0);
        assert_eq!(budgets.budget(RepairKind::Roofing), 0.0);
        assert_eq!(budgets.budget(RepairKind::Hvac), 0.0);
        assert_eq!(budgets.budget(RepairKind::Landscaping), 2500.0);
        assert_eq!(budgets.budget(RepairKind::Staging), 7500.0);

        assert_eq!(rec.roi.total_investment, 37_300.0);
        assert!(rec.priority_actions.is_empty());
        assert_eq!(rec.recommendations, vec!["Kitchen updates will significantly improve marketability"]);
        assert!(rec.summary.contains("• Standard market preparation recommended"));
        assert!(rec.summary.contains("Generated: 2025-08-01 12:00:00 UTC"));

        println!("✅ Default recommendation test PASSED");
    }

    #[test]
    fn test_all_poor_conditions() {
        let engine = RecommendationEngine::default();
        let mut budgets = RepairBudgetMap::zeroed(&RepairCategoryTable::standard());

        let rec = engine.run(&all_poor(), &mut budgets, fixed_time());

        assert_eq!(budgets.budget(RepairKind::Kitchen), 22_500.0);
        assert_eq!(budgets.budget(RepairKind::Roofing), 20_000.0);
        assert_eq!(budgets.budget(RepairKind::Painting), 6400.0);
        assert_eq!(budgets.budget(RepairKind::Staging), 12_000.0);
        assert_eq!(rec.priority_actions.len(), 7);
        assert_eq!(rec.roi.time_reduction_days, 45);
        assert_eq!(rec.expected_days_to_sell, 18);
        assert!(rec.summary.contains("• Cracked slab in garage"));
        assert!(rec.summary.contains("• Roof replacement is critical for sale"));
    }

    #[test]
    fn test_rules_are_idempotent() {
        let engine = RecommendationEngine::default();
        let property = all_poor();
        let mut budgets = RepairBudgetMap::zeroed(&RepairCategoryTable::standard());

        engine.run(&property, &mut budgets, fixed_time());
        let first = budgets.clone();
        let second_run = engine.run(&property, &mut budgets, fixed_time());

        assert_eq!(budgets, first, "second run must not change budgets");
        assert_eq!(second_run.roi, calculate_repair_roi(&first, &RepairCategoryTable::standard(), property.current_value));
    }

    #[test]
    fn test_unmatched_rule_keeps_existing_budget() {
        let engine = RecommendationEngine::default();
        let mut property = PropertyRecord::sample();
        property.conditions.kitchen = Condition::Excellent;
        property.conditions.roofing = Condition::Excellent;

        let mut budgets = RepairBudgetMap::zeroed(&RepairCategoryTable::standard());
        budgets.set_budget(RepairKind::Kitchen, 1234.0);
        budgets.set_budget(RepairKind::Roofing, 4321.0);

        engine.run(&property, &mut budgets, fixed_time());

        assert_eq!(budgets.budget(RepairKind::Kitchen), 1234.0);
        assert_eq!(budgets.budget(RepairKind::Roofing), 4321.0);
    }

    #[test]
    fn test_painting_only_reaches_strong_advantage() {
        let engine = RecommendationEngine::default();
        let mut property = PropertyRecord::sample();
        property.conditions = FeatureConditions {
            kitchen: Condition::Excellent,
            bathroom: Condition::Excellent,
            flooring: Condition::Excellent,
            painting: true,
            roofing: Condition::Excellent,
            hvac: Condition::Excellent,
            landscaping: Condition::Excellent,
            staging: StagingNeed::Low,
            defects: Vec::new(),
        };
        let mut budgets = RepairBudgetMap::zeroed(&RepairCategoryTable::standard());

        let rec = engine.run(&property, &mut budgets, fixed_time());

        // painting 6400 × 1.94 + staging 3000 × 1.88 over 9400 invested
        assert_eq!(rec.advantage, CompetitiveAdvantage::Strong);
        assert!(rec.summary.contains("HIGH (85-95%)"));
        assert_eq!(rec.expected_days_to_sell, 43 - 25);
    }

    #[test]
    fn test_advantage_thresholds() {
        assert_eq!(CompetitiveAdvantage::from_roi_percent(50.1), CompetitiveAdvantage::Strong);
        assert_eq!(CompetitiveAdvantage::from_roi_percent(50.0), CompetitiveAdvantage::Moderate);
        assert_eq!(CompetitiveAdvantage::from_roi_percent(20.0), CompetitiveAdvantage::Limited);
        assert_eq!(CompetitiveAdvantage::from_roi_percent(-10.0), CompetitiveAdvantage::Limited);
    }
}
