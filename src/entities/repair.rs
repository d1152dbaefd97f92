// 🔧 Repair Categories & Budgets
//
// The category table is static reference data for the session.
// Budgets are keyed by string so that stale or foreign keys survive a
// round-trip through storage; the ROI calculator discards them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// REPAIR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairKind {
    Kitchen,
    Bathroom,
    Flooring,
    Painting,
    Roofing,
    Hvac,
    Landscaping,
    Staging,
}

impl RepairKind {
    pub const ALL: [RepairKind; 8] = [
        RepairKind::Kitchen,
        RepairKind::Bathroom,
        RepairKind::Flooring,
        RepairKind::Painting,
        RepairKind::Roofing,
        RepairKind::Hvac,
        RepairKind::Landscaping,
        RepairKind::Staging,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RepairKind::Kitchen => "kitchen",
            RepairKind::Bathroom => "bathroom",
            RepairKind::Flooring => "flooring",
            RepairKind::Painting => "painting",
            RepairKind::Roofing => "roofing",
            RepairKind::Hvac => "hvac",
            RepairKind::Landscaping => "landscaping",
            RepairKind::Staging => "staging",
        }
    }

    pub fn from_key(key: &str) -> Option<RepairKind> {
        RepairKind::ALL.into_iter().find(|k| k.key() == key)
    }

    /// "kitchen" → "Kitchen"
    pub fn label(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

// ============================================================================
// REPAIR CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairCategory {
    pub kind: RepairKind,
    pub name: String,
    /// Value added per dollar spent.
    pub roi: f64,
    /// Days-on-market reduction contributed when funded at all.
    pub days_reduction: u32,
    pub max_budget: f64,
}

impl RepairCategory {
    pub fn new(kind: RepairKind, name: &str, roi: f64, days_reduction: u32, max_budget: f64) -> Self {
        RepairCategory {
            kind,
            name: name.to_string(),
            roi,
            days_reduction,
            max_budget,
        }
    }
}

/// Immutable lookup of categories by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairCategoryTable {
    categories: BTreeMap<String, RepairCategory>,
}

impl RepairCategoryTable {
    pub fn from_categories(categories: Vec<RepairCategory>) -> Self {
        RepairCategoryTable {
            categories: categories
                .into_iter()
                .map(|c| (c.kind.key().to_string(), c))
                .collect(),
        }
    }

    /// The standard ROI table used by the dashboard.
    pub fn standard() -> Self {
        RepairCategoryTable::from_categories(vec![
            RepairCategory::new(RepairKind::Kitchen, "Kitchen Remodel", 0.96, 15, 25_000.0),
            RepairCategory::new(RepairKind::Bathroom, "Bathroom Update", 0.74, 10, 15_000.0),
            RepairCategory::new(RepairKind::Flooring, "Flooring Refinish", 0.85, 8, 12_000.0),
            RepairCategory::new(RepairKind::Painting, "Interior/Exterior Paint", 1.94, 5, 8_000.0),
            RepairCategory::new(RepairKind::Roofing, "Roof Replacement", 0.70, 12, 20_000.0),
            RepairCategory::new(RepairKind::Hvac, "HVAC Update", 0.66, 8, 10_000.0),
            RepairCategory::new(RepairKind::Landscaping, "Landscaping", 1.53, 7, 5_000.0),
            RepairCategory::new(RepairKind::Staging, "Professional Staging", 1.88, 20, 15_000.0),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&RepairCategory> {
        self.categories.get(key)
    }

    pub fn category(&self, kind: RepairKind) -> Option<&RepairCategory> {
        self.categories.get(kind.key())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepairCategory> {
        self.categories.values()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for RepairCategoryTable {
    fn default() -> Self {
        RepairCategoryTable::standard()
    }
}

// ============================================================================
// REPAIR BUDGET MAP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepairBudgetMap(BTreeMap<String, f64>);

impl RepairBudgetMap {
    /// Zero budget for every category in `table`.
    pub fn zeroed(table: &RepairCategoryTable) -> Self {
        RepairBudgetMap(table.iter().map(|c| (c.kind.key().to_string(), 0.0)).collect())
    }

    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn budget(&self, kind: RepairKind) -> f64 {
        self.get(kind.key())
    }

    pub fn set(&mut self, key: impl Into<String>, amount: f64) {
        self.0.insert(key.into(), amount);
    }

    pub fn set_budget(&mut self, kind: RepairKind, amount: f64) {
        self.set(kind.key(), amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for RepairBudgetMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        RepairBudgetMap(iter.into_iter().collect())
    }
}
