// 🏠 Property Entity - the subject of the analysis
//
// Mutated by form edits only; calculators read it as an immutable snapshot.

use crate::entities::RepairKind;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONDITION SCALES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }

    pub fn parse(value: &str) -> Option<Condition> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Next rating down the scale, wrapping Poor → Excellent.
    pub fn next(&self) -> Condition {
        let i = Condition::ALL.iter().position(|c| c == self).unwrap_or(0);
        Condition::ALL[(i + 1) % Condition::ALL.len()]
    }
}

/// How much staging the listing needs. `Needed` is treated like `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagingNeed {
    High,
    Medium,
    Low,
    Needed,
}

impl StagingNeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingNeed::High => "High",
            StagingNeed::Medium => "Medium",
            StagingNeed::Low => "Low",
            StagingNeed::Needed => "Needed",
        }
    }

    pub fn next(&self) -> StagingNeed {
        match self {
            StagingNeed::High => StagingNeed::Medium,
            StagingNeed::Medium => StagingNeed::Low,
            StagingNeed::Low | StagingNeed::Needed => StagingNeed::High,
        }
    }
}

/// Per-feature condition sub-map driving the budget rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConditions {
    pub kitchen: Condition,
    pub bathroom: Condition,
    pub flooring: Condition,
    /// `true` when the property needs fresh paint.
    pub painting: bool,
    pub roofing: Condition,
    pub hvac: Condition,
    pub landscaping: Condition,
    pub staging: StagingNeed,
    #[serde(default)]
    pub defects: Vec<String>,
}

impl Default for FeatureConditions {
    fn default() -> Self {
        FeatureConditions {
            kitchen: Condition::Fair,
            bathroom: Condition::Fair,
            flooring: Condition::Fair,
            painting: false,
            roofing: Condition::Good,
            hvac: Condition::Good,
            landscaping: Condition::Fair,
            staging: StagingNeed::Medium,
            defects: Vec::new(),
        }
    }
}

impl FeatureConditions {
    /// Rotate the rating that drives `kind`'s budget rule.
    pub fn cycle(&mut self, kind: RepairKind) {
        match kind {
            RepairKind::Kitchen => self.kitchen = self.kitchen.next(),
            RepairKind::Bathroom => self.bathroom = self.bathroom.next(),
            RepairKind::Flooring => self.flooring = self.flooring.next(),
            RepairKind::Painting => self.painting = !self.painting,
            RepairKind::Roofing => self.roofing = self.roofing.next(),
            RepairKind::Hvac => self.hvac = self.hvac.next(),
            RepairKind::Landscaping => self.landscaping = self.landscaping.next(),
            RepairKind::Staging => self.staging = self.staging.next(),
        }
    }
}

// ============================================================================
// PROPERTY RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub address: String,
    pub subdivision: String,
    pub list_price: f64,
    pub current_value: f64,
    pub purchase_price: f64,
    pub purchase_date: String,
    pub sqft: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub lot_size: String,
    pub year_built: i32,
    pub property_type: String,
    pub condition: Condition,
    pub garage: u32,
    pub pool: bool,
    pub hoa_fees: f64,
    pub tax_assessment: f64,
    pub annual_taxes: f64,
    pub mls_number: String,
    pub days_on_market: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub conditions: FeatureConditions,
}

impl PropertyRecord {
    /// The sample subject property loaded when a session starts.
    pub fn sample() -> Self {
        PropertyRecord {
            address: "2015 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            list_price: 305_000.0,
            current_value: 305_000.0,
            purchase_price: 75_000.0,
            purchase_date: "2012".to_string(),
            sqft: 1148.0,
            bedrooms: 2,
            bathrooms: 1.5,
            lot_size: "5,998 sq ft".to_string(),
            year_built: 1972,
            property_type: "Single Family".to_string(),
            condition: Condition::Fair,
            garage: 1,
            pool: false,
            hoa_fees: 0.0,
            tax_assessment: 225_000.0,
            annual_taxes: 3850.0,
            mls_number: String::new(),
            days_on_market: 0,
            latitude: 27.9778,
            longitude: -82.7264,
            conditions: FeatureConditions::default(),
        }
    }

    /// Age in years relative to `current_year` (never negative).
    pub fn age(&self, current_year: i32) -> i32 {
        (current_year - self.year_built).max(0)
    }
}

impl Default for PropertyRecord {
    fn default() -> Self {
        PropertyRecord::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse_is_case_insensitive() {
        assert_eq!(Condition::parse("poor"), Some(Condition::Poor));
        assert_eq!(Condition::parse(" Excellent "), Some(Condition::Excellent));
        assert_eq!(Condition::parse("Needs Repair"), None);
    }

    #[test]
    fn test_sample_property_round_trips_through_json() {
        let property = PropertyRecord::sample();
        let json = serde_json::to_string(&property).unwrap();

        assert!(json.contains("\"listPrice\":305000.0"));
        assert!(json.contains("\"staging\":\"Medium\""));

        let restored: PropertyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, property);
    }

    #[test]
    fn test_condition_cycle() {
        let mut conditions = FeatureConditions::default();
        conditions.cycle(RepairKind::Kitchen);
        assert_eq!(conditions.kitchen, Condition::Poor);
        conditions.cycle(RepairKind::Kitchen);
        assert_eq!(conditions.kitchen, Condition::Excellent, "wraps back to the top");

        conditions.cycle(RepairKind::Painting);
        assert!(conditions.painting);
        conditions.cycle(RepairKind::Staging);
        assert_eq!(conditions.staging, StagingNeed::Low);
    }

    #[test]
    fn test_property_age() {
        let property = PropertyRecord::sample();
        assert_eq!(property.age(2025), 53);
        assert_eq!(property.age(1900), 0);
    }
}
