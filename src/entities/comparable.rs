// 🏘️ Comparable Listings
//
// Ordered collection; element 0 is the subject property itself.

use super::property::Condition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Subject,
    Active,
    Pending,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Subject => "Subject",
            ListingStatus::Active => "Active",
            ListingStatus::Pending => "Pending",
            ListingStatus::Sold => "Sold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableListing {
    pub id: i64,
    pub address: String,
    pub subdivision: String,
    /// Display label such as "0.3 mi" or "Subject".
    pub distance: String,
    pub status: ListingStatus,
    pub list_price: f64,
    #[serde(default)]
    pub sold_price: Option<f64>,
    #[serde(default)]
    pub sold_date: Option<String>,
    pub beds: u32,
    pub baths: f64,
    pub sqft: f64,
    pub year: i32,
    pub condition: Condition,
    pub price_per_sqft: f64,
    pub days_on_market: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl ComparableListing {
    pub fn is_subject(&self) -> bool {
        self.status == ListingStatus::Subject
    }

    /// Sold price when closed, otherwise the asking price.
    pub fn effective_price(&self) -> f64 {
        self.sold_price.unwrap_or(self.list_price)
    }
}

/// Starting comparables for the sample subject property.
pub fn sample_comparables() -> Vec<ComparableListing> {
    vec![
        ComparableListing {
            id: 1,
            address: "2015 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            distance: "Subject".to_string(),
            status: ListingStatus::Subject,
            list_price: 305_000.0,
            sold_price: None,
            sold_date: None,
            beds: 2,
            baths: 1.5,
            sqft: 1148.0,
            year: 1972,
            condition: Condition::Fair,
            price_per_sqft: 266.0,
            days_on_market: 0,
            latitude: 27.9778,
            longitude: -82.7264,
        },
        ComparableListing {
            id: 2,
            address: "2074 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            distance: "0.1 mi".to_string(),
            status: ListingStatus::Sold,
            list_price: 420_000.0,
            sold_price: Some(420_000.0),
            sold_date: Some("5/24".to_string()),
            beds: 3,
            baths: 2.0,
            sqft: 1128.0,
            year: 1970,
            condition: Condition::Excellent,
            price_per_sqft: 372.0,
            days_on_market: 22,
            latitude: 27.9785,
            longitude: -82.7269,
        },
        ComparableListing {
            id: 3,
            address: "2499 Indigo Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Meadows".to_string(),
            distance: "0.5 mi".to_string(),
            status: ListingStatus::Active,
            list_price: 289_900.0,
            sold_price: None,
            sold_date: None,
            beds: 2,
            baths: 1.0,
            sqft: 1420.0,
            year: 1975,
            condition: Condition::Poor,
            price_per_sqft: 211.0,
            days_on_market: 67,
            latitude: 27.9751,
            longitude: -82.7301,
        },
        ComparableListing {
            id: 4,
            address: "1982 Hillwood Dr, Clearwater, FL 33763".to_string(),
            subdivision: "Clearwater Acres".to_string(),
            distance: "0.2 mi".to_string(),
            status: ListingStatus::Pending,
            list_price: 385_000.0,
            sold_price: None,
            sold_date: None,
            beds: 3,
            baths: 2.0,
            sqft: 1250.0,
            year: 1973,
            condition: Condition::Good,
            price_per_sqft: 308.0,
            days_on_market: 35,
            latitude: 27.9768,
            longitude: -82.7258,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_starts_with_subject() {
        let comps = sample_comparables();
        assert_eq!(comps.len(), 4);
        assert!(comps[0].is_subject());
        assert!(comps[1..].iter().all(|c| !c.is_subject()));
    }

    #[test]
    fn test_effective_price_prefers_sold() {
        let comps = sample_comparables();
        assert_eq!(comps[1].effective_price(), 420_000.0);
        assert_eq!(comps[2].effective_price(), 289_900.0);
    }
}
