// 👤 Client Entity - intake form + stored record
//
// A ClientRecord keeps a denormalized copy of the property fields as they
// were typed at intake time. Numeric fields are optional: a blank form field
// means "not provided", not zero.

use super::property::{Condition, PropertyRecord};
use crate::error::FormErrors;
use crate::validation::{is_in_range, is_valid_email, is_valid_phone, is_valid_year};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many clients the list view shows.
pub const RECENT_CLIENTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentCondition {
    #[default]
    Unknown,
    New,
    Good,
    Fair,
    #[serde(rename = "Needs Repair")]
    NeedsRepair,
    Original,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenities {
    pub has_deck: bool,
    pub has_dock: bool,
    pub has_porch: bool,
    pub has_spa: bool,
    pub has_master_suite: bool,
    pub has_solar_heating: bool,
    pub has_vaulted_ceilings: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConditions {
    pub roof: ComponentCondition,
    pub windows: ComponentCondition,
    pub electric_panel: ComponentCondition,
    pub water_heater: ComponentCondition,
    pub doors: ComponentCondition,
    pub paint: ComponentCondition,
}

// ============================================================================
// INTAKE FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientIntake {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub subdivision: String,
    pub list_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub purchase_date: String,
    pub sqft: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub lot_size: String,
    pub year_built: Option<i32>,
    pub property_type: String,
    pub condition: Condition,
    pub garage: Option<u32>,
    pub pool: bool,
    pub current_mortgage_balance: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub tax_assessment: Option<f64>,
    pub annual_taxes: Option<f64>,
    pub hoa_fees: Option<f64>,
    pub mls_number: String,
    pub days_on_market: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub amenities: Amenities,
    pub components: ComponentConditions,
    pub repairs_needed: String,
}

impl Default for ClientIntake {
    fn default() -> Self {
        ClientIntake {
            client_name: String::new(),
            client_email: String::new(),
            client_phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: "FL".to_string(),
            zip: String::new(),
            subdivision: String::new(),
            list_price: None,
            purchase_price: None,
            purchase_date: String::new(),
            sqft: None,
            bedrooms: None,
            bathrooms: None,
            lot_size: String::new(),
            year_built: None,
            property_type: "Single Family".to_string(),
            condition: Condition::Fair,
            garage: None,
            pool: false,
            current_mortgage_balance: None,
            monthly_payment: None,
            tax_assessment: None,
            annual_taxes: Some(3850.0),
            hoa_fees: Some(0.0),
            mls_number: String::new(),
            days_on_market: 0,
            latitude: 27.9778,
            longitude: -82.7264,
            amenities: Amenities::default(),
            components: ComponentConditions::default(),
            repairs_needed: String::new(),
        }
    }
}

impl ClientIntake {
    /// Collect every field error at once, keyed by form field name.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.client_name.trim().is_empty() {
            errors.insert("clientName", "Client name is required");
        }
        if self.client_email.trim().is_empty() {
            errors.insert("clientEmail", "Email is required");
        } else if !is_valid_email(self.client_email.trim()) {
            errors.insert("clientEmail", "Please enter a valid email address");
        }
        if self.client_phone.trim().is_empty() {
            errors.insert("clientPhone", "Phone number is required");
        } else if !is_valid_phone(&self.client_phone) {
            errors.insert("clientPhone", "Please enter a valid phone number");
        }

        if self.address.trim().is_empty() {
            errors.insert("address", "Property address is required");
        }
        if self.city.trim().is_empty() {
            errors.insert("city", "City is required");
        }
        if self.zip.trim().is_empty() {
            errors.insert("zip", "ZIP code is required");
        }

        if let Some(price) = self.list_price {
            if !is_in_range(price, 1_000.0, 100_000_000.0) {
                errors.insert("listPrice", "List price must be between $1,000 and $100,000,000");
            }
        }
        if let Some(sqft) = self.sqft {
            if !is_in_range(sqft, 100.0, 50_000.0) {
                errors.insert("sqft", "Square footage must be between 100 and 50,000");
            }
        }
        if let Some(year) = self.year_built {
            if !is_valid_year(year) {
                errors.insert("yearBuilt", "Please enter a valid year");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// CLIENT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub intake: ClientIntake,
}

impl ClientRecord {
    /// Validate the intake and stamp it with a fresh identity.
    pub fn from_intake(intake: ClientIntake) -> Result<Self, FormErrors> {
        intake.validate()?;
        Ok(ClientRecord {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            intake,
        })
    }

    pub fn name(&self) -> &str {
        &self.intake.client_name
    }

    /// Copy the captured property fields onto `property`, keeping the
    /// existing value wherever the intake left a field blank.
    pub fn apply_to_property(&self, property: &mut PropertyRecord) {
        let intake = &self.intake;
        if !intake.address.trim().is_empty() {
            property.address = intake.address.clone();
        }
        if let Some(price) = intake.list_price.filter(|p| *p > 0.0) {
            property.list_price = price;
        }
        if let Some(sqft) = intake.sqft.filter(|s| *s > 0.0) {
            property.sqft = sqft;
        }
        if let Some(beds) = intake.bedrooms.filter(|b| *b > 0) {
            property.bedrooms = beds;
        }
        if let Some(baths) = intake.bathrooms.filter(|b| *b > 0.0) {
            property.bathrooms = baths;
        }
        if let Some(year) = intake.year_built.filter(|y| *y > 0) {
            property.year_built = year;
        }
        property.condition = intake.condition;
        property.pool = intake.pool || property.pool;
    }
}

/// Newest first, at most `RECENT_CLIENTS`.
pub fn recent_clients(clients: &[ClientRecord]) -> Vec<&ClientRecord> {
    clients.iter().rev().take(RECENT_CLIENTS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_intake() -> ClientIntake {
        ClientIntake {
            client_name: "Jane Seller".to_string(),
            client_email: "jane@example.com".to_string(),
            client_phone: "(727) 555-0100".to_string(),
            address: "100 Bay Esplanade".to_string(),
            city: "Clearwater".to_string(),
            zip: "33767".to_string(),
            list_price: Some(450_000.0),
            sqft: Some(1600.0),
            bedrooms: Some(3),
            bathrooms: Some(2.0),
            year_built: Some(1988),
            condition: Condition::Good,
            ..ClientIntake::default()
        }
    }

    #[test]
    fn test_valid_intake_passes() {
        assert!(valid_intake().validate().is_ok());
    }

    #[test]
    fn test_blank_intake_reports_required_fields() {
        let errors = ClientIntake::default().validate().unwrap_err();

        assert_eq!(errors.get("clientName"), Some("Client name is required"));
        assert_eq!(errors.get("clientEmail"), Some("Email is required"));
        assert_eq!(errors.get("clientPhone"), Some("Phone number is required"));
        assert!(errors.get("address").is_some());
        assert!(errors.get("city").is_some());
        assert!(errors.get("zip").is_some());
        assert!(errors.get("listPrice").is_none(), "blank numeric fields are optional");
    }

    #[test]
    fn test_numeric_ranges_checked_when_present() {
        let intake = ClientIntake {
            list_price: Some(500.0),
            sqft: Some(60_000.0),
            year_built: Some(1700),
            client_email: "not-an-email".to_string(),
            ..valid_intake()
        };
        let errors = intake.validate().unwrap_err();

        assert!(errors.get("listPrice").is_some());
        assert!(errors.get("sqft").is_some());
        assert!(errors.get("yearBuilt").is_some());
        assert_eq!(errors.get("clientEmail"), Some("Please enter a valid email address"));
    }

    #[test]
    fn test_apply_to_property_keeps_blank_fields() {
        let mut intake = valid_intake();
        intake.bathrooms = None;
        let record = ClientRecord::from_intake(intake).unwrap();

        let mut property = PropertyRecord::sample();
        record.apply_to_property(&mut property);

        assert_eq!(property.address, "100 Bay Esplanade");
        assert_eq!(property.list_price, 450_000.0);
        assert_eq!(property.sqft, 1600.0);
        assert_eq!(property.bathrooms, 1.5, "blank bathrooms keeps previous value");
        assert_eq!(property.condition, Condition::Good);
    }

    #[test]
    fn test_recent_clients_newest_first_and_capped() {
        let clients: Vec<ClientRecord> = (0..12)
            .map(|i| {
                let mut intake = valid_intake();
                intake.client_name = format!("Client {}", i);
                ClientRecord::from_intake(intake).unwrap()
            })
            .collect();

        let recent = recent_clients(&clients);
        assert_eq!(recent.len(), RECENT_CLIENTS);
        assert_eq!(recent[0].name(), "Client 11");
        assert_eq!(recent[9].name(), "Client 2");
    }

    #[test]
    fn test_record_flattens_intake_in_json() {
        let record = ClientRecord::from_intake(valid_intake()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["clientName"], "Jane Seller");
        assert!(json["createdAt"].is_string());

        let restored: ClientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored, record);
    }
}
