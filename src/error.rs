// ⚠️ Error taxonomy
//
// Calculation errors travel inside result records (CalcError).
// Everything else is returned as Err and surfaced as a notification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// CALCULATION ERRORS (carried by result records, never thrown)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum CalcError {
    #[error("Invalid loan amount")]
    InvalidLoanAmount,

    #[error("Invalid interest rate")]
    InvalidInterestRate,

    #[error("Invalid loan term")]
    InvalidLoanTerm,

    #[error("Invalid calculation parameters")]
    DegenerateAmortization,

    #[error("No comparable data available")]
    NoComparableData,

    #[error("No valid comparable data")]
    NoValidComparables,
}

// ============================================================================
// INPUT ERRORS (field edits)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Budget cannot be negative")]
    NegativeBudget,

    #[error("Unknown repair category: {0}")]
    UnknownCategory(String),

    #[error("Purchase price must be between $0 and $50,000,000")]
    PurchasePriceOutOfRange,

    #[error("Down payment cannot exceed purchase price")]
    DownPaymentOutOfRange,

    #[error("Interest rate must be between 0% and 30%")]
    InterestRateOutOfRange,

    #[error("Loan term must be 15, 20, 25, 30, or 40 years")]
    UnsupportedLoanTerm(u32),

    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),
}

/// Field name → message, one entry per invalid intake field.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("Please correct the errors in the form ({} field(s))", .0.len())]
pub struct FormErrors(pub BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// STORAGE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Data too large to save locally ({key}: {size} bytes)")]
    TooLarge { key: String, size: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// FEATURE ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MlsError {
    #[error("Address is required for MLS search")]
    AddressRequired,

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Request for {0} was superseded")]
    Cancelled(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhotoError {
    #[error("Image must be smaller than 5MB")]
    TooLarge(usize),

    #[error("Please upload only JPEG, PNG, or WebP images")]
    UnsupportedType(String),

    #[error("Maximum 20 photos allowed")]
    LimitReached,

    #[error("Photo already uploaded")]
    Duplicate,

    #[error("Photo not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_error_serializes_as_tag() {
        let json = serde_json::to_string(&CalcError::NoValidComparables).unwrap();
        assert_eq!(json, "\"no_valid_comparables\"");
        assert_eq!(CalcError::InvalidLoanTerm.to_string(), "Invalid loan term");
    }

    #[test]
    fn test_form_errors_summary() {
        let mut errors = FormErrors::default();
        errors.insert("clientName", "Client name is required");
        errors.insert("zip", "ZIP code is required");

        assert_eq!(errors.get("zip"), Some("ZIP code is required"));
        assert!(errors.to_string().contains("2 field(s)"));
    }
}
