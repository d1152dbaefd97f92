// 💰 Mortgage Parameters
//
// loan_amount is derived (purchase − down payment) whenever either input is
// edited through `apply`, but stays a stored field so a caller can still
// hand the calculator an arbitrary principal.

use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// Loan terms offered in the editor.
pub const ALLOWED_LOAN_TERMS: [u32; 5] = [15, 20, 25, 30, 40];

pub const MAX_PURCHASE_PRICE: f64 = 50_000_000.0;
pub const MAX_INTEREST_RATE: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageParameters {
    pub purchase_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    /// Annual rate in percent.
    pub interest_rate: f64,
    pub loan_term: u32,
    #[serde(default)]
    pub property_tax: Option<f64>,
    #[serde(default)]
    pub home_insurance: Option<f64>,
    #[serde(default)]
    pub hoa: Option<f64>,
    #[serde(default)]
    pub pmi: Option<f64>,
}

impl Default for MortgageParameters {
    fn default() -> Self {
        MortgageParameters {
            purchase_price: 420_000.0,
            down_payment: 105_000.0,
            loan_amount: 315_000.0,
            interest_rate: 7.25,
            loan_term: 30,
            property_tax: Some(320.0),
            home_insurance: Some(150.0),
            hoa: Some(0.0),
            pmi: Some(0.0),
        }
    }
}

/// A single validated edit of the mortgage form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MortgageField {
    PurchasePrice(f64),
    DownPayment(f64),
    InterestRate(f64),
    LoanTerm(u32),
    PropertyTax(f64),
    HomeInsurance(f64),
    Hoa(f64),
    Pmi(f64),
}

impl MortgageParameters {
    /// Monthly escrow items; missing ones count as zero.
    pub fn escrow_total(&self) -> f64 {
        [self.property_tax, self.home_insurance, self.hoa, self.pmi]
            .iter()
            .map(|v| v.unwrap_or(0.0))
            .sum()
    }

    /// Validate and apply one edit. The record is untouched on error.
    pub fn apply(&mut self, field: MortgageField) -> Result<(), InputError> {
        match field {
            MortgageField::PurchasePrice(value) => {
                if !(0.0..=MAX_PURCHASE_PRICE).contains(&value) {
                    return Err(InputError::PurchasePriceOutOfRange);
                }
                self.purchase_price = value;
                self.recompute_loan_amount();
            }
            MortgageField::DownPayment(value) => {
                if value < 0.0 || value > self.purchase_price || !value.is_finite() {
                    return Err(InputError::DownPaymentOutOfRange);
                }
                self.down_payment = value;
                self.recompute_loan_amount();
            }
            MortgageField::InterestRate(value) => {
                if !(0.0..=MAX_INTEREST_RATE).contains(&value) {
                    return Err(InputError::InterestRateOutOfRange);
                }
                self.interest_rate = value;
            }
            MortgageField::LoanTerm(years) => {
                if !ALLOWED_LOAN_TERMS.contains(&years) {
                    return Err(InputError::UnsupportedLoanTerm(years));
                }
                self.loan_term = years;
            }
            MortgageField::PropertyTax(value) => {
                self.property_tax = Some(non_negative("Property tax", value)?);
            }
            MortgageField::HomeInsurance(value) => {
                self.home_insurance = Some(non_negative("Home insurance", value)?);
            }
            MortgageField::Hoa(value) => {
                self.hoa = Some(non_negative("HOA", value)?);
            }
            MortgageField::Pmi(value) => {
                self.pmi = Some(non_negative("PMI", value)?);
            }
        }
        Ok(())
    }

    fn recompute_loan_amount(&mut self) {
        self.loan_amount = (self.purchase_price - self.down_payment).max(0.0);
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, InputError> {
    if value < 0.0 || !value.is_finite() {
        Err(InputError::NegativeAmount(name))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_amount_follows_purchase_and_down_payment() {
        let mut params = MortgageParameters::default();

        params.apply(MortgageField::PurchasePrice(500_000.0)).unwrap();
        assert_eq!(params.loan_amount, 395_000.0);

        params.apply(MortgageField::DownPayment(100_000.0)).unwrap();
        assert_eq!(params.loan_amount, 400_000.0);
    }

    #[test]
    fn test_down_payment_cannot_exceed_price() {
        let mut params = MortgageParameters::default();
        let before = params.clone();

        let err = params.apply(MortgageField::DownPayment(500_000.0)).unwrap_err();
        assert_eq!(err, InputError::DownPaymentOutOfRange);
        assert_eq!(params, before, "failed edit must not change the record");
    }

    #[test]
    fn test_loan_term_restricted_to_offered_terms() {
        let mut params = MortgageParameters::default();

        assert!(params.apply(MortgageField::LoanTerm(15)).is_ok());
        assert_eq!(params.loan_term, 15);
        assert_eq!(
            params.apply(MortgageField::LoanTerm(35)),
            Err(InputError::UnsupportedLoanTerm(35))
        );
    }

    #[test]
    fn test_rate_and_price_bounds() {
        let mut params = MortgageParameters::default();
        assert!(params.apply(MortgageField::InterestRate(30.5)).is_err());
        assert!(params.apply(MortgageField::PurchasePrice(-1.0)).is_err());
        assert!(params.apply(MortgageField::PurchasePrice(f64::NAN)).is_err());
        assert!(params.apply(MortgageField::Hoa(-5.0)).is_err());
    }

    #[test]
    fn test_escrow_treats_missing_as_zero() {
        let params = MortgageParameters {
            property_tax: Some(320.0),
            home_insurance: None,
            hoa: Some(50.0),
            pmi: None,
            ..MortgageParameters::default()
        };
        assert_eq!(params.escrow_total(), 370.0);
    }
}
