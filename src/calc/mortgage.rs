// 💰 Mortgage Calculator - fixed-rate amortization
//
//   payment = P × r(1+r)^n / ((1+r)^n − 1)
//   r = annual_rate / 100 / 12, n = years × 12
//
// Invalid inputs short-circuit into a zeroed breakdown carrying a CalcError.

use crate::entities::MortgageParameters;
use crate::error::CalcError;
use crate::validation::is_in_range;
use serde::{Deserialize, Serialize};

pub const MAX_LOAN_AMOUNT: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageBreakdown {
    pub monthly_principal_and_interest: f64,
    pub total_monthly_payment: f64,
    pub total_interest_over_life: f64,
    pub error: Option<CalcError>,
}

impl MortgageBreakdown {
    fn failed(error: CalcError) -> Self {
        MortgageBreakdown {
            error: Some(error),
            ..MortgageBreakdown::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn calculate_mortgage(params: &MortgageParameters) -> MortgageBreakdown {
    if !is_in_range(params.loan_amount, 0.0, MAX_LOAN_AMOUNT) {
        return MortgageBreakdown::failed(CalcError::InvalidLoanAmount);
    }
    if !is_in_range(params.interest_rate, 0.0, 30.0) {
        return MortgageBreakdown::failed(CalcError::InvalidInterestRate);
    }
    if !(1..=50).contains(&params.loan_term) {
        return MortgageBreakdown::failed(CalcError::InvalidLoanTerm);
    }

    let principal = params.loan_amount;
    let r = params.interest_rate / 100.0 / 12.0;
    let n = (params.loan_term * 12) as f64;

    let payment = if params.interest_rate == 0.0 {
        principal / n
    } else {
        let growth = (1.0 + r).powf(n);
        let denominator = growth - 1.0;
        if denominator == 0.0 {
            return MortgageBreakdown::failed(CalcError::DegenerateAmortization);
        }
        principal * (r * growth) / denominator
    };

    let total = payment + params.escrow_total();
    let total_interest = payment * n - principal;

    MortgageBreakdown {
        monthly_principal_and_interest: finite_or_zero(payment),
        total_monthly_payment: finite_or_zero(total),
        total_interest_over_life: finite_or_zero(total_interest),
        error: None,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(loan: f64, rate: f64, term: u32) -> MortgageParameters {
        MortgageParameters {
            loan_amount: loan,
            interest_rate: rate,
            loan_term: term,
            ..MortgageParameters::default()
        }
    }

    #[test]
    fn test_standard_thirty_year_loan() {
        let breakdown = calculate_mortgage(&params(315_000.0, 7.25, 30));

        assert!(breakdown.is_ok());
        assert!(
            (breakdown.monthly_principal_and_interest - 2148.86).abs() < 1.0,
            "P&I was {}",
            breakdown.monthly_principal_and_interest
        );
        // 320 tax + 150 insurance from the defaults
        assert!((breakdown.total_monthly_payment - (breakdown.monthly_principal_and_interest + 470.0)).abs() < 1e-9);

        println!("✅ Mortgage P&I: ${:.2}", breakdown.monthly_principal_and_interest);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        for (loan, term) in [(200_000.0, 30), (99_999.0, 15), (1.0, 1), (0.0, 40)] {
            let breakdown = calculate_mortgage(&params(loan, 0.0, term));
            let n = (term * 12) as f64;

            assert_eq!(breakdown.monthly_principal_and_interest, loan / n);
            assert!(breakdown.total_interest_over_life.abs() < 1e-6);
        }
    }

    #[test]
    fn test_total_interest_identity() {
        for (loan, rate, term) in [(315_000.0, 7.25, 30), (50_000.0, 3.0, 15), (9_000_000.0, 29.9, 50)] {
            let breakdown = calculate_mortgage(&params(loan, rate, term));
            let n = (term * 12) as f64;
            let expected = breakdown.monthly_principal_and_interest * n - loan;

            assert!(
                (breakdown.total_interest_over_life - expected).abs() < 1e-6 * loan.max(1.0),
                "interest mismatch for {} @ {}%",
                loan,
                rate
            );
        }
    }

    #[test]
    fn test_invalid_inputs_return_error_tags() {
        assert_eq!(
            calculate_mortgage(&params(-1.0, 5.0, 30)).error,
            Some(CalcError::InvalidLoanAmount)
        );
        assert_eq!(
            calculate_mortgage(&params(10_000_001.0, 5.0, 30)).error,
            Some(CalcError::InvalidLoanAmount)
        );
        assert_eq!(
            calculate_mortgage(&params(100_000.0, 31.0, 30)).error,
            Some(CalcError::InvalidInterestRate)
        );
        assert_eq!(
            calculate_mortgage(&params(100_000.0, f64::NAN, 30)).error,
            Some(CalcError::InvalidInterestRate)
        );
        assert_eq!(
            calculate_mortgage(&params(100_000.0, 5.0, 0)).error,
            Some(CalcError::InvalidLoanTerm)
        );

        let failed = calculate_mortgage(&params(100_000.0, 5.0, 51));
        assert_eq!(failed.monthly_principal_and_interest, 0.0);
        assert_eq!(failed.total_monthly_payment, 0.0);
    }

    #[test]
    fn test_tiny_rate_degenerates_instead_of_dividing() {
        // (1 + r)^n rounds to exactly 1.0 for a sub-epsilon monthly rate.
        let breakdown = calculate_mortgage(&params(100_000.0, 1e-15, 30));
        assert_eq!(breakdown.error, Some(CalcError::DegenerateAmortization));
    }
}
