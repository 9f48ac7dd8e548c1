use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SolarError;
use crate::reference::PROJECTION_YEARS;
use crate::time_value::{annuity_payment, annuity_present_value};
use crate::types::{pct_to_rate, Money, Percent, Rate};
use crate::SolarResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest loan term accepted, in years.
pub const MAX_REPAYMENT_YEARS: u32 = 100;

/// How the system is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaymentMode {
    /// Full system cost paid in year 1.
    Upfront,
    /// Down payment in year 1, then an amortized loan on the remainder.
    Financing(FinancingTerms),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingTerms {
    #[serde(default)]
    pub down_payment: Money,
    /// Nominal annual rate as a percentage (6.5 = 6.5%).
    pub interest_rate_pct: Percent,
    pub repayment_years: u32,
}

/// A resolved loan. The monthly payment is fixed for the life of the loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingSchedule {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub term_months: u32,
    pub repayment_years: u32,
    pub monthly_payment: Money,
    pub annual_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Present value, at the loan rate, of the payments still due after the
    /// projection horizon. Zero when the loan ends within it.
    pub balance_after_horizon: Money,
}

impl FinancingTerms {
    pub fn validate(&self) -> SolarResult<()> {
        if self.repayment_years == 0 {
            return Err(SolarError::InvalidInput {
                field: "repayment_years".into(),
                reason: "repayment term must be at least one year".into(),
            });
        }
        if self.repayment_years > MAX_REPAYMENT_YEARS {
            return Err(SolarError::InvalidInput {
                field: "repayment_years".into(),
                reason: format!("repayment term cannot exceed {MAX_REPAYMENT_YEARS} years"),
            });
        }
        if self.interest_rate_pct < Decimal::ZERO {
            return Err(SolarError::InvalidInput {
                field: "interest_rate_pct".into(),
                reason: "interest rate cannot be negative".into(),
            });
        }
        if self.down_payment < Decimal::ZERO {
            return Err(SolarError::InvalidInput {
                field: "down_payment".into(),
                reason: "down payment cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// Amortize whatever the down payment leaves of `system_cost`.
pub fn resolve_financing(
    system_cost: Money,
    terms: &FinancingTerms,
) -> SolarResult<FinancingSchedule> {
    terms.validate()?;

    let principal = (system_cost - terms.down_payment).max(Decimal::ZERO);
    let monthly_rate = pct_to_rate(terms.interest_rate_pct) / Decimal::from(MONTHS_PER_YEAR);
    let term_months = terms.repayment_years * MONTHS_PER_YEAR;
    let monthly_payment = annuity_payment(principal, monthly_rate, term_months)?;

    let annual_payment = monthly_payment
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or_else(|| SolarError::overflow("annual loan payment"))?;
    let total_paid = monthly_payment
        .checked_mul(Decimal::from(term_months))
        .ok_or_else(|| SolarError::overflow("total loan repayment"))?;

    let months_past_horizon = term_months.saturating_sub(PROJECTION_YEARS * MONTHS_PER_YEAR);
    let balance_after_horizon =
        annuity_present_value(monthly_payment, monthly_rate, months_past_horizon)?;

    Ok(FinancingSchedule {
        principal,
        monthly_rate,
        term_months,
        repayment_years: terms.repayment_years,
        monthly_payment,
        annual_payment,
        total_paid,
        total_interest: total_paid - principal,
        balance_after_horizon,
    })
}
