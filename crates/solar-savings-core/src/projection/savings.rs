use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::SolarError;
use crate::projection::financing::{resolve_financing, FinancingSchedule, PaymentMode};
use crate::reference::{
    lookup_region, site_efficiency, RegionLookup, BASE_KWH_PER_KW, COST_PER_KW, DAYS_PER_YEAR,
    DEFAULT_SITE_EFFICIENCY_INDEX, PANEL_DEGRADATION_RATE, PROJECTION_YEARS,
};
use crate::time_value::{compound, irr, npv};
use crate::types::{
    pct_to_rate, with_metadata, ComputationOutput, KilowattHours, Kilowatts, Money, Percent, Rate,
};
use crate::SolarResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What to do when the requested region code is not in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolicy {
    /// Use the default productivity factor and record a warning.
    #[default]
    Fallback,
    /// Reject the input.
    Strict,
}

/// Everything needed to project one household's savings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub system_kw: Kilowatts,
    /// Two-letter state code, e.g. "AZ".
    pub region: String,
    #[serde(default = "default_site_efficiency_index")]
    pub site_efficiency_index: usize,
    pub payment: PaymentMode,
    /// Utility price today, per kWh.
    pub current_kwh_cost: Money,
    /// Yearly utility price escalation as a percentage.
    pub annual_increase_pct: Percent,
    /// One-off rebate or tax credit received in year 1.
    #[serde(default)]
    pub incentive: Money,
    #[serde(default)]
    pub region_policy: RegionPolicy,
    /// Annual discount rate as a percentage. When set, the summary carries
    /// the NPV of the yearly net flows.
    #[serde(default)]
    pub discount_rate_pct: Option<Percent>,
}

fn default_site_efficiency_index() -> usize {
    DEFAULT_SITE_EFFICIENCY_INDEX
}

/// One year of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub utility_price: Money,
    pub energy_kwh: KilowattHours,
    pub energy_value: Money,
    pub payment: Money,
    pub incentive: Money,
    /// energy_value - payment + incentive
    pub net: Money,
    pub cumulative: Money,
}

/// How the region code was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionResolution {
    pub requested: String,
    pub name: Option<String>,
    pub productivity_factor: Decimal,
    /// True when the code was unknown and the default factor was used.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub system_cost: Money,
    pub site_efficiency_label: String,
    pub annual_yield_kwh: KilowattHours,
    pub daily_yield_kwh: KilowattHours,
    pub financing: Option<FinancingSchedule>,
    pub total_payments: Money,
    pub total_energy_value: Money,
    pub total_incentive: Money,
    /// Cumulative net cash flow at the end of the horizon.
    pub total_savings: Money,
    /// First year from which the cumulative position stays non-negative.
    pub payback_year: Option<u32>,
    pub irr: Option<Rate>,
    /// NPV of the net flows at `discount_rate_pct`, year 1 undiscounted.
    pub npv: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub region: RegionResolution,
    pub rows: Vec<YearRow>,
    pub summary: SavingsSummary,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &ProjectionInput) -> SolarResult<()> {
    if input.system_kw <= Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field: "system_kw".into(),
            reason: "system size must be > 0".into(),
        });
    }
    if input.current_kwh_cost <= Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field: "current_kwh_cost".into(),
            reason: "electricity price must be > 0".into(),
        });
    }
    if input.annual_increase_pct < Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field: "annual_increase_pct".into(),
            reason: "price escalation cannot be negative".into(),
        });
    }
    if input.incentive < Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field: "incentive".into(),
            reason: "incentive cannot be negative".into(),
        });
    }
    if let Some(rate) = input.discount_rate_pct {
        if rate <= dec!(-100) {
            return Err(SolarError::InvalidInput {
                field: "discount_rate_pct".into(),
                reason: "discount rate must be greater than -100%".into(),
            });
        }
    }
    if let PaymentMode::Financing(terms) = &input.payment {
        terms.validate()?;
    }
    Ok(())
}

fn resolve_region(
    input: &ProjectionInput,
    warnings: &mut Vec<String>,
) -> SolarResult<RegionResolution> {
    let lookup = lookup_region(&input.region);
    match lookup {
        RegionLookup::Known(region) => Ok(RegionResolution {
            requested: input.region.clone(),
            name: Some(region.name.to_string()),
            productivity_factor: region.productivity_factor,
            fallback: false,
        }),
        RegionLookup::Unknown => match input.region_policy {
            RegionPolicy::Strict => Err(SolarError::InvalidInput {
                field: "region".into(),
                reason: format!("unknown region code '{}'", input.region),
            }),
            RegionPolicy::Fallback => {
                let factor = lookup.factor();
                warn!(region = %input.region, factor = %factor, "unknown region, using default factor");
                warnings.push(format!(
                    "Unknown region '{}': using default productivity factor {}",
                    input.region, factor
                ));
                Ok(RegionResolution {
                    requested: input.region.clone(),
                    name: None,
                    productivity_factor: factor,
                    fallback: true,
                })
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project yearly and cumulative net savings over the 25-year horizon.
pub fn project(input: &ProjectionInput) -> SolarResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let site = site_efficiency(input.site_efficiency_index)?;
    let region = resolve_region(input, &mut warnings)?;

    // --- Sizing ---
    let system_cost = input
        .system_kw
        .checked_mul(COST_PER_KW)
        .ok_or_else(|| SolarError::overflow("system cost"))?;
    let annual_yield = input
        .system_kw
        .checked_mul(BASE_KWH_PER_KW)
        .and_then(|x| x.checked_mul(region.productivity_factor))
        .and_then(|x| x.checked_mul(site.factor))
        .ok_or_else(|| SolarError::overflow("annual yield"))?;

    // --- Financing (resolved once, fixed for the loan term) ---
    let financing = match &input.payment {
        PaymentMode::Upfront => None,
        PaymentMode::Financing(terms) => {
            if terms.down_payment > system_cost {
                warnings.push(format!(
                    "Down payment {} exceeds system cost {}; loan principal set to 0",
                    terms.down_payment, system_cost
                ));
            }
            let loan = resolve_financing(system_cost, terms)?;
            if loan.balance_after_horizon > Decimal::ZERO {
                warnings.push(format!(
                    "Loan runs {} years past the {}-year projection; {} still owed after year {}",
                    loan.repayment_years - PROJECTION_YEARS,
                    PROJECTION_YEARS,
                    loan.balance_after_horizon.round_dp(2),
                    PROJECTION_YEARS
                ));
            }
            Some(loan)
        }
    };

    // --- Year-by-year simulation ---
    let escalation = pct_to_rate(input.annual_increase_pct);
    let mut rows: Vec<YearRow> = Vec::with_capacity(PROJECTION_YEARS as usize);
    let mut cumulative = Decimal::ZERO;

    for year in 1..=PROJECTION_YEARS {
        let overflow = |what: &str| SolarError::overflow(format!("{what} in year {year}"));

        let payment = match (&input.payment, &financing) {
            (PaymentMode::Upfront, _) if year == 1 => system_cost,
            (PaymentMode::Financing(terms), Some(loan)) => {
                let mut p = Decimal::ZERO;
                if year == 1 {
                    p = terms.down_payment;
                }
                if year <= loan.repayment_years {
                    p = p
                        .checked_add(loan.annual_payment)
                        .ok_or_else(|| overflow("payment"))?;
                }
                p
            }
            _ => Decimal::ZERO,
        };

        let utility_price = input
            .current_kwh_cost
            .checked_mul(compound(escalation, year - 1)?)
            .ok_or_else(|| overflow("utility price"))?;
        let energy_kwh = annual_yield
            .checked_mul(compound(-PANEL_DEGRADATION_RATE, year - 1)?)
            .ok_or_else(|| overflow("energy yield"))?;
        let energy_value = energy_kwh
            .checked_mul(utility_price)
            .ok_or_else(|| overflow("energy value"))?;
        let incentive = if year == 1 {
            input.incentive
        } else {
            Decimal::ZERO
        };

        let net = energy_value
            .checked_sub(payment)
            .and_then(|x| x.checked_add(incentive))
            .ok_or_else(|| overflow("net savings"))?;
        cumulative = cumulative
            .checked_add(net)
            .ok_or_else(|| overflow("cumulative savings"))?;

        rows.push(YearRow {
            year,
            utility_price,
            energy_kwh,
            energy_value,
            payment,
            incentive,
            net,
            cumulative,
        });
    }

    // --- Summary ---
    let summary = summarize(
        &rows,
        system_cost,
        site.label,
        annual_yield,
        financing,
        input.discount_rate_pct,
        &mut warnings,
    )?;

    debug!(
        system_kw = %input.system_kw,
        region = %region.requested,
        total_savings = %summary.total_savings,
        "projection complete"
    );

    let output = ProjectionOutput {
        region,
        rows,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Residential solar savings (25-year degraded yield, escalating tariff, amortized financing)",
        &serde_json::json!({
            "cost_per_kw": COST_PER_KW.to_string(),
            "base_kwh_per_kw": BASE_KWH_PER_KW.to_string(),
            "panel_degradation_rate": PANEL_DEGRADATION_RATE.to_string(),
            "projection_years": PROJECTION_YEARS,
            "site_efficiency": site.label,
            "site_factor": site.factor.to_string(),
            "annual_increase_pct": input.annual_increase_pct.to_string(),
            "discount_rate_pct": input.discount_rate_pct.map(|d| d.to_string()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn checked_total(mut values: impl Iterator<Item = Money>, what: &str) -> SolarResult<Money> {
    values
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| SolarError::overflow(format!("total {what}")))
}

fn summarize(
    rows: &[YearRow],
    system_cost: Money,
    site_label: &str,
    annual_yield: KilowattHours,
    financing: Option<FinancingSchedule>,
    discount_rate_pct: Option<Percent>,
    warnings: &mut Vec<String>,
) -> SolarResult<SavingsSummary> {
    let total_payments = checked_total(rows.iter().map(|r| r.payment), "payments")?;
    let total_energy_value = checked_total(rows.iter().map(|r| r.energy_value), "energy value")?;
    let total_incentive = checked_total(rows.iter().map(|r| r.incentive), "incentive")?;
    let total_savings = rows.last().map(|r| r.cumulative).unwrap_or(Decimal::ZERO);

    let nets: Vec<Money> = rows.iter().map(|r| r.net).collect();
    let irr = match irr(&nets) {
        Ok(rate) => Some(rate),
        Err(e) => {
            warnings.push(format!("Project IRR unavailable: {e}"));
            None
        }
    };
    let npv = match discount_rate_pct.map(|pct| npv(pct_to_rate(pct), &nets)) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            warnings.push(format!("Project NPV unavailable: {e}"));
            None
        }
    };

    Ok(SavingsSummary {
        system_cost,
        site_efficiency_label: site_label.to_string(),
        annual_yield_kwh: annual_yield,
        daily_yield_kwh: annual_yield / DAYS_PER_YEAR,
        financing,
        total_payments,
        total_energy_value,
        total_incentive,
        total_savings,
        payback_year: payback_year(rows),
        irr,
        npv,
    })
}

/// Earliest year after which the cumulative position never dips below zero.
fn payback_year(rows: &[YearRow]) -> Option<u32> {
    let mut payback = None;
    for row in rows.iter().rev() {
        if row.cumulative < Decimal::ZERO {
            break;
        }
        payback = Some(row.year);
    }
    payback
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
