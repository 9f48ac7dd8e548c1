use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::SolarError;
use crate::projection::financing::PaymentMode;
use crate::projection::savings::{project, ProjectionInput};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::SolarResult;

/// Upper bound on evaluated grid cells.
const MAX_GRID_CELLS: usize = 10_000;

/// Input fields that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    SystemKw,
    CurrentKwhCost,
    AnnualIncreasePct,
    Incentive,
    SiteEfficiencyIndex,
    DownPayment,
    InterestRatePct,
    RepaymentYears,
}

impl SweepParameter {
    pub fn name(&self) -> &'static str {
        match self {
            SweepParameter::SystemKw => "system_kw",
            SweepParameter::CurrentKwhCost => "current_kwh_cost",
            SweepParameter::AnnualIncreasePct => "annual_increase_pct",
            SweepParameter::Incentive => "incentive",
            SweepParameter::SiteEfficiencyIndex => "site_efficiency_index",
            SweepParameter::DownPayment => "down_payment",
            SweepParameter::InterestRatePct => "interest_rate_pct",
            SweepParameter::RepaymentYears => "repayment_years",
        }
    }

    fn requires_financing(&self) -> bool {
        matches!(
            self,
            SweepParameter::DownPayment
                | SweepParameter::InterestRatePct
                | SweepParameter::RepaymentYears
        )
    }

    /// Write `value` into a copy of the base input.
    fn apply(&self, base: &ProjectionInput, value: Decimal) -> SolarResult<ProjectionInput> {
        let mut input = base.clone();
        match self {
            SweepParameter::SystemKw => input.system_kw = value,
            SweepParameter::CurrentKwhCost => input.current_kwh_cost = value,
            SweepParameter::AnnualIncreasePct => input.annual_increase_pct = value,
            SweepParameter::Incentive => input.incentive = value,
            SweepParameter::SiteEfficiencyIndex => {
                input.site_efficiency_index = whole_number(self, value)? as usize;
            }
            SweepParameter::DownPayment
            | SweepParameter::InterestRatePct
            | SweepParameter::RepaymentYears => {
                let PaymentMode::Financing(terms) = &mut input.payment else {
                    return Err(financing_required(self));
                };
                match self {
                    SweepParameter::DownPayment => terms.down_payment = value,
                    SweepParameter::InterestRatePct => terms.interest_rate_pct = value,
                    _ => terms.repayment_years = whole_number(self, value)?,
                }
            }
        }
        Ok(input)
    }
}

fn whole_number(param: &SweepParameter, value: Decimal) -> SolarResult<u32> {
    if value.fract() != Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field: param.name().into(),
            reason: format!("must be a whole number, got {value}"),
        });
    }
    value.to_u32().ok_or_else(|| SolarError::InvalidInput {
        field: param.name().into(),
        reason: format!("out of range: {value}"),
    })
}

fn financing_required(param: &SweepParameter) -> SolarError {
    SolarError::InvalidInput {
        field: param.name().into(),
        reason: "only applies when the base case is financed".into(),
    }
}

/// One axis of the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepVariable {
    pub parameter: SweepParameter,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base: ProjectionInput,
    pub variable_1: SweepVariable,
    #[serde(default)]
    pub variable_2: Option<SweepVariable>,
}

/// Total savings across the sweep grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: Option<String>,
    pub variable_1_values: Vec<Decimal>,
    /// Empty for a one-way sweep.
    pub variable_2_values: Vec<Decimal>,
    /// matrix[i][j] = total savings at (variable_1_values[i], variable_2_values[j]).
    /// One-way sweeps have a single column.
    pub matrix: Vec<Vec<Option<Money>>>,
    pub base_case_total_savings: Money,
    pub base_case_payback_year: Option<u32>,
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SweepVariable) -> SolarResult<Vec<Decimal>> {
    let field = format!("variable:{}", var.parameter.name());
    if var.step <= Decimal::ZERO {
        return Err(SolarError::InvalidInput {
            field,
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(SolarError::InvalidInput {
            field,
            reason: "Min must be <= max".into(),
        });
    }
    let too_many = || SolarError::InvalidInput {
        field: field.clone(),
        reason: format!("sweep would exceed {MAX_GRID_CELLS} points"),
    };
    let steps = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .ok_or_else(too_many)?
        .floor();
    if steps >= Decimal::from(MAX_GRID_CELLS) {
        return Err(SolarError::InvalidInput {
            field,
            reason: format!("sweep would exceed {MAX_GRID_CELLS} points"),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

fn check_applicable(base: &ProjectionInput, var: &SweepVariable) -> SolarResult<()> {
    if var.parameter.requires_financing() && matches!(base.payment, PaymentMode::Upfront) {
        return Err(financing_required(&var.parameter));
    }
    Ok(())
}

/// Re-run the projection across a one- or two-way grid and tabulate total savings.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> SolarResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_applicable(&input.base, &input.variable_1)?;
    if let Some(v2) = &input.variable_2 {
        check_applicable(&input.base, v2)?;
        if v2.parameter == input.variable_1.parameter {
            return Err(SolarError::InvalidInput {
                field: "variable_2".into(),
                reason: "must sweep a different parameter than variable_1".into(),
            });
        }
    }

    let base_case = project(&input.base)?.result.summary;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match &input.variable_2 {
        Some(v2) => generate_sweep_values(v2)?,
        None => Vec::new(),
    };
    let cells = v1_values.len() * v2_values.len().max(1);
    if cells > MAX_GRID_CELLS {
        return Err(SolarError::InvalidInput {
            field: "variable_2".into(),
            reason: format!("grid of {cells} cells exceeds {MAX_GRID_CELLS}"),
        });
    }

    let evaluate = |v1: Decimal, v2: Option<Decimal>| -> SolarResult<Money> {
        let mut case = input.variable_1.parameter.apply(&input.base, v1)?;
        if let (Some(var), Some(v)) = (&input.variable_2, v2) {
            case = var.parameter.apply(&case, v)?;
        }
        Ok(project(&case)?.result.summary.total_savings)
    };

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let cols: Vec<Option<Decimal>> = if v2_values.is_empty() {
            vec![None]
        } else {
            v2_values.iter().copied().map(Some).collect()
        };
        let mut row = Vec::with_capacity(cols.len());
        for v2 in cols {
            match evaluate(*v1, v2) {
                Ok(val) => row.push(Some(val)),
                Err(e) => {
                    let at = match v2 {
                        Some(v2) => format!("({v1}, {v2})"),
                        None => format!("({v1})"),
                    };
                    warnings.push(format!("Evaluation failed at {at}: {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    debug!(cells, failed = warnings.len(), "sensitivity grid evaluated");

    let output = SensitivityOutput {
        variable_1_name: input.variable_1.parameter.name().to_string(),
        variable_2_name: input
            .variable_2
            .as_ref()
            .map(|v| v.parameter.name().to_string()),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        matrix,
        base_case_total_savings: base_case.total_savings,
        base_case_payback_year: base_case.payback_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar savings sensitivity (total 25-year savings per grid point)",
        &serde_json::json!({
            "variable_1": input.variable_1.parameter.name(),
            "variable_2": input.variable_2.as_ref().map(|v| v.parameter.name()),
            "output_metric": "total_savings",
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn var(parameter: SweepParameter, min: Decimal, max: Decimal, step: Decimal) -> SweepVariable {
        SweepVariable {
            parameter,
            min,
            max,
            step,
        }
    }

    #[test]
    fn test_sweep_appends_max() {
        let values =
            generate_sweep_values(&var(SweepParameter::SystemKw, dec!(1), dec!(2), dec!(0.4)))
                .unwrap();
        assert_eq!(values, vec![dec!(1), dec!(1.4), dec!(1.8), dec!(2)]);
    }

    #[test]
    fn test_sweep_rejects_bad_step() {
        assert!(
            generate_sweep_values(&var(SweepParameter::SystemKw, dec!(1), dec!(2), dec!(0)))
                .is_err()
        );
        assert!(
            generate_sweep_values(&var(SweepParameter::SystemKw, dec!(3), dec!(2), dec!(1)))
                .is_err()
        );
    }

    #[test]
    fn test_sweep_rejects_huge_grid() {
        let v = var(SweepParameter::Incentive, dec!(0), dec!(100000), dec!(1));
        assert!(generate_sweep_values(&v).is_err());
    }

    #[test]
    fn test_sweep_rejects_step_too_small_to_divide() {
        let v = var(
            SweepParameter::Incentive,
            dec!(0),
            dec!(100000000000000000000),
            dec!(0.0000000001),
        );
        assert!(matches!(
            generate_sweep_values(&v),
            Err(SolarError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_sweep_near_decimal_max_terminates() {
        let v = var(SweepParameter::Incentive, Decimal::MAX - dec!(2), Decimal::MAX, dec!(1));
        let values = generate_sweep_values(&v).unwrap();
        assert_eq!(values.last(), Some(&Decimal::MAX));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_whole_number_parameters() {
        assert_eq!(
            whole_number(&SweepParameter::RepaymentYears, dec!(12)).unwrap(),
            12
        );
        assert!(whole_number(&SweepParameter::RepaymentYears, dec!(12.5)).is_err());
        assert!(whole_number(&SweepParameter::SiteEfficiencyIndex, dec!(-1)).is_err());
    }
}
