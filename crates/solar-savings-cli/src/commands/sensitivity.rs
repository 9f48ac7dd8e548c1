use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use solar_savings_core::projection::sensitivity::{
    self, SensitivityInput, SweepParameter, SweepVariable,
};
use solar_savings_core::projection::ProjectionInput;

use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a complete sensitivity input file (base + variables)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON or YAML file with the base projection inputs
    #[arg(long)]
    pub base_inputs: Option<String>,

    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "current_kwh_cost:0.10:0.30:0.05")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second sensitivity variable (optional, creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,
}

fn parse_sens_var(spec: &str) -> Result<SweepVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }

    let parameter: SweepParameter = serde_json::from_value(Value::String(parts[0].to_string()))
        .map_err(|_| format!("Unknown sensitivity variable '{}'", parts[0]))?;
    let parse = |label: &str, raw: &str| -> Result<Decimal, Box<dyn std::error::Error>> {
        raw.parse::<Decimal>()
            .map_err(|e| format!("Invalid {label} '{raw}' in '{spec}': {e}").into())
    };

    Ok(SweepVariable {
        parameter,
        min: parse("min", parts[1])?,
        max: parse("max", parts[2])?,
        step: parse("step", parts[3])?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: SensitivityInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else {
        let base_path = args
            .base_inputs
            .as_deref()
            .ok_or("--input or --base-inputs is required for sensitivity analysis")?;
        let base: ProjectionInput = input::file::read_input(base_path)?;
        let var1 = args
            .var1
            .as_deref()
            .ok_or("--var1 is required with --base-inputs")?;
        SensitivityInput {
            base,
            variable_1: parse_sens_var(var1)?,
            variable_2: args.var2.as_deref().map(parse_sens_var).transpose()?,
        }
    };

    info!(
        variable_1 = sens_input.variable_1.parameter.name(),
        variable_2 = sens_input.variable_2.as_ref().map(|v| v.parameter.name()),
        "running sensitivity grid"
    );
    let result = sensitivity::run_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_sens_var() {
        let v = parse_sens_var("current_kwh_cost:0.10:0.30:0.05").unwrap();
        assert_eq!(v.parameter, SweepParameter::CurrentKwhCost);
        assert_eq!(v.min, dec!(0.10));
        assert_eq!(v.max, dec!(0.30));
        assert_eq!(v.step, dec!(0.05));
    }

    #[test]
    fn test_parse_sens_var_rejects_unknown_name() {
        let err = parse_sens_var("roof_angle:0:45:5").unwrap_err();
        assert!(err.to_string().contains("roof_angle"));
    }

    #[test]
    fn test_parse_sens_var_rejects_wrong_arity() {
        assert!(parse_sens_var("system_kw:1:10").is_err());
        assert!(parse_sens_var("system_kw:a:10:1").is_err());
    }
}
