use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

use solar_savings_core::projection::{
    self, FinancingTerms, PaymentMode, ProjectionInput, RegionPolicy,
};
use solar_savings_core::reference::DEFAULT_SITE_EFFICIENCY_INDEX;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentArg {
    Upfront,
    Financing,
}

/// Arguments for a savings projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Installed system size in kW
    #[arg(long)]
    pub system_kw: Option<Decimal>,

    /// Two-letter state code (e.g. AZ)
    #[arg(long)]
    pub region: Option<String>,

    /// Site efficiency tier, 0 (poor) to 4 (excellent)
    #[arg(long, default_value_t = DEFAULT_SITE_EFFICIENCY_INDEX)]
    pub site_efficiency: usize,

    /// How the system is paid for
    #[arg(long, value_enum, default_value = "upfront")]
    pub payment: PaymentArg,

    /// Down payment (financing only)
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Nominal annual interest rate in percent, e.g. 6.5 (financing only)
    #[arg(long, default_value = "0")]
    pub interest_rate: Decimal,

    /// Loan term in years (financing only)
    #[arg(long)]
    pub repayment_years: Option<u32>,

    /// Current electricity price per kWh
    #[arg(long)]
    pub kwh_cost: Option<Decimal>,

    /// Yearly electricity price increase in percent
    #[arg(long, default_value = "0")]
    pub annual_increase: Decimal,

    /// One-time incentive received in year 1
    #[arg(long, default_value = "0")]
    pub incentive: Decimal,

    /// Annual discount rate in percent; adds the NPV of net savings
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Reject unknown region codes instead of using the default factor
    #[arg(long)]
    pub strict_region: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn input_from_flags(args: ProjectArgs) -> Result<ProjectionInput, Box<dyn std::error::Error>> {
    let payment = match args.payment {
        PaymentArg::Upfront => PaymentMode::Upfront,
        PaymentArg::Financing => PaymentMode::Financing(FinancingTerms {
            down_payment: args.down_payment,
            interest_rate_pct: args.interest_rate,
            repayment_years: args
                .repayment_years
                .ok_or("--repayment-years is required with --payment financing")?,
        }),
    };

    Ok(ProjectionInput {
        system_kw: args
            .system_kw
            .ok_or("--system-kw is required (or provide --input)")?,
        region: args
            .region
            .ok_or("--region is required (or provide --input)")?,
        site_efficiency_index: args.site_efficiency,
        payment,
        current_kwh_cost: args
            .kwh_cost
            .ok_or("--kwh-cost is required (or provide --input)")?,
        annual_increase_pct: args.annual_increase,
        incentive: args.incentive,
        region_policy: if args.strict_region {
            RegionPolicy::Strict
        } else {
            RegionPolicy::Fallback
        },
        discount_rate_pct: args.discount_rate,
    })
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let proj_input: ProjectionInput = if let Some(ref path) = args.input {
        info!(path = %path, "reading projection input file");
        input::file::read_input(path)?
    } else if args.system_kw.is_some() {
        debug!("building projection input from flags");
        input_from_flags(args)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        info!("reading projection input from stdin");
        serde_json::from_value(data)?
    } else {
        input_from_flags(args)?
    };
    let result = projection::project(&proj_input)?;
    debug!(warnings = result.warnings.len(), "projection finished");
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> ProjectArgs {
        ProjectArgs {
            system_kw: Some(dec!(5)),
            region: Some("AZ".into()),
            site_efficiency: 2,
            payment: PaymentArg::Upfront,
            down_payment: Decimal::ZERO,
            interest_rate: Decimal::ZERO,
            repayment_years: None,
            kwh_cost: Some(dec!(0.15)),
            annual_increase: dec!(3),
            incentive: Decimal::ZERO,
            discount_rate: None,
            strict_region: false,
            input: None,
        }
    }

    #[test]
    fn test_flags_build_upfront_input() {
        let input = input_from_flags(args()).unwrap();
        assert_eq!(input.payment, PaymentMode::Upfront);
        assert_eq!(input.region_policy, RegionPolicy::Fallback);
        assert_eq!(input.discount_rate_pct, None);
    }

    #[test]
    fn test_discount_rate_flag_adds_npv() {
        let mut a = args();
        a.discount_rate = Some(dec!(5));
        let value = run_project(a).unwrap();
        assert!(value["result"]["summary"]["npv"].is_string());
    }

    #[test]
    fn test_financing_requires_term() {
        let mut a = args();
        a.payment = PaymentArg::Financing;
        let err = input_from_flags(a).unwrap_err();
        assert!(err.to_string().contains("--repayment-years"));
    }

    #[test]
    fn test_run_project_from_flags() {
        let value = run_project(args()).unwrap();
        assert_eq!(value["result"]["rows"][0]["year"], 1);
        assert_eq!(value["result"]["summary"]["system_cost"], "15000");
    }
}
