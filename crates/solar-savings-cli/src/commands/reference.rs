use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use solar_savings_core::reference::trends::{summarize_trend, TrendSeries};
use solar_savings_core::reference::{
    lookup_region, region_summaries, ProductivityTier, RegionLookup, SITE_EFFICIENCY_LEVELS,
};

/// Arguments for the region listing
#[derive(Args)]
pub struct RegionsArgs {
    /// Look up a single region code instead of listing all
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeriesArg {
    ElectricityPrice,
    SolarCost,
}

impl From<SeriesArg> for TrendSeries {
    fn from(arg: SeriesArg) -> Self {
        match arg {
            SeriesArg::ElectricityPrice => TrendSeries::ElectricityPrice,
            SeriesArg::SolarCost => TrendSeries::SolarInstalledCost,
        }
    }
}

/// Arguments for historical trends
#[derive(Args)]
pub struct TrendsArgs {
    /// Show one series year by year (default: overview of both)
    #[arg(long, value_enum)]
    pub series: Option<SeriesArg>,
}

pub fn run_regions(args: RegionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let Some(code) = args.code else {
        return Ok(json!({ "result": { "regions": region_summaries() } }));
    };

    let lookup = lookup_region(&code);
    let mut warnings: Vec<String> = Vec::new();
    if let RegionLookup::Unknown = lookup {
        warnings.push(format!(
            "Unknown region '{code}': projections will use the default factor"
        ));
    }
    let factor = lookup.factor();
    let tier = ProductivityTier::classify(factor);
    Ok(json!({
        "result": {
            "requested": code,
            "known": lookup.is_known(),
            "name": lookup.region().map(|r| r.name),
            "productivity_factor": factor,
            "tier": tier,
            "tier_label": tier.label(),
        },
        "warnings": warnings,
    }))
}

pub fn run_site_levels() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({ "result": { "levels": SITE_EFFICIENCY_LEVELS } }))
}

pub fn run_trends(args: TrendsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(series) = args.series {
        let result = summarize_trend(series.into())?;
        return Ok(serde_json::to_value(result)?);
    }

    let mut overview = Vec::with_capacity(TrendSeries::ALL.len());
    for series in TrendSeries::ALL {
        let s = summarize_trend(series)?.result;
        overview.push(json!({
            "series": s.series,
            "unit": s.unit,
            "first_year": s.first_year,
            "last_year": s.last_year,
            "first_value": s.first_value,
            "last_value": s.last_value,
            "percent_change": s.percent_change.round_dp(2),
            "cagr": s.cagr.round_dp(6),
        }));
    }
    Ok(json!({ "result": { "trends": overview } }))
}
