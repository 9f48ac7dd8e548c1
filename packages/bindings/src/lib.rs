use napi::Result as NapiResult;
use napi_derive::napi;
use serde_json::json;

use solar_savings_core::projection::sensitivity::{run_sensitivity, SensitivityInput};
use solar_savings_core::projection::{project, ProjectionInput};
use solar_savings_core::reference::trends::{summarize_trend, TrendSeries};
use solar_savings_core::reference::{region_summaries, SITE_EFFICIENCY_LEVELS};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_savings(input_json: String) -> NapiResult<String> {
    let input: ProjectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_analysis(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[napi]
pub fn list_regions() -> NapiResult<String> {
    serde_json::to_string(&region_summaries()).map_err(to_napi_error)
}

#[napi]
pub fn site_efficiency_levels() -> NapiResult<String> {
    serde_json::to_string(&SITE_EFFICIENCY_LEVELS).map_err(to_napi_error)
}

/// `series` is `"electricity_price"` or `"solar_installed_cost"`; omit it for both.
#[napi]
pub fn historical_trends(series: Option<String>) -> NapiResult<String> {
    let selected: Vec<TrendSeries> = match series {
        Some(name) => vec![serde_json::from_value(json!(name)).map_err(to_napi_error)?],
        None => TrendSeries::ALL.to_vec(),
    };
    let mut summaries = Vec::with_capacity(selected.len());
    for s in selected {
        summaries.push(summarize_trend(s).map_err(to_napi_error)?);
    }
    serde_json::to_string(&summaries).map_err(to_napi_error)
}
