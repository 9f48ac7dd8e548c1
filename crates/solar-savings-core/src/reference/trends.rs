use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SolarError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::SolarResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which historical series to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSeries {
    /// U.S. average residential electricity price, $/kWh.
    ElectricityPrice,
    /// Installed residential solar cost, $/kW.
    SolarInstalledCost,
}

impl TrendSeries {
    pub const ALL: [TrendSeries; 2] = [TrendSeries::ElectricityPrice, TrendSeries::SolarInstalledCost];

    pub fn unit(&self) -> &'static str {
        match self {
            TrendSeries::ElectricityPrice => "USD/kWh",
            TrendSeries::SolarInstalledCost => "USD/kW",
        }
    }

    pub fn points(&self) -> &'static [TrendPoint] {
        match self {
            TrendSeries::ElectricityPrice => &ELECTRICITY_PRICE_HISTORY,
            TrendSeries::SolarInstalledCost => &SOLAR_COST_HISTORY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub value: Decimal,
}

/// A series together with its headline statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub series: TrendSeries,
    pub unit: String,
    pub first_year: i32,
    pub last_year: i32,
    pub first_value: Decimal,
    pub last_value: Decimal,
    pub absolute_change: Decimal,
    pub percent_change: Decimal,
    /// Compound annual growth rate between the first and last points.
    pub cagr: Rate,
    pub points: Vec<TrendPoint>,
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

const fn point(year: i32, value: Decimal) -> TrendPoint {
    TrendPoint { year, value }
}

pub static ELECTRICITY_PRICE_HISTORY: [TrendPoint; 25] = [
    point(2000, dec!(0.0824)),
    point(2001, dec!(0.0858)),
    point(2002, dec!(0.0844)),
    point(2003, dec!(0.0872)),
    point(2004, dec!(0.0895)),
    point(2005, dec!(0.0945)),
    point(2006, dec!(0.104)),
    point(2007, dec!(0.1065)),
    point(2008, dec!(0.1126)),
    point(2009, dec!(0.1151)),
    point(2010, dec!(0.1154)),
    point(2011, dec!(0.1172)),
    point(2012, dec!(0.1188)),
    point(2013, dec!(0.1213)),
    point(2014, dec!(0.1252)),
    point(2015, dec!(0.1265)),
    point(2016, dec!(0.1255)),
    point(2017, dec!(0.1289)),
    point(2018, dec!(0.1287)),
    point(2019, dec!(0.1301)),
    point(2020, dec!(0.1315)),
    point(2021, dec!(0.1366)),
    point(2022, dec!(0.1504)),
    point(2023, dec!(0.16)),
    point(2024, dec!(0.1648)),
];

pub static SOLAR_COST_HISTORY: [TrendPoint; 25] = [
    point(2000, dec!(15300)),
    point(2001, dec!(14800)),
    point(2002, dec!(15100)),
    point(2003, dec!(13400)),
    point(2004, dec!(12400)),
    point(2005, dec!(11700)),
    point(2006, dec!(12000)),
    point(2007, dec!(12200)),
    point(2008, dec!(11700)),
    point(2009, dec!(11100)),
    point(2010, dec!(9500)),
    point(2011, dec!(8400)),
    point(2012, dec!(7100)),
    point(2013, dec!(6100)),
    point(2014, dec!(5600)),
    point(2015, dec!(5400)),
    point(2016, dec!(5200)),
    point(2017, dec!(4900)),
    point(2018, dec!(4700)),
    point(2019, dec!(4600)),
    point(2020, dec!(4600)),
    point(2021, dec!(4600)),
    point(2022, dec!(4500)),
    point(2023, dec!(4300)),
    point(2024, dec!(4000)),
];

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Summarise one of the built-in historical series.
pub fn summarize_trend(series: TrendSeries) -> SolarResult<ComputationOutput<TrendSummary>> {
    let start = Instant::now();
    let points = series.points();

    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) if l.year > f.year => (*f, *l),
        _ => {
            return Err(SolarError::InvalidInput {
                field: "series".into(),
                reason: "trend needs at least two distinct years".into(),
            })
        }
    };
    if first.value <= Decimal::ZERO {
        return Err(SolarError::DivisionByZero {
            context: format!("{series:?} growth from a non-positive base"),
        });
    }

    let absolute_change = last.value - first.value;
    let percent_change = absolute_change / first.value * dec!(100);
    let span = Decimal::from(last.year - first.year);
    let cagr = (last.value / first.value).powd(Decimal::ONE / span) - Decimal::ONE;

    let summary = TrendSummary {
        series,
        unit: series.unit().to_string(),
        first_year: first.year,
        last_year: last.year,
        first_value: first.value,
        last_value: last.value,
        absolute_change,
        percent_change,
        cagr,
        points: points.to_vec(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Historical trend (endpoint CAGR)",
        &serde_json::json!({
            "series": series,
            "points": points.len(),
        }),
        Vec::new(),
        elapsed,
        summary,
    ))
}
