use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_REGION_FACTOR;

/// A state (or DC) with its relative solar productivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    /// Multiplier in [0, 1] applied to the base yield per kW.
    pub productivity_factor: Decimal,
}

const fn region(code: &'static str, name: &'static str, productivity_factor: Decimal) -> Region {
    Region {
        code,
        name,
        productivity_factor,
    }
}

/// All supported regions, ordered by code.
pub static REGIONS: [Region; 51] = [
    region("AK", "Alaska", dec!(0.50)),
    region("AL", "Alabama", dec!(0.80)),
    region("AR", "Arkansas", dec!(0.78)),
    region("AZ", "Arizona", dec!(1.00)),
    region("CA", "California", dec!(0.90)),
    region("CO", "Colorado", dec!(0.86)),
    region("CT", "Connecticut", dec!(0.66)),
    region("DC", "Washington DC", dec!(0.78)),
    region("DE", "Delaware", dec!(0.75)),
    region("FL", "Florida", dec!(0.88)),
    region("GA", "Georgia", dec!(0.83)),
    region("HI", "Hawaii", dec!(0.92)),
    region("IA", "Iowa", dec!(0.63)),
    region("ID", "Idaho", dec!(0.65)),
    region("IL", "Illinois", dec!(0.70)),
    region("IN", "Indiana", dec!(0.72)),
    region("KS", "Kansas", dec!(0.85)),
    region("KY", "Kentucky", dec!(0.75)),
    region("LA", "Louisiana", dec!(0.80)),
    region("MA", "Massachusetts", dec!(0.67)),
    region("MD", "Maryland", dec!(0.75)),
    region("ME", "Maine", dec!(0.59)),
    region("MI", "Michigan", dec!(0.64)),
    region("MN", "Minnesota", dec!(0.63)),
    region("MO", "Missouri", dec!(0.80)),
    region("MS", "Mississippi", dec!(0.80)),
    region("MT", "Montana", dec!(0.70)),
    region("NC", "North Carolina", dec!(0.82)),
    region("ND", "North Dakota", dec!(0.68)),
    region("NE", "Nebraska", dec!(0.81)),
    region("NH", "New Hampshire", dec!(0.60)),
    region("NJ", "New Jersey", dec!(0.75)),
    region("NM", "New Mexico", dec!(0.97)),
    region("NV", "Nevada", dec!(0.98)),
    region("NY", "New York", dec!(0.68)),
    region("OH", "Ohio", dec!(0.72)),
    region("OK", "Oklahoma", dec!(0.87)),
    region("OR", "Oregon", dec!(0.65)),
    region("PA", "Pennsylvania", dec!(0.70)),
    region("RI", "Rhode Island", dec!(0.66)),
    region("SC", "South Carolina", dec!(0.83)),
    region("SD", "South Dakota", dec!(0.81)),
    region("TN", "Tennessee", dec!(0.77)),
    region("TX", "Texas", dec!(0.92)),
    region("UT", "Utah", dec!(0.88)),
    region("VA", "Virginia", dec!(0.78)),
    region("VT", "Vermont", dec!(0.60)),
    region("WA", "Washington", dec!(0.58)),
    region("WI", "Wisconsin", dec!(0.64)),
    region("WV", "West Virginia", dec!(0.74)),
    region("WY", "Wyoming", dec!(0.70)),
];

/// Result of resolving a region code against [`REGIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLookup {
    Known(&'static Region),
    /// Code not in the table; callers decide whether to fall back or reject.
    Unknown,
}

impl RegionLookup {
    /// Productivity factor, with [`DEFAULT_REGION_FACTOR`] for unknown codes.
    pub fn factor(&self) -> Decimal {
        match self {
            RegionLookup::Known(r) => r.productivity_factor,
            RegionLookup::Unknown => DEFAULT_REGION_FACTOR,
        }
    }

    pub fn region(&self) -> Option<&'static Region> {
        match self {
            RegionLookup::Known(r) => Some(*r),
            RegionLookup::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RegionLookup::Known(_))
    }
}

/// Resolve a region code. Surrounding whitespace and ASCII case are ignored.
pub fn lookup_region(code: &str) -> RegionLookup {
    let normalized = code.trim().to_ascii_uppercase();
    REGIONS
        .binary_search_by(|r| r.code.cmp(normalized.as_str()))
        .map(|idx| RegionLookup::Known(&REGIONS[idx]))
        .unwrap_or(RegionLookup::Unknown)
}

/// Coarse productivity bucket, used for map shading and region listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityTier {
    Low,
    Fair,
    Moderate,
    High,
    Excellent,
}

impl ProductivityTier {
    pub fn classify(factor: Decimal) -> Self {
        if factor >= dec!(0.90) {
            ProductivityTier::Excellent
        } else if factor >= dec!(0.80) {
            ProductivityTier::High
        } else if factor >= dec!(0.70) {
            ProductivityTier::Moderate
        } else if factor >= dec!(0.60) {
            ProductivityTier::Fair
        } else {
            ProductivityTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductivityTier::Low => "Low",
            ProductivityTier::Fair => "Fair",
            ProductivityTier::Moderate => "Moderate",
            ProductivityTier::High => "High",
            ProductivityTier::Excellent => "Excellent",
        }
    }
}

impl Region {
    pub fn tier(&self) -> ProductivityTier {
        ProductivityTier::classify(self.productivity_factor)
    }
}

/// Flattened view of a region for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub code: &'static str,
    pub name: &'static str,
    pub productivity_factor: Decimal,
    pub tier: ProductivityTier,
    pub tier_label: &'static str,
}

impl From<&Region> for RegionSummary {
    fn from(r: &Region) -> Self {
        RegionSummary {
            code: r.code,
            name: r.name,
            productivity_factor: r.productivity_factor,
            tier: r.tier(),
            tier_label: r.tier().label(),
        }
    }
}

pub fn region_summaries() -> Vec<RegionSummary> {
    REGIONS.iter().map(RegionSummary::from).collect()
}
