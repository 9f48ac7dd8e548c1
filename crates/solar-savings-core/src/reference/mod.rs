//! Static reference tables: regional productivity, site efficiency tiers,
//! installation constants, and historical price series.

pub mod constants;
pub mod regions;
pub mod site_efficiency;

#[cfg(feature = "trends")]
pub mod trends;

pub use constants::*;
pub use regions::{
    lookup_region, region_summaries, ProductivityTier, Region, RegionLookup, RegionSummary, REGIONS,
};
pub use site_efficiency::{
    site_efficiency, SiteEfficiencyLevel, DEFAULT_SITE_EFFICIENCY_INDEX, SITE_EFFICIENCY_LEVELS,
};
