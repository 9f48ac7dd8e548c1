use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{KilowattHours, Money, Rate};

/// Installed cost per kilowatt of DC capacity.
pub const COST_PER_KW: Money = dec!(3000);

/// Annual yield of one installed kilowatt at a region factor of 1.0 and an
/// average site.
pub const BASE_KWH_PER_KW: KilowattHours = dec!(1800);

/// Number of years in every projection.
pub const PROJECTION_YEARS: u32 = 25;

/// Fractional output lost each year (0.5%).
pub const PANEL_DEGRADATION_RATE: Rate = dec!(0.005);

/// Productivity factor used when a region code is not in the table.
pub const DEFAULT_REGION_FACTOR: Decimal = dec!(0.30);

/// Days used to turn annual yield into a daily average.
pub const DAYS_PER_YEAR: Decimal = dec!(365);
