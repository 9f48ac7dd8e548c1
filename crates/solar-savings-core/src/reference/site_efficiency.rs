use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::SolarError;
use crate::SolarResult;

/// One step on the shading/orientation scale of a roof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteEfficiencyLevel {
    pub index: usize,
    pub label: &'static str,
    pub factor: Decimal,
}

/// Ordered from worst to best site; index 2 is an unremarkable roof.
pub static SITE_EFFICIENCY_LEVELS: [SiteEfficiencyLevel; 5] = [
    SiteEfficiencyLevel {
        index: 0,
        label: "Poor",
        factor: dec!(0.8),
    },
    SiteEfficiencyLevel {
        index: 1,
        label: "Fair",
        factor: dec!(0.9),
    },
    SiteEfficiencyLevel {
        index: 2,
        label: "Average",
        factor: dec!(1.0),
    },
    SiteEfficiencyLevel {
        index: 3,
        label: "Good",
        factor: dec!(1.1),
    },
    SiteEfficiencyLevel {
        index: 4,
        label: "Excellent",
        factor: dec!(1.2),
    },
];

pub const DEFAULT_SITE_EFFICIENCY_INDEX: usize = 2;

/// Look up a site efficiency level by ordinal.
pub fn site_efficiency(index: usize) -> SolarResult<&'static SiteEfficiencyLevel> {
    SITE_EFFICIENCY_LEVELS
        .get(index)
        .ok_or_else(|| SolarError::InvalidInput {
            field: "site_efficiency_index".into(),
            reason: format!(
                "must be between 0 and {}, got {index}",
                SITE_EFFICIENCY_LEVELS.len() - 1
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        for pair in SITE_EFFICIENCY_LEVELS.windows(2) {
            assert!(pair[0].factor < pair[1].factor);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
    }

    #[test]
    fn test_default_is_average() {
        let level = site_efficiency(DEFAULT_SITE_EFFICIENCY_INDEX).unwrap();
        assert_eq!(level.label, "Average");
        assert_eq!(level.factor, Decimal::ONE);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let err = site_efficiency(5).unwrap_err();
        match err {
            SolarError::InvalidInput { field, .. } => assert_eq!(field, "site_efficiency_index"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
