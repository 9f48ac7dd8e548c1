//! The 25-year savings projection and the analyses built on it.

pub mod financing;
pub mod savings;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use financing::{resolve_financing, FinancingSchedule, FinancingTerms, PaymentMode};
pub use savings::{
    project, ProjectionInput, ProjectionOutput, RegionPolicy, RegionResolution, SavingsSummary,
    YearRow,
};
