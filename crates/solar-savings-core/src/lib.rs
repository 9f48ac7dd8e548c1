pub mod error;
pub mod projection;
pub mod reference;
pub mod time_value;
pub mod types;

pub use error::SolarError;
pub use types::*;

/// Standard result type for all solar-savings operations
pub type SolarResult<T> = Result<T, SolarError>;
