pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;
pub mod validation;

#[cfg(feature = "retirement")]
pub mod retirement;

#[cfg(feature = "annuity")]
pub mod annuity;

#[cfg(feature = "lease")]
pub mod lease;

#[cfg(feature = "education")]
pub mod education;

#[cfg(feature = "credit_card")]
pub mod credit_card;

#[cfg(feature = "currency")]
pub mod currency;

#[cfg(feature = "discount")]
pub mod discount;

#[cfg(feature = "payment")]
pub mod payment;

#[cfg(feature = "housing")]
pub mod housing;

pub use error::FinCalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
