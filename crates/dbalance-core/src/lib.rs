//! Dividend portfolio balancing.
//!
//! Builds positions from a brokerage "Fundamental" export, aggregates market
//! value and value-weighted dividend yield, and solves per position for the
//! holding size that would move the whole portfolio to a target yield.

pub mod aggregate;
pub mod builder;
pub mod error;
pub mod fields;
pub mod position;
pub mod report;
pub mod target;
pub mod types;

pub use error::BalanceError;

pub type BalanceResult<T> = Result<T, BalanceError>;
