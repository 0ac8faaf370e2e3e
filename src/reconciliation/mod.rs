//! Reconciliation of fee payments against owed balances
//!
//! Payments made in the foreign currency are converted with the rate stored
//! for the payment date before they reduce a student's balance.

pub mod audit;
pub mod conversion;
pub mod payment;

pub use audit::*;
pub use conversion::*;
pub use payment::*;
