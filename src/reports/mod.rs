//! Bursary reports built from recorded transactions

pub mod billing;
pub mod collections;

pub use billing::*;
pub use collections::*;
