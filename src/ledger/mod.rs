//! Ledger module containing student management, transaction recording and
//! the orchestrating `Ledger`

pub mod core;
pub mod student;
pub mod transaction;

pub use core::*;
pub use student::*;
pub use transaction::*;
