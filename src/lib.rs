//! # School Ledger
//!
//! Fee and cashbook bookkeeping for a school that is paid in two currencies.
//! Owed balances are kept in the base currency (USD); payments in the foreign
//! currency (ZWG) are converted with the bursar's rate for the payment date.
//!
//! ## Features
//!
//! - **Fee payments**: conversion with daily rates and balance updates written together
//! - **Cashbook**: incoming and outgoing sides with per-category totals and paired rows
//! - **Term billing**: levy and tuition charged to every student
//! - **Reports**: fee collections per currency and a conversion audit
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//! use school_ledger::{Currency, FeeType, Ledger, MemoryStorage, PaymentRequest};
//!
//! # async fn run() -> school_ledger::LedgerResult<()> {
//! let mut ledger = Ledger::new(MemoryStorage::new());
//! let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//!
//! ledger.register_student("S1", "Tendai", None, BigDecimal::from(100), BigDecimal::from(0)).await?;
//! ledger.set_exchange_rate(day, BigDecimal::from(3500)).await?;
//!
//! let receipt = ledger
//!     .record_payment(PaymentRequest::new("S1", FeeType::Levy, Currency::Zwg, BigDecimal::from(35000), day))
//!     .await?;
//! assert_eq!(receipt.balance.after, BigDecimal::from(90));
//! # Ok(())
//! # }
//! ```

pub mod cashbook;
pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use cashbook::*;
pub use config::*;
pub use ledger::*;
pub use reconciliation::*;
pub use reports::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryStorage;

// Re-export transaction patterns for convenience
pub use ledger::transaction::patterns;
