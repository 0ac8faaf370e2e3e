//! Debit/credit cashbook views
//!
//! A cashbook shows the incoming (debit) and outgoing (credit) transactions of
//! one currency over a period side by side, each side with its own category
//! columns and totals.

pub mod aggregate;
pub mod pairing;
pub mod period;

pub use aggregate::*;
pub use pairing::*;
pub use period::*;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::*;

/// What a cashbook view covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbookQuery {
    pub period: Period,
    /// Restrict to one currency; `None` mixes currencies
    pub currency: Option<Currency>,
    /// Restrict to one bank account
    pub account_id: Option<String>,
}

impl CashbookQuery {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            currency: None,
            account_id: None,
        }
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// One side of a cashbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbookSide {
    pub transactions: Vec<Transaction>,
    /// Category columns derived from this side only
    pub categories: BTreeSet<String>,
    pub totals: CategoryTotals,
}

impl CashbookSide {
    /// Build a side from its transactions, deriving its own category columns
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let categories = distinct_categories(&transactions);
        let totals = category_totals(&transactions, &categories);
        Self {
            transactions,
            categories,
            totals,
        }
    }
}

/// Incoming and outgoing sides for a period, accounted independently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cashbook {
    pub query: CashbookQuery,
    pub incoming: CashbookSide,
    pub outgoing: CashbookSide,
}

impl Cashbook {
    pub fn new(
        query: CashbookQuery,
        incoming: Vec<Transaction>,
        outgoing: Vec<Transaction>,
    ) -> Self {
        Self {
            query,
            incoming: CashbookSide::from_transactions(incoming),
            outgoing: CashbookSide::from_transactions(outgoing),
        }
    }

    /// Table rows with the i-th entry of each side next to each other
    pub fn rows(&self) -> Vec<RowPair<'_, Transaction>> {
        pair_rows(&self.incoming.transactions, &self.outgoing.transactions)
    }

    /// Incoming total minus outgoing total
    pub fn net(&self) -> BigDecimal {
        &self.incoming.totals.total - &self.outgoing.totals.total
    }
}
