//! Outcome of billing a term to every student

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A student the term could not be billed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingFailure {
    pub student_id: String,
    pub error: String,
    /// The levy charge stuck but the tuition charge did not
    pub partial: bool,
}

/// Per-student result of a term billing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReport {
    pub term_id: String,
    pub billed: Vec<String>,
    pub failures: Vec<BillingFailure>,
    pub levy_charged: BigDecimal,
    pub tuition_charged: BigDecimal,
}

impl BillingReport {
    pub fn new(term_id: String) -> Self {
        Self {
            term_id,
            billed: Vec::new(),
            failures: Vec::new(),
            levy_charged: BigDecimal::from(0),
            tuition_charged: BigDecimal::from(0),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
