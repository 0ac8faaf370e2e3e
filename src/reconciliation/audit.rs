//! Consistency checks over recorded foreign-currency payments

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::cashbook::Period;
use crate::reconciliation::CurrencyConverter;
use crate::types::*;

/// Something wrong with one recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditIssue {
    /// No rate is stored for the payment date
    MissingRate { transaction_id: String, date: NaiveDate },
    /// The stored base amount differs from amount / rate
    BaseAmountMismatch {
        transaction_id: String,
        recorded: Option<BigDecimal>,
        expected: BigDecimal,
    },
    /// The amount could not be converted at all
    ConversionFailed {
        transaction_id: String,
        reason: String,
    },
    /// The payment points at a student that does not exist
    UnknownStudent {
        transaction_id: String,
        student_id: String,
    },
}

/// Outcome of auditing a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionAudit {
    pub period: Period,
    pub payments_checked: usize,
    pub issues: Vec<AuditIssue>,
}

impl ConversionAudit {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every fee payment in `payments` against the stored rates and students
pub fn audit_payments(
    period: Period,
    payments: &[Transaction],
    rates: &HashMap<NaiveDate, ExchangeRate>,
    known_students: &HashSet<String>,
    converter: &CurrencyConverter,
) -> ConversionAudit {
    let mut issues = Vec::new();
    let mut payments_checked = 0;

    for payment in payments.iter().filter(|t| t.is_fee_payment()) {
        payments_checked += 1;

        if let Some(student_id) = &payment.student_id {
            if !known_students.contains(student_id) {
                issues.push(AuditIssue::UnknownStudent {
                    transaction_id: payment.id.clone(),
                    student_id: student_id.clone(),
                });
            }
        }

        let amount = payment.amount_or_zero();
        match converter.convert(&amount, payment.currency, payment.date, rates.get(&payment.date)) {
            Ok(conversion) => {
                if payment.base_amount.as_ref() != Some(&conversion.base_amount) {
                    issues.push(AuditIssue::BaseAmountMismatch {
                        transaction_id: payment.id.clone(),
                        recorded: payment.base_amount.clone(),
                        expected: conversion.base_amount,
                    });
                }
            }
            Err(LedgerError::MissingRate { date }) => issues.push(AuditIssue::MissingRate {
                transaction_id: payment.id.clone(),
                date,
            }),
            Err(e) => issues.push(AuditIssue::ConversionFailed {
                transaction_id: payment.id.clone(),
                reason: e.to_string(),
            }),
        }
    }

    ConversionAudit {
        period,
        payments_checked,
        issues,
    }
}
