//! Core types and data structures for the school ledger

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Currencies the bursary accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// US dollar, the currency balances are kept in
    #[serde(rename = "USD", alias = "usd")]
    Usd,
    /// Zimbabwe Gold
    #[serde(rename = "ZWG", alias = "zwg")]
    Zwg,
}

impl Currency {
    /// ISO-style currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Zwg => "ZWG",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "ZWG" => Ok(Currency::Zwg),
            other => Err(LedgerError::Validation(format!(
                "Unsupported currency: {other}"
            ))),
        }
    }
}

/// Direction of money relative to the school's books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money received (debit side of the cashbook)
    Incoming,
    /// Money paid out (credit side of the cashbook)
    Outgoing,
}

/// Fee types tracked with their own owed balance per student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeeType {
    Levy,
    Tuition,
}

impl FeeType {
    /// Category label used when a fee payment lands in the cashbook
    pub fn label(&self) -> &'static str {
        match self {
            FeeType::Levy => "levy",
            FeeType::Tuition => "tuition",
        }
    }
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// When a payment falls relative to the term it settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentTimeline {
    #[default]
    Normal,
    Prepayment,
    Recovery,
}

/// How the money reached the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    /// A transfer that landed in the wrong account and was reallocated
    MisplacedTransfer,
}

/// A single monetary event.
///
/// Transactions are never edited after they are recorded. A correction is a
/// new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Date the money moved
    pub date: NaiveDate,
    /// Amount in the transaction's own currency; rows fetched from older
    /// records may carry no amount
    pub amount: Option<BigDecimal>,
    /// Free-text cashbook category ("fees", "utilities", ...)
    pub category: Option<String>,
    pub direction: Direction,
    pub currency: Currency,
    /// Student the transaction belongs to, for fee payments
    pub student_id: Option<String>,
    /// Bank account the transaction went through
    pub account_id: Option<String>,
    /// Fee the payment settles
    pub fee_type: Option<FeeType>,
    /// Base-currency equivalent captured when the payment was recorded
    pub base_amount: Option<BigDecimal>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub timeline: Option<PaymentTimeline>,
    pub method: Option<PaymentMethod>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// When the transaction was recorded
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        id: String,
        date: NaiveDate,
        amount: BigDecimal,
        direction: Direction,
        currency: Currency,
        category: Option<String>,
    ) -> Self {
        Self {
            id,
            date,
            amount: Some(amount),
            category,
            direction,
            currency,
            student_id: None,
            account_id: None,
            fee_type: None,
            base_amount: None,
            reference: None,
            description: None,
            timeline: None,
            method: None,
            metadata: HashMap::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Amount, with a missing amount counted as zero
    pub fn amount_or_zero(&self) -> BigDecimal {
        self.amount.clone().unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Whether this transaction settles a student fee
    pub fn is_fee_payment(&self) -> bool {
        self.direction == Direction::Incoming
            && self.student_id.is_some()
            && self.fee_type.is_some()
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Transaction ID cannot be empty".to_string(),
            ));
        }

        match &self.amount {
            None => {
                return Err(LedgerError::InvalidAmount(
                    "Transaction amount is required".to_string(),
                ))
            }
            Some(amount) if *amount <= BigDecimal::from(0) => {
                return Err(LedgerError::InvalidAmount(format!(
                    "Transaction amount must be positive, got {amount}"
                )))
            }
            Some(_) => {}
        }

        if self.fee_type.is_some() && self.student_id.is_none() {
            return Err(LedgerError::Validation(
                "Fee payments must reference a student".to_string(),
            ));
        }

        Ok(())
    }
}

/// Daily rate for converting the foreign currency into the base currency.
///
/// `rate` is the number of foreign units per one base unit (ZWG per USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub date: NaiveDate,
    pub rate: BigDecimal,
    pub created_at: NaiveDateTime,
}

impl ExchangeRate {
    /// Create a new rate, rejecting zero and negative values
    pub fn new(date: NaiveDate, rate: BigDecimal) -> LedgerResult<Self> {
        if rate <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(format!(
                "Exchange rate for {date} must be positive, got {rate}"
            )));
        }

        Ok(Self {
            date,
            rate,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}

/// Student with owed balances kept in the base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Class or form the student is in
    pub class: Option<String>,
    pub levy_owing: BigDecimal,
    pub tuition_owing: BigDecimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Student {
    /// Create a new student with opening balances
    pub fn new(
        id: String,
        name: String,
        class: Option<String>,
        levy_owing: BigDecimal,
        tuition_owing: BigDecimal,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            name,
            class,
            levy_owing,
            tuition_owing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Owed balance for a fee type
    pub fn balance(&self, fee_type: FeeType) -> &BigDecimal {
        match fee_type {
            FeeType::Levy => &self.levy_owing,
            FeeType::Tuition => &self.tuition_owing,
        }
    }

    /// Replace the owed balance for a fee type
    pub fn set_balance(&mut self, fee_type: FeeType, value: BigDecimal) {
        match fee_type {
            FeeType::Levy => self.levy_owing = value,
            FeeType::Tuition => self.tuition_owing = value,
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Add `delta` to the owed balance and report the change.
    /// Payments pass a negative delta, charges a positive one.
    pub fn adjust_balance(&mut self, fee_type: FeeType, delta: &BigDecimal) -> BalanceChange {
        let before = self.balance(fee_type).clone();
        let after = &before + delta;
        self.set_balance(fee_type, after.clone());
        BalanceChange { before, after }
    }
}

/// Owed balance before and after a single adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub before: BigDecimal,
    pub after: BigDecimal,
}

impl BalanceChange {
    /// Signed difference applied by the adjustment
    pub fn delta(&self) -> BigDecimal {
        &self.after - &self.before
    }
}

/// A billing term with the fees charged to every student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub levy_billed: BigDecimal,
    pub tuition_billed: BigDecimal,
    /// Set once the term has been charged to the students
    #[serde(default)]
    pub billed_at: Option<NaiveDateTime>,
}

impl Term {
    /// Create a validated, not yet billed term
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        levy_billed: BigDecimal,
        tuition_billed: BigDecimal,
    ) -> LedgerResult<Self> {
        let term = Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
            levy_billed,
            tuition_billed,
            billed_at: None,
        };
        term.validate()?;
        Ok(term)
    }

    /// Check the dates are in order and the fees are not negative
    pub fn validate(&self) -> LedgerResult<()> {
        if self.id.trim().is_empty() {
            return Err(LedgerError::Validation("Term ID cannot be empty".to_string()));
        }

        if self.end < self.start {
            return Err(LedgerError::Validation(format!(
                "Term {} ends on {} before it starts on {}",
                self.id, self.end, self.start
            )));
        }

        let zero = BigDecimal::from(0);
        if self.levy_billed < zero || self.tuition_billed < zero {
            return Err(LedgerError::InvalidAmount(format!(
                "Term {} bills negative fees",
                self.id
            )));
        }

        Ok(())
    }

    /// Whether the two terms share at least one day
    pub fn overlaps(&self, other: &Term) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn is_billed(&self) -> bool {
        self.billed_at.is_some()
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("No exchange rate set for {date}")]
    MissingRate { date: NaiveDate },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Entity not found: {0}")]
    EntityNotFound(String),
    #[error("Partial write: {0}")]
    PartialWrite(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_currency_parsing_ignores_case() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" ZWG ".parse::<Currency>().unwrap(), Currency::Zwg);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_serde_accepts_lowercase_alias() {
        let parsed: Currency = serde_json::from_str("\"zwg\"").unwrap();
        assert_eq!(parsed, Currency::Zwg);
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
    }

    #[test]
    fn test_transaction_validation() {
        let mut txn = Transaction::new(
            "t1".to_string(),
            date(2024, 3, 1),
            BigDecimal::from(10),
            Direction::Incoming,
            Currency::Usd,
            Some("fees".to_string()),
        );
        assert!(txn.validate().is_ok());

        txn.amount = Some(BigDecimal::from(0));
        assert!(matches!(txn.validate(), Err(LedgerError::InvalidAmount(_))));

        txn.amount = None;
        assert!(matches!(txn.validate(), Err(LedgerError::InvalidAmount(_))));

        txn.amount = Some(BigDecimal::from(5));
        txn.fee_type = Some(FeeType::Levy);
        assert!(matches!(txn.validate(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_exchange_rate_must_be_positive() {
        assert!(ExchangeRate::new(date(2024, 3, 1), BigDecimal::from(3500)).is_ok());
        assert!(ExchangeRate::new(date(2024, 3, 1), BigDecimal::from(0)).is_err());
        assert!(ExchangeRate::new(date(2024, 3, 1), BigDecimal::from(-1)).is_err());
    }

    #[test]
    fn test_student_adjust_balance() {
        let mut student = Student::new(
            "S1".to_string(),
            "Rudo".to_string(),
            None,
            BigDecimal::from(100),
            BigDecimal::from(300),
        );

        let change = student.adjust_balance(FeeType::Levy, &BigDecimal::from(-10));
        assert_eq!(change.before, BigDecimal::from(100));
        assert_eq!(change.after, BigDecimal::from(90));
        assert_eq!(change.delta(), BigDecimal::from(-10));
        assert_eq!(student.tuition_owing, BigDecimal::from(300));
    }

    #[test]
    fn test_term_validation() {
        let fees = || (BigDecimal::from(50), BigDecimal::from(300));

        let (levy, tuition) = fees();
        let reversed = Term::new("T1", "First", date(2024, 4, 30), date(2024, 3, 1), levy, tuition);
        assert!(matches!(reversed, Err(LedgerError::Validation(_))));

        let negative = Term::new(
            "T1",
            "First",
            date(2024, 1, 9),
            date(2024, 4, 5),
            BigDecimal::from(-1),
            BigDecimal::from(0),
        );
        assert!(matches!(negative, Err(LedgerError::InvalidAmount(_))));

        let (levy, tuition) = fees();
        let first = Term::new("T1", "First", date(2024, 1, 9), date(2024, 4, 5), levy, tuition).unwrap();
        let (levy, tuition) = fees();
        let second = Term::new("T2", "Second", date(2024, 4, 5), date(2024, 8, 2), levy, tuition).unwrap();
        let (levy, tuition) = fees();
        let third = Term::new("T3", "Third", date(2024, 9, 9), date(2024, 12, 6), levy, tuition).unwrap();

        assert!(first.overlaps(&second));
        assert!(!second.overlaps(&third));
        assert!(!first.is_billed());
    }
}
