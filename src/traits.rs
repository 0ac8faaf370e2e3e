//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cashbook::Period;
use crate::types::*;

/// Extra filters for transaction listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub account_id: Option<String>,
    pub student_id: Option<String>,
    pub category: Option<String>,
    pub fee_type: Option<FeeType>,
}

impl TransactionFilter {
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn student(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = Some(student_id.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn fee_type(mut self, fee_type: FeeType) -> Self {
        self.fee_type = Some(fee_type);
        self
    }

    /// Whether a transaction passes every filter that is set
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.account_id
            .as_ref()
            .is_none_or(|a| transaction.account_id.as_ref() == Some(a))
            && self
                .student_id
                .as_ref()
                .is_none_or(|s| transaction.student_id.as_ref() == Some(s))
            && self
                .category
                .as_ref()
                .is_none_or(|c| transaction.category.as_ref() == Some(c))
            && self
                .fee_type
                .is_none_or(|f| transaction.fee_type == Some(f))
    }
}

/// Storage abstraction for the ledger.
///
/// The ledger only reads transactions and rates and hands derived balances
/// back here. Implementations may sit on any database or remote API.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Record a transaction
    async fn insert_transaction(&mut self, transaction: &Transaction) -> LedgerResult<Transaction>;

    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>>;

    /// Undo an insert whose accompanying write failed. Not for corrections.
    async fn remove_transaction(&mut self, transaction_id: &str) -> LedgerResult<()>;

    /// List transactions, oldest first, in recording order within a day
    async fn list_transactions(
        &self,
        direction: Option<Direction>,
        currency: Option<Currency>,
        period: Option<Period>,
        filters: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Get the rate stored for exactly this date
    async fn get_exchange_rate(&self, date: NaiveDate) -> LedgerResult<Option<ExchangeRate>>;

    /// Store a rate, replacing any rate already set for its date
    async fn save_exchange_rate(&mut self, rate: &ExchangeRate) -> LedgerResult<()>;

    /// List stored rates within a period
    async fn list_exchange_rates(&self, period: Period) -> LedgerResult<Vec<ExchangeRate>>;

    /// Save a new student
    async fn save_student(&mut self, student: &Student) -> LedgerResult<()>;

    /// Get a student by ID
    async fn get_student(&self, student_id: &str) -> LedgerResult<Option<Student>>;

    /// List all students
    async fn list_students(&self) -> LedgerResult<Vec<Student>>;

    /// Update a student's details
    async fn update_student(&mut self, student: &Student) -> LedgerResult<()>;

    /// Save a new term
    async fn save_term(&mut self, term: &Term) -> LedgerResult<()>;

    /// Get a term by ID
    async fn get_term(&self, term_id: &str) -> LedgerResult<Option<Term>>;

    /// List terms, earliest first
    async fn list_terms(&self) -> LedgerResult<Vec<Term>>;

    /// Update a stored term
    async fn update_term(&mut self, term: &Term) -> LedgerResult<()>;

    /// Current owed balance for a fee type
    async fn get_entity_balance(&self, student_id: &str, fee_type: FeeType) -> LedgerResult<BigDecimal> {
        let student = self
            .get_student(student_id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound(student_id.to_string()))?;
        Ok(student.balance(fee_type).clone())
    }

    /// Overwrite an owed balance
    async fn set_entity_balance(
        &mut self,
        student_id: &str,
        fee_type: FeeType,
        value: &BigDecimal,
    ) -> LedgerResult<()> {
        let mut student = self
            .get_student(student_id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound(student_id.to_string()))?;
        student.set_balance(fee_type, value.clone());
        self.update_student(&student).await
    }

    /// Add `delta` to an owed balance.
    ///
    /// The default reads then writes; stores that can update in place should
    /// override this so concurrent adjustments cannot overwrite each other.
    async fn adjust_entity_balance(
        &mut self,
        student_id: &str,
        fee_type: FeeType,
        delta: &BigDecimal,
    ) -> LedgerResult<BalanceChange> {
        let before = self.get_entity_balance(student_id, fee_type).await?;
        let after = &before + delta;
        self.set_entity_balance(student_id, fee_type, &after).await?;
        Ok(BalanceChange { before, after })
    }

    /// Record a payment and take `base_amount` off the student's balance as
    /// one unit of work.
    ///
    /// The default inserts, adjusts, and removes the insert again if the
    /// adjustment fails. `PartialWrite` means that removal failed too and the
    /// payment is stored without its balance change.
    async fn apply_payment(
        &mut self,
        transaction: &Transaction,
        student_id: &str,
        fee_type: FeeType,
        base_amount: &BigDecimal,
    ) -> LedgerResult<BalanceChange> {
        let recorded = self.insert_transaction(transaction).await?;
        let delta = -base_amount.clone();

        match self.adjust_entity_balance(student_id, fee_type, &delta).await {
            Ok(change) => Ok(change),
            Err(adjust_err) => match self.remove_transaction(&recorded.id).await {
                Ok(()) => Err(adjust_err),
                Err(rollback_err) => Err(LedgerError::PartialWrite(format!(
                    "payment {} recorded but {} balance of {} not updated ({}); rollback failed: {}",
                    recorded.id, fee_type, student_id, adjust_err, rollback_err
                ))),
            },
        }
    }
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a transaction before it is recorded
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()>;
}

/// Trait for implementing custom student validation rules
pub trait StudentValidator: Send + Sync {
    /// Validate a student before saving
    fn validate_student(&self, student: &Student) -> LedgerResult<()>;
}

/// Default transaction validator: positive amount, fee payments tied to a student
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        transaction.validate()
    }
}

/// Default student validator with basic rules
pub struct DefaultStudentValidator;

impl StudentValidator for DefaultStudentValidator {
    fn validate_student(&self, student: &Student) -> LedgerResult<()> {
        if student.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Student ID cannot be empty".to_string(),
            ));
        }

        if student.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Student name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn() -> Transaction {
        let mut t = Transaction::new(
            "t1".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            BigDecimal::from(10),
            Direction::Incoming,
            Currency::Usd,
            Some("levy".to_string()),
        );
        t.account_id = Some("cbz".to_string());
        t.student_id = Some("S1".to_string());
        t.fee_type = Some(FeeType::Levy);
        t
    }

    #[test]
    fn test_filter_matches_only_set_fields() {
        let t = txn();
        assert!(TransactionFilter::default().matches(&t));
        assert!(TransactionFilter::default().account("cbz").matches(&t));
        assert!(!TransactionFilter::default().account("zb").matches(&t));
        assert!(TransactionFilter::default()
            .student("S1")
            .fee_type(FeeType::Levy)
            .category("levy")
            .matches(&t));
        assert!(!TransactionFilter::default().fee_type(FeeType::Tuition).matches(&t));
    }

    #[test]
    fn test_default_student_validator() {
        let validator = DefaultStudentValidator;
        let zero = BigDecimal::from(0);
        let ok = Student::new("S1".into(), "Chipo".into(), None, zero.clone(), zero.clone());
        assert!(validator.validate_student(&ok).is_ok());

        let blank = Student::new("S2".into(), "  ".into(), None, zero.clone(), zero);
        assert!(validator.validate_student(&blank).is_err());
    }
}
