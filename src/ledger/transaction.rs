//! Transaction recording and construction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::cashbook::Period;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_category, validate_transaction_description};

/// Transaction manager for recording and listing cashbook transactions
pub struct TransactionManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn TransactionValidator>,
}

impl<S: LedgerStorage> TransactionManager<S> {
    /// Create a new transaction manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Create a new transaction manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn TransactionValidator>) -> Self {
        Self { storage, validator }
    }

    /// Run the configured validator over a transaction
    pub fn validate(&self, transaction: &Transaction) -> LedgerResult<()> {
        self.validator.validate_transaction(transaction)
    }

    /// Record a cashbook transaction that does not touch any balance
    pub async fn record_transaction(&mut self, mut transaction: Transaction) -> LedgerResult<Transaction> {
        self.validator.validate_transaction(&transaction)?;

        if transaction.fee_type.is_some() {
            return Err(LedgerError::Validation(
                "Fee payments must be recorded through the payment workflow".to_string(),
            ));
        }

        // cashbook columns are built from categories
        match &transaction.category {
            Some(category) => validate_category(category)?,
            None => {
                return Err(LedgerError::Validation(
                    "Cashbook transactions need a category".to_string(),
                ))
            }
        }
        if let Some(description) = &transaction.description {
            validate_transaction_description(description)?;
        }

        transaction.created_at = chrono::Utc::now().naive_utc();
        let recorded = self.storage.insert_transaction(&transaction).await?;

        tracing::info!(
            transaction_id = %recorded.id,
            direction = ?recorded.direction,
            currency = %recorded.currency,
            "Recorded transaction"
        );
        Ok(recorded)
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.storage.get_transaction(transaction_id).await
    }

    /// Get a transaction by ID, returning an error if not found
    pub async fn get_transaction_required(
        &self,
        transaction_id: &str,
    ) -> LedgerResult<Transaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    /// List transactions by direction, currency and period
    pub async fn list_transactions(
        &self,
        direction: Option<Direction>,
        currency: Option<Currency>,
        period: Option<Period>,
        filters: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        tracing::debug!(?direction, ?currency, ?period, "Listing transactions");
        self.storage
            .list_transactions(direction, currency, period, filters)
            .await
    }
}

/// Transaction builder for cashbook entries
#[derive(Debug)]
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    /// Create a new transaction builder with a generated ID
    pub fn new(
        date: NaiveDate,
        amount: BigDecimal,
        direction: Direction,
        currency: Currency,
    ) -> Self {
        Self {
            transaction: Transaction::new(
                uuid::Uuid::new_v4().to_string(),
                date,
                amount,
                direction,
                currency,
                None,
            ),
        }
    }

    /// Use a caller-supplied ID
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.transaction.id = id.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.transaction.category = Some(category.into());
        self
    }

    /// Bank account the money moved through
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.transaction.account_id = Some(account_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.transaction.description = Some(description.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction.reference = Some(reference.into());
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.transaction.method = Some(method);
        self
    }

    /// Add metadata to the transaction
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.transaction.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the transaction
    pub fn build(self) -> LedgerResult<Transaction> {
        self.transaction.validate()?;
        Ok(self.transaction)
    }
}

/// Common cashbook entries
pub mod patterns {
    use super::*;

    /// Money received into a bank account (bank statement "in")
    pub fn bank_deposit(
        date: NaiveDate,
        amount: BigDecimal,
        currency: Currency,
        account_id: &str,
        category: &str,
        from: &str,
    ) -> LedgerResult<Transaction> {
        TransactionBuilder::new(date, amount, Direction::Incoming, currency)
            .account(account_id)
            .category(category)
            .description(format!("Received from {from}"))
            .build()
    }

    /// Money paid out of a bank account to a vendor
    pub fn bank_payment(
        date: NaiveDate,
        amount: BigDecimal,
        currency: Currency,
        account_id: &str,
        category: &str,
        to: &str,
    ) -> LedgerResult<Transaction> {
        TransactionBuilder::new(date, amount, Direction::Outgoing, currency)
            .account(account_id)
            .category(category)
            .description(format!("Paid to {to}"))
            .build()
    }

    /// Petty cash spend, always in the base currency and paid in cash
    pub fn petty_cash(
        date: NaiveDate,
        amount: BigDecimal,
        category: &str,
        description: &str,
    ) -> LedgerResult<Transaction> {
        TransactionBuilder::new(date, amount, Direction::Outgoing, Currency::Usd)
            .category(category)
            .description(description)
            .method(PaymentMethod::Cash)
            .build()
    }

    /// Commission received or paid out
    pub fn commission(
        date: NaiveDate,
        amount: BigDecimal,
        direction: Direction,
        currency: Currency,
        reference: &str,
    ) -> LedgerResult<Transaction> {
        TransactionBuilder::new(date, amount, direction, currency)
            .category("commission")
            .reference(reference)
            .build()
    }
}
