//! Main ledger orchestrator that coordinates students, rates and transactions

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::cashbook::{Cashbook, CashbookQuery, Period};
use crate::config::LedgerConfig;
use crate::ledger::{StudentManager, TransactionManager};
use crate::reconciliation::*;
use crate::reports::*;
use crate::traits::*;
use crate::types::*;

/// Main ledger system that orchestrates all fee and cashbook operations
pub struct Ledger<S: LedgerStorage> {
    student_manager: StudentManager<S>,
    transaction_manager: TransactionManager<S>,
    converter: CurrencyConverter,
    config: LedgerConfig,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend and default settings
    pub fn new(storage: S) -> Self {
        let config = LedgerConfig::default();
        Self {
            student_manager: StudentManager::new(storage.clone()),
            transaction_manager: TransactionManager::new(storage),
            converter: CurrencyConverter::from_config(&config),
            config,
        }
    }

    /// Create a new ledger with loaded settings
    pub fn with_config(storage: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            student_manager: StudentManager::new(storage.clone()),
            transaction_manager: TransactionManager::new(storage),
            converter: CurrencyConverter::from_config(&config),
            config,
        })
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        student_validator: Box<dyn StudentValidator>,
        transaction_validator: Box<dyn TransactionValidator>,
    ) -> Self {
        let config = LedgerConfig::default();
        Self {
            student_manager: StudentManager::with_validator(storage.clone(), student_validator),
            transaction_manager: TransactionManager::with_validator(storage, transaction_validator),
            converter: CurrencyConverter::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // Student operations
    /// Register a student with opening balances
    pub async fn register_student(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        class: Option<String>,
        levy_owing: BigDecimal,
        tuition_owing: BigDecimal,
    ) -> LedgerResult<Student> {
        self.student_manager
            .register_student(id.into(), name.into(), class, levy_owing, tuition_owing)
            .await
    }

    /// Get a student by ID
    pub async fn get_student(&self, student_id: &str) -> LedgerResult<Option<Student>> {
        self.student_manager.get_student(student_id).await
    }

    /// List all students
    pub async fn list_students(&self) -> LedgerResult<Vec<Student>> {
        self.student_manager.list_students().await
    }

    /// Update a student's name and class
    pub async fn update_student_details(&mut self, student: &Student) -> LedgerResult<Student> {
        self.student_manager.update_details(student).await
    }

    /// Owed balance for a fee type, in the base currency
    pub async fn get_balance(&self, student_id: &str, fee_type: FeeType) -> LedgerResult<BigDecimal> {
        self.student_manager.get_balance(student_id, fee_type).await
    }

    // Exchange rates
    /// Set the rate for a date, replacing any earlier rate for that date
    pub async fn set_exchange_rate(
        &mut self,
        date: NaiveDate,
        rate: BigDecimal,
    ) -> LedgerResult<ExchangeRate> {
        let rate = ExchangeRate::new(date, rate)?;
        let storage = &mut self.transaction_manager.storage;

        if let Some(previous) = storage.get_exchange_rate(date).await? {
            tracing::warn!(%date, old = %previous.rate, new = %rate.rate, "Replacing exchange rate");
        }

        storage.save_exchange_rate(&rate).await?;
        tracing::info!(%date, rate = %rate.rate, "Set exchange rate");
        Ok(rate)
    }

    /// Get the rate stored for a date
    pub async fn get_exchange_rate(&self, date: NaiveDate) -> LedgerResult<Option<ExchangeRate>> {
        self.transaction_manager.storage.get_exchange_rate(date).await
    }

    /// List the rates stored within a period
    pub async fn list_exchange_rates(&self, period: Period) -> LedgerResult<Vec<ExchangeRate>> {
        self.transaction_manager
            .storage
            .list_exchange_rates(period)
            .await
    }

    /// Convert a foreign-currency amount with the rate for `date`
    pub async fn convert(&self, date: NaiveDate, amount: &BigDecimal) -> LedgerResult<BigDecimal> {
        crate::utils::validate_positive_amount(amount)?;
        let rate = self.get_exchange_rate(date).await?;
        let conversion =
            self.converter
                .convert(amount, self.config.foreign_currency, date, rate.as_ref())?;
        Ok(conversion.base_amount)
    }

    // Payments
    /// Record a fee payment and take its base-currency value off the
    /// student's owed balance.
    ///
    /// Nothing is written unless the payment is valid, the student exists and
    /// a rate is stored for a foreign-currency payment's date. Every call
    /// records a new payment.
    pub async fn record_payment(&mut self, request: PaymentRequest) -> LedgerResult<PaymentReceipt> {
        request.validate()?;
        self.student_manager
            .get_student_required(&request.student_id)
            .await?;

        let rate = if self.converter.needs_rate(request.currency) {
            self.get_exchange_rate(request.date).await?
        } else {
            None
        };
        let conversion = self
            .converter
            .convert(&request.amount, request.currency, request.date, rate.as_ref())
            .inspect_err(|e| {
                tracing::warn!(student_id = %request.student_id, date = %request.date, error = %e, "Payment not converted");
            })?;

        let transaction =
            request.to_transaction(uuid::Uuid::new_v4().to_string(), conversion.base_amount.clone());
        self.transaction_manager.validate(&transaction)?;

        let balance = self
            .transaction_manager
            .storage
            .apply_payment(
                &transaction,
                &request.student_id,
                request.fee_type,
                &conversion.base_amount,
            )
            .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            student_id = %request.student_id,
            fee = %request.fee_type,
            currency = %request.currency,
            amount = %request.amount,
            base_amount = %conversion.base_amount,
            balance = %balance.after,
            "Recorded payment"
        );

        Ok(PaymentReceipt {
            transaction,
            base_amount: conversion.base_amount,
            rate: conversion.rate,
            balance,
        })
    }

    // Transaction operations
    /// Record a cashbook entry that is not a fee payment
    pub async fn record_transaction(&mut self, transaction: Transaction) -> LedgerResult<Transaction> {
        self.transaction_manager
            .record_transaction(transaction)
            .await
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.transaction_manager
            .get_transaction(transaction_id)
            .await
    }

    /// List transactions by direction, currency and period
    pub async fn list_transactions(
        &self,
        direction: Option<Direction>,
        currency: Option<Currency>,
        period: Option<Period>,
        filters: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transaction_manager
            .list_transactions(direction, currency, period, filters)
            .await
    }

    // Reporting operations
    /// Build the debit/credit cashbook for a period
    pub async fn cashbook(&self, query: CashbookQuery) -> LedgerResult<Cashbook> {
        let mut filters = TransactionFilter::default();
        if let Some(account_id) = &query.account_id {
            filters = filters.account(account_id.clone());
        }

        let (incoming, outgoing) = tokio::join!(
            self.list_transactions(
                Some(Direction::Incoming),
                query.currency,
                Some(query.period),
                &filters
            ),
            self.list_transactions(
                Some(Direction::Outgoing),
                query.currency,
                Some(query.period),
                &filters
            ),
        );

        Ok(Cashbook::new(query, incoming?, outgoing?))
    }

    /// Sum fee payments over a period by fee type and currency
    pub async fn collection_report(&self, period: Period) -> LedgerResult<CollectionReport> {
        let incoming = self
            .list_transactions(
                Some(Direction::Incoming),
                None,
                Some(period),
                &TransactionFilter::default(),
            )
            .await?;
        Ok(CollectionReport::from_transactions(
            period,
            self.config.base_currency,
            &incoming,
        ))
    }

    /// Check recorded payments against stored rates and students
    pub async fn audit_conversions(&self, period: Period) -> LedgerResult<ConversionAudit> {
        let filters = TransactionFilter::default();
        let (payments, rates, students) = tokio::join!(
            self.list_transactions(Some(Direction::Incoming), None, Some(period), &filters),
            self.list_exchange_rates(period),
            self.list_students(),
        );

        let rates: HashMap<NaiveDate, ExchangeRate> =
            rates?.into_iter().map(|rate| (rate.date, rate)).collect();
        let known: HashSet<String> = students?.into_iter().map(|s| s.id).collect();

        let audit = audit_payments(period, &payments?, &rates, &known, &self.converter);
        if !audit.is_clean() {
            tracing::warn!(issues = audit.issues.len(), "Conversion audit found issues");
        }
        Ok(audit)
    }

    // Terms and billing
    /// Add a term.
    ///
    /// Rejects reversed dates, negative fees and terms that share a day with
    /// an existing term.
    pub async fn add_term(&mut self, term: Term) -> LedgerResult<Term> {
        term.validate()?;

        let storage = &mut self.transaction_manager.storage;
        if let Some(existing) = storage
            .list_terms()
            .await?
            .into_iter()
            .find(|t| t.id == term.id || t.overlaps(&term))
        {
            return Err(LedgerError::Validation(format!(
                "Term {} ({} to {}) clashes with term {} ({} to {})",
                term.id, term.start, term.end, existing.id, existing.start, existing.end
            )));
        }

        storage.save_term(&term).await?;
        tracing::info!(term = %term.id, start = %term.start, end = %term.end, "Added term");
        Ok(term)
    }

    /// Get a term by ID
    pub async fn get_term(&self, term_id: &str) -> LedgerResult<Option<Term>> {
        self.transaction_manager.storage.get_term(term_id).await
    }

    /// List terms, earliest first
    pub async fn list_terms(&self) -> LedgerResult<Vec<Term>> {
        self.transaction_manager.storage.list_terms().await
    }

    /// Charge a stored term's levy and tuition to every registered student.
    ///
    /// A term is billed once. Failures are collected per student and a levy
    /// charge whose tuition charge failed is reversed. The term is marked
    /// billed after the run even when some students failed.
    pub async fn bill_term(&mut self, term_id: &str) -> LedgerResult<BillingReport> {
        let mut term = self
            .get_term(term_id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound(format!("term {term_id}")))?;
        term.validate()?;

        if let Some(billed_at) = term.billed_at {
            return Err(LedgerError::Validation(format!(
                "Term {} was already billed at {}",
                term.id, billed_at
            )));
        }

        let mut report = BillingReport::new(term.id.clone());

        for student in self.student_manager.list_students().await? {
            if let Err(e) = self
                .student_manager
                .charge(&student.id, FeeType::Levy, &term.levy_billed)
                .await
            {
                report.failures.push(BillingFailure {
                    student_id: student.id,
                    error: e.to_string(),
                    partial: false,
                });
                continue;
            }

            match self
                .student_manager
                .charge(&student.id, FeeType::Tuition, &term.tuition_billed)
                .await
            {
                Ok(_) => {
                    report.levy_charged += &term.levy_billed;
                    report.tuition_charged += &term.tuition_billed;
                    report.billed.push(student.id);
                }
                Err(e) => {
                    let reversal = -term.levy_billed.clone();
                    let partial = self
                        .student_manager
                        .charge(&student.id, FeeType::Levy, &reversal)
                        .await
                        .is_err();
                    if partial {
                        report.levy_charged += &term.levy_billed;
                        tracing::error!(student_id = %student.id, term = %term.id, "Levy charged without tuition");
                    }
                    report.failures.push(BillingFailure {
                        student_id: student.id,
                        error: e.to_string(),
                        partial,
                    });
                }
            }
        }

        term.billed_at = Some(chrono::Utc::now().naive_utc());
        if let Err(e) = self.transaction_manager.storage.update_term(&term).await {
            return Err(LedgerError::PartialWrite(format!(
                "term {} charged to {} students but not marked billed: {e}",
                term.id,
                report.billed.len()
            )));
        }

        tracing::info!(
            term = %term.id,
            billed = report.billed.len(),
            failed = report.failures.len(),
            "Billed term"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    async fn ledger_with_student(levy: i64) -> (Ledger<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut ledger = Ledger::new(storage.clone());
        ledger
            .register_student("S1", "Tariro", None, BigDecimal::from(levy), BigDecimal::from(0))
            .await
            .unwrap();
        (ledger, storage)
    }

    #[tokio::test]
    async fn test_foreign_payment_reduces_balance() {
        let (mut ledger, _) = ledger_with_student(100).await;
        ledger
            .set_exchange_rate(date(1), BigDecimal::from(3500))
            .await
            .unwrap();

        let receipt = ledger
            .record_payment(PaymentRequest::new(
                "S1",
                FeeType::Levy,
                Currency::Zwg,
                BigDecimal::from(35000),
                date(1),
            ))
            .await
            .unwrap();

        assert_eq!(receipt.base_amount, BigDecimal::from(10));
        assert_eq!(receipt.rate, Some(BigDecimal::from(3500)));
        assert_eq!(receipt.balance.before, BigDecimal::from(100));
        assert_eq!(receipt.balance.after, BigDecimal::from(90));
        assert_eq!(
            ledger.get_balance("S1", FeeType::Levy).await.unwrap(),
            BigDecimal::from(90)
        );
    }

    #[tokio::test]
    async fn test_missing_rate_writes_nothing() {
        let (mut ledger, storage) = ledger_with_student(100).await;

        let result = ledger
            .record_payment(PaymentRequest::new(
                "S1",
                FeeType::Levy,
                Currency::Zwg,
                BigDecimal::from(35000),
                date(2),
            ))
            .await;

        assert!(matches!(result, Err(LedgerError::MissingRate { date: d }) if d == date(2)));
        assert_eq!(storage.transaction_count().unwrap(), 0);
        assert_eq!(
            ledger.get_balance("S1", FeeType::Levy).await.unwrap(),
            BigDecimal::from(100)
        );
    }

    #[tokio::test]
    async fn test_base_currency_payment_needs_no_rate() {
        let (mut ledger, _) = ledger_with_student(100).await;

        let receipt = ledger
            .record_payment(PaymentRequest::new(
                "S1",
                FeeType::Levy,
                Currency::Usd,
                BigDecimal::from(25),
                date(3),
            ))
            .await
            .unwrap();

        assert_eq!(receipt.rate, None);
        assert_eq!(receipt.new_balance(), &BigDecimal::from(75));
    }

    #[tokio::test]
    async fn test_unknown_student_and_bad_amount() {
        let (mut ledger, storage) = ledger_with_student(100).await;

        let unknown = ledger
            .record_payment(PaymentRequest::new(
                "S9",
                FeeType::Levy,
                Currency::Usd,
                BigDecimal::from(5),
                date(3),
            ))
            .await;
        assert!(matches!(unknown, Err(LedgerError::EntityNotFound(_))));

        let zero = ledger
            .record_payment(PaymentRequest::new(
                "S9",
                FeeType::Levy,
                Currency::Usd,
                BigDecimal::from(0),
                date(3),
            ))
            .await;
        assert!(matches!(zero, Err(LedgerError::InvalidAmount(_))));
        assert_eq!(storage.transaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_convert_does_not_write() {
        let (mut ledger, storage) = ledger_with_student(100).await;
        ledger
            .set_exchange_rate(date(4), BigDecimal::from(4000))
            .await
            .unwrap();

        let base = ledger.convert(date(4), &BigDecimal::from(2000)).await.unwrap();
        assert_eq!(base, "0.5".parse::<BigDecimal>().unwrap());
        assert!(matches!(
            ledger.convert(date(5), &BigDecimal::from(2000)).await,
            Err(LedgerError::MissingRate { .. })
        ));
        assert_eq!(storage.transaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bill_term_charges_every_student() {
        let (mut ledger, _) = ledger_with_student(10).await;
        ledger
            .register_student("S2", "Rudo", None, BigDecimal::from(0), BigDecimal::from(0))
            .await
            .unwrap();

        let term = Term::new(
            "2024-T1",
            "Term 1",
            date(1),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            BigDecimal::from(50),
            BigDecimal::from(200),
        )
        .unwrap();
        ledger.add_term(term).await.unwrap();
        let report = ledger.bill_term("2024-T1").await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.billed.len(), 2);
        assert_eq!(report.levy_charged, BigDecimal::from(100));
        assert_eq!(
            ledger.get_balance("S1", FeeType::Levy).await.unwrap(),
            BigDecimal::from(60)
        );
        assert_eq!(
            ledger.get_balance("S2", FeeType::Tuition).await.unwrap(),
            BigDecimal::from(200)
        );
    }

    #[tokio::test]
    async fn test_with_config_rejects_same_currencies() {
        let config = LedgerConfig {
            foreign_currency: Currency::Usd,
            ..LedgerConfig::default()
        };
        assert!(matches!(
            Ledger::with_config(MemoryStorage::new(), config),
            Err(LedgerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_term_is_billed_once() {
        let (mut ledger, _) = ledger_with_student(0).await;
        let term = Term::new(
            "2024-T1",
            "Term 1",
            date(1),
            date(29),
            BigDecimal::from(50),
            BigDecimal::from(200),
        )
        .unwrap();
        ledger.add_term(term).await.unwrap();

        ledger.bill_term("2024-T1").await.unwrap();
        let again = ledger.bill_term("2024-T1").await;

        assert!(matches!(again, Err(LedgerError::Validation(_))));
        assert_eq!(
            ledger.get_balance("S1", FeeType::Levy).await.unwrap(),
            BigDecimal::from(50)
        );
        assert!(ledger.get_term("2024-T1").await.unwrap().unwrap().is_billed());
        assert!(matches!(
            ledger.bill_term("missing").await,
            Err(LedgerError::EntityNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_overlapping_and_reversed_terms_rejected() {
        let (mut ledger, _) = ledger_with_student(0).await;
        let fee = || BigDecimal::from(10);
        let first = Term::new("T1", "First", date(1), date(15), fee(), fee()).unwrap();
        ledger.add_term(first).await.unwrap();

        let overlapping = Term::new("T2", "Second", date(15), date(31), fee(), fee()).unwrap();
        assert!(matches!(
            ledger.add_term(overlapping).await,
            Err(LedgerError::Validation(_))
        ));

        let mut reversed = Term::new("T3", "Third", date(20), date(31), fee(), fee()).unwrap();
        reversed.start = date(31);
        reversed.end = date(20);
        assert!(matches!(
            ledger.add_term(reversed).await,
            Err(LedgerError::Validation(_))
        ));

        let next = Term::new("T2", "Second", date(16), date(31), fee(), fee()).unwrap();
        ledger.add_term(next).await.unwrap();
        assert_eq!(ledger.list_terms().await.unwrap().len(), 2);
    }
}
