//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cashbook::Period;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct MemoryState {
    students: HashMap<String, Student>,
    /// Kept in recording order
    transactions: Vec<Transaction>,
    rates: BTreeMap<NaiveDate, ExchangeRate>,
    terms: HashMap<String, Term>,
}

/// In-memory storage implementation for testing and development.
///
/// Clones share the same data. All state sits behind one lock, so a payment
/// insert and its balance change are applied together.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        let mut state = self.write()?;
        state.students.clear();
        state.transactions.clear();
        state.rates.clear();
        state.terms.clear();
        Ok(())
    }

    /// Number of recorded transactions
    pub fn transaction_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.transactions.len())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl MemoryState {
    fn student_mut(&mut self, student_id: &str) -> LedgerResult<&mut Student> {
        self.students
            .get_mut(student_id)
            .ok_or_else(|| LedgerError::EntityNotFound(student_id.to_string()))
    }

    fn push_transaction(&mut self, transaction: &Transaction) -> LedgerResult<Transaction> {
        if self.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(LedgerError::Storage(format!(
                "Transaction '{}' already exists",
                transaction.id
            )));
        }
        self.transactions.push(transaction.clone());
        Ok(transaction.clone())
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn insert_transaction(&mut self, transaction: &Transaction) -> LedgerResult<Transaction> {
        self.write()?.push_transaction(transaction)
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .read()?
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned())
    }

    async fn remove_transaction(&mut self, transaction_id: &str) -> LedgerResult<()> {
        let mut state = self.write()?;
        let index = state
            .transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))?;
        state.transactions.remove(index);
        Ok(())
    }

    async fn list_transactions(
        &self,
        direction: Option<Direction>,
        currency: Option<Currency>,
        period: Option<Period>,
        filters: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        let state = self.read()?;
        let mut filtered: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|txn| {
                direction.is_none_or(|d| txn.direction == d)
                    && currency.is_none_or(|c| txn.currency == c)
                    && period.is_none_or(|p| p.contains(txn.date))
                    && filters.matches(txn)
            })
            .cloned()
            .collect();
        // stable, so same-day rows stay in recording order
        filtered.sort_by_key(|txn| txn.date);
        Ok(filtered)
    }

    async fn get_exchange_rate(&self, date: NaiveDate) -> LedgerResult<Option<ExchangeRate>> {
        Ok(self.read()?.rates.get(&date).cloned())
    }

    async fn save_exchange_rate(&mut self, rate: &ExchangeRate) -> LedgerResult<()> {
        self.write()?.rates.insert(rate.date, rate.clone());
        Ok(())
    }

    async fn list_exchange_rates(&self, period: Period) -> LedgerResult<Vec<ExchangeRate>> {
        // BTreeMap::range panics on reversed bounds
        if period.start() > period.end() {
            return Ok(Vec::new());
        }
        Ok(self
            .read()?
            .rates
            .range(period.start()..=period.end())
            .map(|(_, rate)| rate.clone())
            .collect())
    }

    async fn save_student(&mut self, student: &Student) -> LedgerResult<()> {
        self.write()?
            .students
            .insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn get_student(&self, student_id: &str) -> LedgerResult<Option<Student>> {
        Ok(self.read()?.students.get(student_id).cloned())
    }

    async fn list_students(&self) -> LedgerResult<Vec<Student>> {
        let mut students: Vec<Student> = self.read()?.students.values().cloned().collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    async fn update_student(&mut self, student: &Student) -> LedgerResult<()> {
        let mut state = self.write()?;
        let stored = state.student_mut(&student.id)?;
        *stored = student.clone();
        Ok(())
    }

    async fn save_term(&mut self, term: &Term) -> LedgerResult<()> {
        let mut state = self.write()?;
        if state.terms.contains_key(&term.id) {
            return Err(LedgerError::Storage(format!(
                "Term '{}' already exists",
                term.id
            )));
        }
        state.terms.insert(term.id.clone(), term.clone());
        Ok(())
    }

    async fn get_term(&self, term_id: &str) -> LedgerResult<Option<Term>> {
        Ok(self.read()?.terms.get(term_id).cloned())
    }

    async fn list_terms(&self) -> LedgerResult<Vec<Term>> {
        let mut terms: Vec<Term> = self.read()?.terms.values().cloned().collect();
        terms.sort_by_key(|t| t.start);
        Ok(terms)
    }

    async fn update_term(&mut self, term: &Term) -> LedgerResult<()> {
        let mut state = self.write()?;
        let stored = state
            .terms
            .get_mut(&term.id)
            .ok_or_else(|| LedgerError::EntityNotFound(term.id.clone()))?;
        *stored = term.clone();
        Ok(())
    }

    async fn adjust_entity_balance(
        &mut self,
        student_id: &str,
        fee_type: FeeType,
        delta: &BigDecimal,
    ) -> LedgerResult<BalanceChange> {
        let mut state = self.write()?;
        Ok(state.student_mut(student_id)?.adjust_balance(fee_type, delta))
    }

    async fn apply_payment(
        &mut self,
        transaction: &Transaction,
        student_id: &str,
        fee_type: FeeType,
        base_amount: &BigDecimal,
    ) -> LedgerResult<BalanceChange> {
        let mut state = self.write()?;
        // check the student first so a failed lookup leaves nothing behind
        state.student_mut(student_id)?;
        state.push_transaction(transaction)?;
        let delta = -base_amount.clone();
        Ok(state.student_mut(student_id)?.adjust_balance(fee_type, &delta))
    }
}
