//! Fee collection summaries for daily, monthly and termly reports

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cashbook::Period;
use crate::types::*;

/// Collections for one fee type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeCollection {
    /// Sum of payments per currency, in that currency
    pub by_currency: BTreeMap<Currency, BigDecimal>,
    /// Everything collected expressed in the base currency
    pub base_total: BigDecimal,
    pub payments: usize,
    /// Foreign-currency payments with no stored base amount, left out of `base_total`
    #[serde(default)]
    pub unconverted: Vec<String>,
}

impl FeeCollection {
    /// Amount collected in one currency
    pub fn in_currency(&self, currency: Currency) -> BigDecimal {
        self.by_currency
            .get(&currency)
            .cloned()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    fn add(&mut self, payment: &Transaction, base_currency: Currency) {
        let amount = payment.amount_or_zero();
        *self
            .by_currency
            .entry(payment.currency)
            .or_insert_with(|| BigDecimal::from(0)) += &amount;
        self.payments += 1;

        match &payment.base_amount {
            Some(base) => self.base_total += base,
            None if payment.currency == base_currency => self.base_total += amount,
            None => {
                tracing::warn!(
                    transaction_id = %payment.id,
                    currency = %payment.currency,
                    "Fee payment has no base amount, left out of base total"
                );
                self.unconverted.push(payment.id.clone());
            }
        }
    }
}

/// Fee payments collected over a period, split by fee type and currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub period: Period,
    pub levy: FeeCollection,
    pub tuition: FeeCollection,
}

impl CollectionReport {
    /// Summarise the fee payments among `transactions` that fall in `period`
    pub fn from_transactions(
        period: Period,
        base_currency: Currency,
        transactions: &[Transaction],
    ) -> Self {
        let mut levy = FeeCollection::default();
        let mut tuition = FeeCollection::default();

        for payment in transactions
            .iter()
            .filter(|t| t.is_fee_payment() && period.contains(t.date))
        {
            match payment.fee_type {
                Some(FeeType::Levy) => levy.add(payment, base_currency),
                Some(FeeType::Tuition) => tuition.add(payment, base_currency),
                None => {}
            }
        }

        Self {
            period,
            levy,
            tuition,
        }
    }

    pub fn fee(&self, fee_type: FeeType) -> &FeeCollection {
        match fee_type {
            FeeType::Levy => &self.levy,
            FeeType::Tuition => &self.tuition,
        }
    }

    /// Levy and tuition together, in the base currency
    pub fn base_total(&self) -> BigDecimal {
        &self.levy.base_total + &self.tuition.base_total
    }
}
