//! Foreign to base currency conversion with daily rates

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::types::*;

/// Result of converting one amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub currency: Currency,
    /// Amount as paid
    pub original: BigDecimal,
    /// Amount in the base currency
    pub base_amount: BigDecimal,
    /// Rate applied, absent when the amount was already in the base currency
    pub rate: Option<BigDecimal>,
}

/// Converts amounts into the base currency.
///
/// Rates are foreign units per base unit, so `base = foreign / rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyConverter {
    base: Currency,
    foreign: Currency,
    scale: Option<i64>,
}

impl CurrencyConverter {
    pub fn new(base: Currency, foreign: Currency, scale: Option<i64>) -> Self {
        Self {
            base,
            foreign,
            scale,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            config.base_currency,
            config.foreign_currency,
            config.conversion_scale,
        )
    }

    pub fn base_currency(&self) -> Currency {
        self.base
    }

    /// Whether amounts in `currency` need a rate
    pub fn needs_rate(&self, currency: Currency) -> bool {
        currency != self.base
    }

    /// Divide a foreign amount by the day's rate
    pub fn foreign_to_base(&self, amount: &BigDecimal, rate: &ExchangeRate) -> LedgerResult<BigDecimal> {
        if rate.rate <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(format!(
                "Exchange rate for {} must be positive, got {}",
                rate.date, rate.rate
            )));
        }

        let converted = amount / &rate.rate;
        Ok(self.round(converted))
    }

    /// Convert `amount` paid in `currency`.
    ///
    /// `rate` is only consulted for the foreign currency; passing `None` there
    /// is a missing rate for `rate_date`.
    pub fn convert(
        &self,
        amount: &BigDecimal,
        currency: Currency,
        rate_date: chrono::NaiveDate,
        rate: Option<&ExchangeRate>,
    ) -> LedgerResult<Conversion> {
        if currency == self.base {
            return Ok(Conversion {
                currency,
                original: amount.clone(),
                base_amount: amount.clone(),
                rate: None,
            });
        }

        if currency != self.foreign {
            return Err(LedgerError::Validation(format!(
                "No conversion configured from {currency} to {}",
                self.base
            )));
        }

        let rate = rate.ok_or(LedgerError::MissingRate { date: rate_date })?;
        let base_amount = self.foreign_to_base(amount, rate)?;

        Ok(Conversion {
            currency,
            original: amount.clone(),
            base_amount,
            rate: Some(rate.rate.clone()),
        })
    }

    fn round(&self, value: BigDecimal) -> BigDecimal {
        match self.scale {
            Some(scale) => value.with_scale_round(scale, RoundingMode::HalfUp),
            None => value,
        }
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}
