//! Fee payments and the receipts they produce

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// A fee payment as captured by the bursar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub student_id: String,
    pub fee_type: FeeType,
    pub currency: Currency,
    /// Amount in `currency`
    pub amount: BigDecimal,
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub timeline: PaymentTimeline,
    pub method: Option<PaymentMethod>,
    /// Bank account the money was paid into
    pub account_id: Option<String>,
}

impl PaymentRequest {
    pub fn new(
        student_id: impl Into<String>,
        fee_type: FeeType,
        currency: Currency,
        amount: BigDecimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            fee_type,
            currency,
            amount,
            date,
            reference: None,
            timeline: PaymentTimeline::default(),
            method: None,
            account_id: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn timeline(mut self, timeline: PaymentTimeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Reject non-positive amounts before anything is looked up or written
    pub fn validate(&self) -> LedgerResult<()> {
        if self.amount <= BigDecimal::from(0) {
            return Err(LedgerError::InvalidAmount(format!(
                "Payment amount must be positive, got {}",
                self.amount
            )));
        }

        if self.student_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Payment must reference a student".to_string(),
            ));
        }

        Ok(())
    }

    /// The cashbook transaction recording this payment
    pub fn to_transaction(&self, id: String, base_amount: BigDecimal) -> Transaction {
        let mut transaction = Transaction::new(
            id,
            self.date,
            self.amount.clone(),
            Direction::Incoming,
            self.currency,
            Some(self.fee_type.label().to_string()),
        );
        transaction.student_id = Some(self.student_id.clone());
        transaction.account_id = self.account_id.clone();
        transaction.fee_type = Some(self.fee_type);
        transaction.base_amount = Some(base_amount);
        transaction.reference = self.reference.clone();
        transaction.timeline = Some(self.timeline);
        transaction.method = self.method;
        transaction
    }
}

/// What a recorded payment did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction: Transaction,
    /// Amount that came off the owed balance, in the base currency
    pub base_amount: BigDecimal,
    /// Rate used, when the payment was in the foreign currency
    pub rate: Option<BigDecimal>,
    pub balance: BalanceChange,
}

impl PaymentReceipt {
    /// Owed balance after the payment
    pub fn new_balance(&self) -> &BigDecimal {
        &self.balance.after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: i64) -> PaymentRequest {
        PaymentRequest::new(
            "S1",
            FeeType::Levy,
            Currency::Zwg,
            BigDecimal::from(amount),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(request(10).validate().is_ok());
        assert!(matches!(request(0).validate(), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(request(-5).validate(), Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_to_transaction_carries_payment_details() {
        let txn = request(35000)
            .reference("RCPT-12")
            .timeline(PaymentTimeline::Recovery)
            .method(PaymentMethod::Transfer)
            .account("cbz")
            .to_transaction("p1".to_string(), BigDecimal::from(10));

        assert_eq!(txn.direction, Direction::Incoming);
        assert_eq!(txn.category.as_deref(), Some("levy"));
        assert_eq!(txn.student_id.as_deref(), Some("S1"));
        assert_eq!(txn.account_id.as_deref(), Some("cbz"));
        assert_eq!(txn.base_amount, Some(BigDecimal::from(10)));
        assert_eq!(txn.timeline, Some(PaymentTimeline::Recovery));
        assert_eq!(txn.method, Some(PaymentMethod::Transfer));
        assert!(txn.is_fee_payment());
        assert!(txn.validate().is_ok());
    }
}
