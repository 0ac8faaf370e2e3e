//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::InvalidAmount(format!(
            "Amount must be positive, got {amount}"
        )))
    } else {
        Ok(())
    }
}

/// Parse an amount typed into a form, rejecting non-numeric and non-positive input
pub fn parse_amount(input: &str) -> LedgerResult<BigDecimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAmount("Amount is required".to_string()));
    }

    let amount = BigDecimal::from_str(trimmed)
        .map_err(|_| LedgerError::InvalidAmount(format!("'{trimmed}' is not a number")))?;
    validate_positive_amount(&amount)?;
    Ok(amount)
}

/// Validate that a student ID is valid
pub fn validate_student_id(student_id: &str) -> LedgerResult<()> {
    if student_id.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Student ID cannot be empty".to_string(),
        ));
    }

    if student_id.len() > 50 {
        return Err(LedgerError::Validation(
            "Student ID cannot exceed 50 characters".to_string(),
        ));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !student_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Student ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that a student name is valid
pub fn validate_student_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Student name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Student name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a cashbook category label
pub fn validate_category(category: &str) -> LedgerResult<()> {
    if category.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Category cannot be empty".to_string(),
        ));
    }

    if category.len() > 50 {
        return Err(LedgerError::Validation(
            "Category cannot exceed 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a free-text transaction description
pub fn validate_transaction_description(description: &str) -> LedgerResult<()> {
    if description.len() > 500 {
        return Err(LedgerError::Validation(
            "Transaction description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced transaction validator with detailed checks
pub struct EnhancedTransactionValidator;

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        // Basic validation
        transaction.validate()?;

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

        if let Some(student_id) = &transaction.student_id {
            validate_student_id(student_id)?;
        }

        // fee payments record what they came to in the base currency
        if transaction.fee_type.is_some() {
            match &transaction.base_amount {
                Some(base) => validate_positive_amount(base)?,
                None => {
                    return Err(LedgerError::Validation(
                        "Fee payments must carry a base-currency amount".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }
}

/// Enhanced student validator with detailed checks
pub struct EnhancedStudentValidator;

impl StudentValidator for EnhancedStudentValidator {
    fn validate_student(&self, student: &Student) -> LedgerResult<()> {
        validate_student_id(&student.id)?;
        validate_student_name(&student.name)?;
        Ok(())
    }
}
