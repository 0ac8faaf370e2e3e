//! Student registry and owed balances

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Student manager for registering students and reading their balances
pub struct StudentManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn StudentValidator>,
}

impl<S: LedgerStorage> StudentManager<S> {
    /// Create a new student manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultStudentValidator),
        }
    }

    /// Create a new student manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn StudentValidator>) -> Self {
        Self { storage, validator }
    }

    /// Register a student with opening balances
    pub async fn register_student(
        &mut self,
        id: String,
        name: String,
        class: Option<String>,
        levy_owing: BigDecimal,
        tuition_owing: BigDecimal,
    ) -> LedgerResult<Student> {
        let student = Student::new(id, name, class, levy_owing, tuition_owing);

        self.validator.validate_student(&student)?;

        if self.storage.get_student(&student.id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Student with ID '{}' already exists",
                student.id
            )));
        }

        self.storage.save_student(&student).await?;
        tracing::info!(student_id = %student.id, "Registered student");

        Ok(student)
    }

    /// Get a student by ID
    pub async fn get_student(&self, student_id: &str) -> LedgerResult<Option<Student>> {
        self.storage.get_student(student_id).await
    }

    /// Get a student by ID, returning an error if not found
    pub async fn get_student_required(&self, student_id: &str) -> LedgerResult<Student> {
        self.storage
            .get_student(student_id)
            .await?
            .ok_or_else(|| LedgerError::EntityNotFound(student_id.to_string()))
    }

    /// List all students
    pub async fn list_students(&self) -> LedgerResult<Vec<Student>> {
        self.storage.list_students().await
    }

    /// Update a student's name and class.
    ///
    /// Balances in `student` are ignored; they only move through payments and
    /// billing.
    pub async fn update_details(&mut self, student: &Student) -> LedgerResult<Student> {
        self.validator.validate_student(student)?;

        let mut stored = self.get_student_required(&student.id).await?;
        stored.name = student.name.clone();
        stored.class = student.class.clone();
        stored.updated_at = chrono::Utc::now().naive_utc();

        self.storage.update_student(&stored).await?;
        Ok(stored)
    }

    /// Owed balance for a fee type
    pub async fn get_balance(&self, student_id: &str, fee_type: FeeType) -> LedgerResult<BigDecimal> {
        self.storage.get_entity_balance(student_id, fee_type).await
    }

    /// Add a charge to a student's owed balance
    pub async fn charge(
        &mut self,
        student_id: &str,
        fee_type: FeeType,
        amount: &BigDecimal,
    ) -> LedgerResult<BalanceChange> {
        self.storage
            .adjust_entity_balance(student_id, fee_type, amount)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;
    use crate::utils::EnhancedStudentValidator;

    #[tokio::test]
    async fn test_register_and_reject_duplicates() {
        let mut manager = StudentManager::new(MemoryStorage::new());

        let student = manager
            .register_student(
                "S1".to_string(),
                "Nyasha".to_string(),
                Some("Form 2".to_string()),
                BigDecimal::from(100),
                BigDecimal::from(250),
            )
            .await
            .unwrap();
        assert_eq!(student.levy_owing, BigDecimal::from(100));

        let duplicate = manager
            .register_student(
                "S1".to_string(),
                "Someone Else".to_string(),
                None,
                BigDecimal::from(0),
                BigDecimal::from(0),
            )
            .await;
        assert!(matches!(duplicate, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_details_keeps_balances() {
        let mut manager = StudentManager::new(MemoryStorage::new());
        let mut student = manager
            .register_student(
                "S1".to_string(),
                "Nyasha".to_string(),
                None,
                BigDecimal::from(100),
                BigDecimal::from(0),
            )
            .await
            .unwrap();

        student.name = "Nyasha Dube".to_string();
        student.levy_owing = BigDecimal::from(0);
        let updated = manager.update_details(&student).await.unwrap();

        assert_eq!(updated.name, "Nyasha Dube");
        assert_eq!(
            manager.get_balance("S1", FeeType::Levy).await.unwrap(),
            BigDecimal::from(100)
        );
    }

    #[tokio::test]
    async fn test_enhanced_validator_rejects_bad_ids() {
        let mut manager =
            StudentManager::with_validator(MemoryStorage::new(), Box::new(EnhancedStudentValidator));
        let result = manager
            .register_student(
                "S 1".to_string(),
                "Farai".to_string(),
                None,
                BigDecimal::from(0),
                BigDecimal::from(0),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_student_balance() {
        let manager = StudentManager::new(MemoryStorage::new());
        let err = manager.get_balance("ghost", FeeType::Tuition).await.unwrap_err();
        assert!(matches!(err, LedgerError::EntityNotFound(_)));
    }
}
