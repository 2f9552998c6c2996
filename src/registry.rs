// 🗂️ Employee Registry - the save sequence
// trim -> required fields -> formats -> uniqueness -> persist/update.
// The first failing check stops the sequence; nothing is written.

use anyhow::Result;
use rusqlite::Connection;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::RecordStore;
use crate::deduplication::{
    DeduplicationEngine, DuplicateMatch, LinearScanNameChecker, NameUniquenessChecker,
};
use crate::employee::{Employee, EmployeeId, Field};
use crate::validation::{validate_dob, validate_email, validate_phone, ValidationResult};

// ============================================================================
// REJECTION
// ============================================================================

/// Why a save was refused. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{} cannot be empty or just spaces.", .field.title())]
    EmptyField { field: Field },

    #[error("{message}")]
    InvalidFormat { field: Field, message: String },

    #[error("An employee named '{name}' already exists.")]
    DuplicateName { name: String },

    #[error("The email '{email}' is already used by another employee.")]
    DuplicateEmail { email: String },

    #[error("The phone number '{contact}' is already used by another employee.")]
    DuplicateContact { contact: String },
}

impl Rejection {
    /// Dialog-style heading for the rejection
    pub fn title(&self) -> &'static str {
        match self {
            Rejection::EmptyField { .. } => "Validation Error",
            Rejection::InvalidFormat { field: Field::Email, .. } => "Invalid Email",
            Rejection::InvalidFormat { field: Field::Contact, .. } => "Invalid Phone Number",
            Rejection::InvalidFormat { field: Field::Dob, .. } => "Invalid Date of Birth",
            Rejection::InvalidFormat { .. } => "Validation Error",
            Rejection::DuplicateName { .. } => "Duplicate Name",
            Rejection::DuplicateEmail { .. } => "Duplicate Email",
            Rejection::DuplicateContact { .. } => "Duplicate Phone Number",
        }
    }

    pub fn field(&self) -> Field {
        match self {
            Rejection::EmptyField { field } | Rejection::InvalidFormat { field, .. } => *field,
            Rejection::DuplicateName { .. } => Field::Name,
            Rejection::DuplicateEmail { .. } => Field::Email,
            Rejection::DuplicateContact { .. } => Field::Contact,
        }
    }
}

impl From<ValidationResult> for Rejection {
    fn from(result: ValidationResult) -> Self {
        Rejection::InvalidFormat {
            field: result.field,
            message: result.message,
        }
    }
}

impl From<DuplicateMatch> for Rejection {
    fn from(m: DuplicateMatch) -> Self {
        match m.field {
            Field::Email => Rejection::DuplicateEmail { email: m.value },
            Field::Contact => Rejection::DuplicateContact { contact: m.value },
            _ => Rejection::DuplicateName { name: m.value },
        }
    }
}

// ============================================================================
// SAVE OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(EmployeeId),
    Updated(EmployeeId),
    Rejected(Rejection),
}

impl SaveOutcome {
    pub fn id(&self) -> Option<EmployeeId> {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => Some(*id),
            SaveOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            SaveOutcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Checks that need no storage access, in save order
pub fn check_fields(employee: &Employee) -> Result<(), Rejection> {
    if let Some(field) = employee.first_blank_field() {
        return Err(Rejection::EmptyField { field });
    }

    validate_email(&employee.email).into_result()?;
    validate_phone(&employee.contact).into_result()?;
    validate_dob(&employee.dob).into_result()?;

    Ok(())
}

pub struct EmployeeRegistry<'a, S: RecordStore + ?Sized, N: NameUniquenessChecker> {
    store: &'a S,
    dedup: DeduplicationEngine<'a, S, N>,
}

impl<'a> EmployeeRegistry<'a, Connection, LinearScanNameChecker<'a, Connection>> {
    /// Registry over a SQLite connection with the linear-scan name checker
    pub fn new(conn: &'a Connection) -> Self {
        EmployeeRegistry {
            store: conn,
            dedup: DeduplicationEngine::new(conn),
        }
    }
}

impl<'a, S: RecordStore + ?Sized, N: NameUniquenessChecker> EmployeeRegistry<'a, S, N> {
    pub fn with_parts(store: &'a S, names: N) -> Self {
        EmployeeRegistry {
            store,
            dedup: DeduplicationEngine::with_name_checker(store, names),
        }
    }

    /// Storage-backed uniqueness checks. `exclude_id` is the record being edited.
    pub fn check_uniqueness(
        &self,
        employee: &Employee,
        exclude_id: Option<EmployeeId>,
    ) -> Result<Option<Rejection>> {
        let duplicate = self.dedup.find_duplicate(
            &employee.name,
            &employee.email,
            &employee.contact,
            exclude_id,
        )?;

        Ok(duplicate.map(Rejection::from))
    }

    /// Validate and write. `existing_id` selects update-in-place; None inserts.
    ///
    /// Bad input comes back as `SaveOutcome::Rejected`. Storage failures are
    /// errors and abort the save.
    pub fn save(&self, employee: &Employee, existing_id: Option<EmployeeId>) -> Result<SaveOutcome> {
        let employee = employee.trimmed();

        if let Err(rejection) = check_fields(&employee) {
            warn!(%rejection, "save rejected");
            return Ok(SaveOutcome::Rejected(rejection));
        }

        if let Some(rejection) = self.check_uniqueness(&employee, existing_id)? {
            warn!(%rejection, "save rejected");
            return Ok(SaveOutcome::Rejected(rejection));
        }

        match existing_id {
            Some(id) => {
                self.store.update(id, &employee)?;
                info!(id, "record saved");
                Ok(SaveOutcome::Updated(id))
            }
            None => {
                let id = self.store.persist(&employee)?;
                info!(id, "record saved");
                Ok(SaveOutcome::Created(id))
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_employee, setup_database};
    use std::cell::RefCell;

    fn valid_employee(name: &str, contact: &str, email: &str) -> Employee {
        Employee {
            id: None,
            name: name.to_string(),
            gender: "FEMALE".to_string(),
            dob: "1995-06-15".to_string(),
            department: "FINANCE".to_string(),
            position: "STAFF".to_string(),
            status: "ACTIVE".to_string(),
            contact: contact.to_string(),
            email: email.to_string(),
            address: "Davao City".to_string(),
        }
    }

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_save_creates_trimmed_record() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);

        let mut emp = valid_employee("  Liza Soberano ", "09171234567", "liza@acme.ph");
        emp.address = "  Davao City  ".to_string();

        let outcome = registry.save(&emp, None).unwrap();
        let id = outcome.id().unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));

        let stored = get_employee(&conn, id).unwrap().unwrap();
        assert_eq!(stored.name, "Liza Soberano");
        assert_eq!(stored.address, "Davao City");
    }

    #[test]
    fn test_blank_field_rejected_with_title() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);

        let mut emp = valid_employee("Liza", "09171234567", "liza@acme.ph");
        emp.position = "   ".to_string();

        let outcome = registry.save(&emp, None).unwrap();
        let rejection = outcome.rejection().unwrap();
        assert_eq!(rejection, &Rejection::EmptyField { field: Field::Position });
        assert_eq!(rejection.to_string(), "Position cannot be empty or just spaces.");
        assert_eq!(rejection.title(), "Validation Error");
    }

    #[test]
    fn test_format_checks_run_in_order() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);

        // bad email and bad phone: email reported first
        let emp = valid_employee("Liza", "123-456-7890", "liza@@acme.ph");
        let rejection = registry.save(&emp, None).unwrap().rejection().cloned().unwrap();
        assert_eq!(rejection.field(), Field::Email);
        assert_eq!(rejection.title(), "Invalid Email");

        let emp = valid_employee("Liza", "123-456-7890", "liza@acme.ph");
        let rejection = registry.save(&emp, None).unwrap().rejection().cloned().unwrap();
        assert_eq!(rejection.field(), Field::Contact);

        let mut emp = valid_employee("Liza", "09171234567", "liza@acme.ph");
        emp.dob = "2099-01-01".to_string();
        let rejection = registry.save(&emp, None).unwrap().rejection().cloned().unwrap();
        assert_eq!(rejection.field(), Field::Dob);
        assert!(rejection.to_string().contains("future"));

        assert_eq!(crate::db::count_employees(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_name_email_contact() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);
        registry
            .save(&valid_employee("J. Dela Cruz", "09171234567", "juan@acme.ph"), None)
            .unwrap();

        let outcome = registry
            .save(&valid_employee("j dela cruz", "09170000000", "other@acme.ph"), None)
            .unwrap();
        assert_eq!(
            outcome.rejection().unwrap().to_string(),
            "An employee named 'j dela cruz' already exists."
        );

        let outcome = registry
            .save(&valid_employee("Pedro Penduko", "09170000000", "JUAN@acme.ph"), None)
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(Rejection::DuplicateEmail { .. })));

        let outcome = registry
            .save(&valid_employee("Pedro Penduko", "09171234567", "pedro@acme.ph"), None)
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(Rejection::DuplicateContact { .. })));
    }

    #[test]
    fn test_update_does_not_collide_with_itself() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);
        let emp = valid_employee("J. Dela Cruz", "09171234567", "juan@acme.ph");
        let id = registry.save(&emp, None).unwrap().id().unwrap();

        let mut edited = emp.clone();
        edited.status = "ON LEAVE".to_string();
        let outcome = registry.save(&edited, Some(id)).unwrap();
        assert_eq!(outcome, SaveOutcome::Updated(id));
        assert_eq!(get_employee(&conn, id).unwrap().unwrap().status, "ON LEAVE");
    }

    #[test]
    fn test_update_still_collides_with_others() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);
        registry
            .save(&valid_employee("Ana Lim", "09171111111", "ana@acme.ph"), None)
            .unwrap();
        let id = registry
            .save(&valid_employee("Ben Go", "09172222222", "ben@acme.ph"), None)
            .unwrap()
            .id()
            .unwrap();

        let outcome = registry
            .save(&valid_employee("ANA   LIM", "09172222222", "ben@acme.ph"), Some(id))
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(Rejection::DuplicateName { .. })));
    }

    #[test]
    fn test_update_of_missing_record_is_an_error() {
        let conn = test_db();
        let registry = EmployeeRegistry::new(&conn);

        let result = registry.save(&valid_employee("Nobody", "09171234567", "n@acme.ph"), Some(99));
        assert!(result.is_err());
    }

    // In-memory store: exercises the registry without SQLite
    #[derive(Default)]
    struct MemoryStore {
        rows: RefCell<Vec<Employee>>,
        fail_writes: bool,
    }

    impl RecordStore for MemoryStore {
        fn fetch_all_names(&self, exclude_id: Option<EmployeeId>) -> Result<Vec<String>> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .filter(|e| exclude_id.is_none() || e.id != exclude_id)
                .map(|e| e.name.clone())
                .collect())
        }

        fn email_exists(&self, email: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
            Ok(self.rows.borrow().iter().any(|e| {
                (exclude_id.is_none() || e.id != exclude_id) && e.email.to_lowercase() == email.to_lowercase()
            }))
        }

        fn contact_exists(&self, contact: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
            Ok(self
                .rows
                .borrow()
                .iter()
                .any(|e| (exclude_id.is_none() || e.id != exclude_id) && e.contact == contact))
        }

        fn persist(&self, employee: &Employee) -> Result<EmployeeId> {
            if self.fail_writes {
                anyhow::bail!("disk I/O error");
            }
            let mut rows = self.rows.borrow_mut();
            let id = rows.len() as EmployeeId + 1;
            let mut stored = employee.clone();
            stored.id = Some(id);
            rows.push(stored);
            Ok(id)
        }

        fn update(&self, id: EmployeeId, employee: &Employee) -> Result<()> {
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .iter_mut()
                .find(|e| e.id == Some(id))
                .ok_or_else(|| anyhow::anyhow!("Employee {} not found", id))?;
            *row = Employee {
                id: Some(id),
                ..employee.clone()
            };
            Ok(())
        }
    }

    #[test]
    fn test_registry_over_custom_store() {
        let store = MemoryStore::default();
        let registry = EmployeeRegistry::with_parts(&store, LinearScanNameChecker::new(&store));

        let id = registry
            .save(&valid_employee("Maria Clara", "09171234567", "mc@acme.ph"), None)
            .unwrap()
            .id()
            .unwrap();
        assert_eq!(id, 1);

        let outcome = registry
            .save(&valid_employee("M. Maria Clara", "09170000000", "x@acme.ph"), None)
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Rejected(Rejection::DuplicateName { .. })));
    }

    #[test]
    fn test_storage_failure_propagates() {
        let store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let registry = EmployeeRegistry::with_parts(&store, LinearScanNameChecker::new(&store));

        let err = registry
            .save(&valid_employee("Maria Clara", "09171234567", "mc@acme.ph"), None)
            .unwrap_err();
        assert!(err.to_string().contains("disk I/O error"));
        assert!(store.rows.borrow().is_empty());
    }
}
