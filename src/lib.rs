// Employee Staff Management System - Core Library
// Exposes all modules for use in the CLI, the terminal UI, and tests

pub mod config;
pub mod db;
pub mod deduplication;
pub mod employee;
pub mod registry;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    RecordStore,
    open_database, setup_database, insert_employee, update_employee, delete_employee,
    get_employee, get_all_employees, search_employees, count_employees,
    fetch_all_names, email_exists, contact_exists,
};
pub use deduplication::{
    DeduplicationEngine, DuplicateMatch, LinearScanNameChecker, NameUniquenessChecker,
    normalize_name,
};
pub use employee::{Employee, EmployeeId, Field, format_dob};
pub use registry::{EmployeeRegistry, Rejection, SaveOutcome, check_fields};
pub use validation::{
    ValidationResult, validate_dob, validate_dob_on, validate_email, validate_phone,
};
