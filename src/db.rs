use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::employee::{Employee, EmployeeId};

/// How long a statement waits on a locked database file
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const EMPLOYEE_COLUMNS: &str =
    "employee_id, name, gender, dob, department, position, status, contact, email, address";

// ============================================================================
// RECORD STORE
// ============================================================================

/// What the validation and uniqueness layer needs from storage.
/// Implemented for `rusqlite::Connection`; tests can substitute their own.
pub trait RecordStore {
    /// Every stored name, optionally skipping one record
    fn fetch_all_names(&self, exclude_id: Option<EmployeeId>) -> Result<Vec<String>>;

    /// Case-insensitive email match among other records
    fn email_exists(&self, email: &str, exclude_id: Option<EmployeeId>) -> Result<bool>;

    /// Exact contact match among other records
    fn contact_exists(&self, contact: &str, exclude_id: Option<EmployeeId>) -> Result<bool>;

    /// Insert and return the assigned identifier
    fn persist(&self, employee: &Employee) -> Result<EmployeeId>;

    /// Rewrite every field of an existing record
    fn update(&self, id: EmployeeId, employee: &Employee) -> Result<()>;
}

impl RecordStore for Connection {
    fn fetch_all_names(&self, exclude_id: Option<EmployeeId>) -> Result<Vec<String>> {
        fetch_all_names(self, exclude_id)
    }

    fn email_exists(&self, email: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
        email_exists(self, email, exclude_id)
    }

    fn contact_exists(&self, contact: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
        contact_exists(self, contact, exclude_id)
    }

    fn persist(&self, employee: &Employee) -> Result<EmployeeId> {
        insert_employee(self, employee)
    }

    fn update(&self, id: EmployeeId, employee: &Employee) -> Result<()> {
        update_employee(self, id, employee)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    // in-memory databases answer "memory"
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(%mode, "journal mode");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS employees (
            employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            gender TEXT,
            dob TEXT,
            department TEXT,
            position TEXT,
            status TEXT,
            contact TEXT,
            email TEXT,
            address TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(name)",
        [],
    )?;

    Ok(())
}

/// Open (creating if needed) the database file and make sure the table exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    setup_database(&conn).context("Failed to initialize employees table")?;

    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

// ============================================================================
// CRUD
// ============================================================================

fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        gender: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        dob: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        department: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        position: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        contact: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        address: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}

/// Insert a new record; any `id` on the input is ignored
pub fn insert_employee(conn: &Connection, emp: &Employee) -> Result<EmployeeId> {
    conn.execute(
        "INSERT INTO employees (name, gender, dob, department, position, status, contact, email, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            emp.name,
            emp.gender,
            emp.dob,
            emp.department,
            emp.position,
            emp.status,
            emp.contact,
            emp.email,
            emp.address,
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(id, name = %emp.name, "employee added");
    Ok(id)
}

/// Rewrite all fields of record `id`. Fails if no such record exists.
pub fn update_employee(conn: &Connection, id: EmployeeId, emp: &Employee) -> Result<()> {
    let changed = conn.execute(
        "UPDATE employees SET
            name = ?1, gender = ?2, dob = ?3, department = ?4,
            position = ?5, status = ?6, contact = ?7, email = ?8, address = ?9
         WHERE employee_id = ?10",
        params![
            emp.name,
            emp.gender,
            emp.dob,
            emp.department,
            emp.position,
            emp.status,
            emp.contact,
            emp.email,
            emp.address,
            id,
        ],
    )?;

    if changed == 0 {
        bail!("Employee {} not found", id);
    }

    info!(id, name = %emp.name, "employee updated");
    Ok(())
}

/// Returns false when there was nothing to delete
pub fn delete_employee(conn: &Connection, id: EmployeeId) -> Result<bool> {
    let removed = conn.execute("DELETE FROM employees WHERE employee_id = ?1", params![id])?;

    if removed > 0 {
        info!(id, "employee deleted");
    }
    Ok(removed > 0)
}

pub fn get_employee(conn: &Connection, id: EmployeeId) -> Result<Option<Employee>> {
    let emp = conn
        .query_row(
            &format!("SELECT {} FROM employees WHERE employee_id = ?1", EMPLOYEE_COLUMNS),
            params![id],
            row_to_employee,
        )
        .optional()?;

    Ok(emp)
}

pub fn get_all_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM employees ORDER BY name ASC",
        EMPLOYEE_COLUMNS
    ))?;

    let employees = stmt
        .query_map([], row_to_employee)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(employees)
}

/// Substring match on name, department or position. Empty query lists everything.
pub fn search_employees(conn: &Connection, query: &str) -> Result<Vec<Employee>> {
    if query.is_empty() {
        return get_all_employees(conn);
    }

    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM employees
         WHERE name LIKE ?1 OR department LIKE ?1 OR position LIKE ?1
         ORDER BY name ASC",
        EMPLOYEE_COLUMNS
    ))?;

    let employees = stmt
        .query_map(params![pattern], row_to_employee)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(employees)
}

pub fn count_employees(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// UNIQUENESS LOOKUPS
// ============================================================================

pub fn fetch_all_names(conn: &Connection, exclude_id: Option<EmployeeId>) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM employees WHERE ?1 IS NULL OR employee_id != ?1",
    )?;

    let names = stmt
        .query_map(params![exclude_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(names)
}

pub fn email_exists(conn: &Connection, email: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM employees
         WHERE LOWER(email) = LOWER(?1) AND (?2 IS NULL OR employee_id != ?2)",
        params![email, exclude_id],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

pub fn contact_exists(conn: &Connection, contact: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM employees
         WHERE contact = ?1 AND (?2 IS NULL OR employee_id != ?2)",
        params![contact, exclude_id],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}
