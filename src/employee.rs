// 👤 Employee Record - one row of the staff directory
// Identity is the storage-assigned integer; every other field is free text

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage-assigned identifier (SQLite rowid)
pub type EmployeeId = i64;

// ============================================================================
// FIELD CHOICES
// ============================================================================
// Enforced by the front-ends only. Storage accepts any text.

pub const GENDERS: &[&str] = &["MALE", "FEMALE", "OTHERS"];

pub const DEPARTMENTS: &[&str] = &[
    "HR",
    "IT",
    "SALES",
    "FINANCE",
    "MARKETING",
    "OPERATIONS",
    "OTHERS",
];

pub const POSITIONS: &[&str] = &["ADMIN", "MANAGER", "SUPERVISOR", "STAFF", "INTERN", "OTHERS"];

pub const STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "TERMINATED", "ON LEAVE"];

// ============================================================================
// FIELD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Gender,
    Dob,
    Department,
    Position,
    Status,
    Contact,
    Email,
    Address,
}

impl Field {
    /// Form order
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Gender,
        Field::Dob,
        Field::Department,
        Field::Position,
        Field::Status,
        Field::Contact,
        Field::Email,
        Field::Address,
    ];

    /// Short title used in rejection messages ("Dob cannot be empty...")
    pub fn title(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Gender => "Gender",
            Field::Dob => "Dob",
            Field::Department => "Department",
            Field::Position => "Position",
            Field::Status => "Status",
            Field::Contact => "Contact",
            Field::Email => "Email",
            Field::Address => "Address",
        }
    }

    /// Form label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Gender => "Gender",
            Field::Dob => "Date of Birth (YYYY-MM-DD)",
            Field::Department => "Department",
            Field::Position => "Role / Position",
            Field::Status => "Employment Status",
            Field::Contact => "Phone Number",
            Field::Email => "Work Email",
            Field::Address => "Permanent Address",
        }
    }

    /// Fixed value set for choice fields, None for free text
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self {
            Field::Gender => Some(GENDERS),
            Field::Department => Some(DEPARTMENTS),
            Field::Position => Some(POSITIONS),
            Field::Status => Some(STATUSES),
            _ => None,
        }
    }
}

// ============================================================================
// EMPLOYEE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// None until the record store assigns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,

    pub name: String,
    pub gender: String,
    pub dob: String,
    pub department: String,
    pub position: String,
    pub status: String,
    pub contact: String,
    pub email: String,
    pub address: String,
}

impl Employee {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Gender => &self.gender,
            Field::Dob => &self.dob,
            Field::Department => &self.department,
            Field::Position => &self.position,
            Field::Status => &self.status,
            Field::Contact => &self.contact,
            Field::Email => &self.email,
            Field::Address => &self.address,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Gender => &mut self.gender,
            Field::Dob => &mut self.dob,
            Field::Department => &mut self.department,
            Field::Position => &mut self.position,
            Field::Status => &mut self.status,
            Field::Contact => &mut self.contact,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Copy with every text field trimmed
    pub fn trimmed(&self) -> Employee {
        let mut out = self.clone();
        for field in Field::ALL {
            let value = out.get(field).trim().to_string();
            out.set(field, value);
        }
        out
    }

    /// First field that is empty or whitespace only
    pub fn first_blank_field(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| self.get(*f).trim().is_empty())
    }
}

/// Render a stored date of birth for list views ("1995-06-15" -> "June 15 1995").
/// Values that don't parse are shown as stored.
pub fn format_dob(date_str: &str) -> String {
    if date_str.is_empty() {
        return "-".to_string();
    }

    let normalized = date_str.replace('/', "-");
    match NaiveDate::parse_from_str(normalized.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%B %d %Y").to_string(),
        Err(_) => date_str.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_strips_every_field() {
        let emp = Employee {
            name: "  Ana Reyes ".to_string(),
            address: "\tManila\n".to_string(),
            ..Default::default()
        };

        let t = emp.trimmed();
        assert_eq!(t.name, "Ana Reyes");
        assert_eq!(t.address, "Manila");
    }

    #[test]
    fn test_first_blank_field_follows_form_order() {
        let mut emp = Employee::default();
        assert_eq!(emp.first_blank_field(), Some(Field::Name));

        for field in Field::ALL {
            emp.set(field, "x");
        }
        assert_eq!(emp.first_blank_field(), None);

        emp.set(Field::Contact, "   ");
        assert_eq!(emp.first_blank_field(), Some(Field::Contact));
    }

    #[test]
    fn test_format_dob() {
        assert_eq!(format_dob("1995-06-15"), "June 15 1995");
        assert_eq!(format_dob("1995/06/05"), "June 05 1995");
        assert_eq!(format_dob(""), "-");
        assert_eq!(format_dob("sometime in May"), "sometime in May");
    }

    #[test]
    fn test_choice_fields() {
        assert_eq!(Field::Status.choices(), Some(STATUSES));
        assert!(Field::Email.choices().is_none());
        assert!(STATUSES.contains(&"ON LEAVE"));
    }
}
