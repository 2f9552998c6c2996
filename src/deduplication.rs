// 🔍 Deduplication - Detect near-duplicate employees before a save
// Names: normalized-key match. Email: case-insensitive. Contact: exact.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::db::RecordStore;
use crate::employee::{EmployeeId, Field};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

// ============================================================================
// NAME NORMALIZATION
// ============================================================================

/// Collapse a name to its comparison key.
///
/// Tokens are maximal runs of word characters, lower-cased. Single-character
/// tokens (initials) are dropped when at least one longer token exists,
/// otherwise every token is kept:
///
/// - "J. Dela Cruz" -> "delacruz"
/// - "A B" -> "ab"
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let words: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();

    let descriptive: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() >= 2)
        .collect();

    if descriptive.is_empty() {
        words.concat()
    } else {
        descriptive.concat()
    }
}

// ============================================================================
// DUPLICATE MATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// Which field collided
    pub field: Field,

    /// Candidate value as submitted
    pub value: String,
}

// ============================================================================
// NAME UNIQUENESS
// ============================================================================

/// Answers "is this name already taken?".
///
/// `exclude_id` is the record being edited, so an update that keeps its own
/// name does not collide with itself.
pub trait NameUniquenessChecker {
    fn name_exists(&self, name: &str, exclude_id: Option<EmployeeId>) -> Result<bool>;
}

/// Normalizes every stored name on each call.
/// O(records) per check; fine for one organization's directory.
pub struct LinearScanNameChecker<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> LinearScanNameChecker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        LinearScanNameChecker { store }
    }
}

impl<S: RecordStore + ?Sized> NameUniquenessChecker for LinearScanNameChecker<'_, S> {
    fn name_exists(&self, name: &str, exclude_id: Option<EmployeeId>) -> Result<bool> {
        let target = normalize_name(name);
        if target.is_empty() {
            return Ok(false);
        }

        let existing = self.store.fetch_all_names(exclude_id)?;
        let found = existing.iter().any(|n| normalize_name(n) == target);

        debug!(key = %target, scanned = existing.len(), found, "name uniqueness scan");
        Ok(found)
    }
}

// ============================================================================
// DEDUPLICATION ENGINE
// ============================================================================

/// Runs the three uniqueness checks against a record store
pub struct DeduplicationEngine<'a, S: RecordStore + ?Sized, N: NameUniquenessChecker> {
    store: &'a S,
    names: N,
}

impl<'a, S: RecordStore + ?Sized> DeduplicationEngine<'a, S, LinearScanNameChecker<'a, S>> {
    /// Engine with the linear-scan name checker
    pub fn new(store: &'a S) -> Self {
        DeduplicationEngine {
            store,
            names: LinearScanNameChecker::new(store),
        }
    }
}

impl<'a, S: RecordStore + ?Sized, N: NameUniquenessChecker> DeduplicationEngine<'a, S, N> {
    pub fn with_name_checker(store: &'a S, names: N) -> Self {
        DeduplicationEngine { store, names }
    }

    pub fn check_name(&self, name: &str, exclude_id: Option<EmployeeId>) -> Result<Option<DuplicateMatch>> {
        Ok(self
            .names
            .name_exists(name, exclude_id)?
            .then(|| DuplicateMatch {
                field: Field::Name,
                value: name.to_string(),
            }))
    }

    pub fn check_email(&self, email: &str, exclude_id: Option<EmployeeId>) -> Result<Option<DuplicateMatch>> {
        Ok(self
            .store
            .email_exists(email, exclude_id)?
            .then(|| DuplicateMatch {
                field: Field::Email,
                value: email.to_string(),
            }))
    }

    pub fn check_contact(&self, contact: &str, exclude_id: Option<EmployeeId>) -> Result<Option<DuplicateMatch>> {
        Ok(self
            .store
            .contact_exists(contact, exclude_id)?
            .then(|| DuplicateMatch {
                field: Field::Contact,
                value: contact.to_string(),
            }))
    }

    /// First collision in name, email, contact order
    pub fn find_duplicate(
        &self,
        name: &str,
        email: &str,
        contact: &str,
        exclude_id: Option<EmployeeId>,
    ) -> Result<Option<DuplicateMatch>> {
        if let Some(m) = self.check_name(name, exclude_id)? {
            return Ok(Some(m));
        }
        if let Some(m) = self.check_email(email, exclude_id)? {
            return Ok(Some(m));
        }
        self.check_contact(contact, exclude_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
