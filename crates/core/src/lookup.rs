//! Case lookup contract.
//!
//! The dashboard searches district and high courts by CNR and the Supreme
//! Court by diary number and year. Remote clients plug in behind
//! [`CaseLookup`]; this module owns query validation and a fixture-backed
//! implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::case::CaseDetails;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// CNR layout: state code, court complex, district code, filing year,
/// registration number.
const CNR_PATTERN: &str = r"^[A-Z0-9]{2}[A-Z0-9]{2}[0-9]{2}[0-9]{4}[0-9]{7}$";

static CNR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(CNR_PATTERN).expect("valid regex"));

/// Court name attached to every Supreme Court result.
pub const SUPREME_COURT_NAME: &str = "Supreme Court of India";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalize a user-entered CNR: trim and upper-case.
pub fn normalize_cnr(cnr: &str) -> String {
    cnr.trim().to_ascii_uppercase()
}

/// Whether `cnr` (after normalization) is a well-formed CNR.
pub fn is_valid_cnr(cnr: &str) -> bool {
    CNR_RE.is_match(&normalize_cnr(cnr))
}

fn validate_cnr(cnr: &str) -> Result<(), CoreError> {
    if is_valid_cnr(cnr) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid CNR '{cnr}'. Expected the format XXCGDDYYYYNNNNNNN"
        )))
    }
}

fn validate_diary(diary_number: &str, year: &str) -> Result<(), CoreError> {
    let diary = diary_number.trim();
    if diary.is_empty() || !diary.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Invalid diary number '{diary_number}'. Must be numeric"
        )));
    }
    let year = year.trim();
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Invalid year '{year}'. Must be a 4-digit year"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A case search against one of the three court sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseQuery {
    District { cnr: String },
    High { cnr: String },
    Supreme { diary_number: String, year: String },
}

impl CaseQuery {
    /// Check the query is well-formed before it reaches a lookup backend.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            CaseQuery::District { cnr } | CaseQuery::High { cnr } => validate_cnr(cnr),
            CaseQuery::Supreme { diary_number, year } => validate_diary(diary_number, year),
        }
    }

    /// Lookup key: the normalized CNR, or `diary/year`.
    pub fn key(&self) -> String {
        match self {
            CaseQuery::District { cnr } | CaseQuery::High { cnr } => normalize_cnr(cnr),
            CaseQuery::Supreme { diary_number, year } => {
                format!("{}/{}", diary_number.trim(), year.trim())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup trait
// ---------------------------------------------------------------------------

/// Source of case details for a validated query.
#[async_trait]
pub trait CaseLookup: Send + Sync {
    async fn lookup(&self, query: &CaseQuery) -> Result<CaseDetails, CoreError>;
}

/// Lookup backed by a fixed table of cases keyed by [`CaseQuery::key`].
#[derive(Debug, Clone, Default)]
pub struct StaticCaseLookup {
    cases: HashMap<String, CaseDetails>,
}

impl StaticCaseLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a fixture.
    pub fn with_case(mut self, key: impl Into<String>, details: CaseDetails) -> Self {
        self.cases.insert(key.into(), details);
        self
    }

    /// Load fixtures from a JSON object of `key -> CaseDetails`.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Lookup(format!("Cannot read fixtures {}: {e}", path.display()))
        })?;
        let cases: HashMap<String, CaseDetails> = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Lookup(format!("Invalid fixtures {}: {e}", path.display()))
        })?;
        Ok(Self { cases })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[async_trait]
impl CaseLookup for StaticCaseLookup {
    async fn lookup(&self, query: &CaseQuery) -> Result<CaseDetails, CoreError> {
        query.validate()?;

        let key = query.key();
        let mut details = self
            .cases
            .get(&key)
            .cloned()
            .ok_or(CoreError::NotFound { entity: "Case", id: key })?;

        if matches!(query, CaseQuery::Supreme { .. }) {
            details.court_name = SUPREME_COURT_NAME.to_string();
        }
        Ok(details)
    }
}
