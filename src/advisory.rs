//! Advisory types
//!
//! An advisory is a short operational notice shown on the dashboard.
//! Every advisory carries one of three severity types:
//! - `Alert`: something is broken right now
//! - `Warning`: something might break soon
//! - `Info`: plain announcements

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Severity of an advisory.
///
/// The set is closed: anything outside these three values is rejected
/// before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryType {
    Info,
    Warning,
    Alert,
}

impl AdvisoryType {
    /// Get the string representation stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryType::Info => "info",
            AdvisoryType::Warning => "warning",
            AdvisoryType::Alert => "alert",
        }
    }

    /// Sort priority: lower sorts first (alert=1, warning=2, info=3)
    pub fn priority(&self) -> u8 {
        match self {
            AdvisoryType::Alert => 1,
            AdvisoryType::Warning => 2,
            AdvisoryType::Info => 3,
        }
    }

    /// Get all advisory types, most severe first
    pub fn all() -> &'static [AdvisoryType] {
        &[AdvisoryType::Alert, AdvisoryType::Warning, AdvisoryType::Info]
    }
}

impl FromStr for AdvisoryType {
    type Err = Error;

    /// Matching is exact: `"Alert"` or `" alert"` are not advisory types.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(AdvisoryType::Info),
            "warning" => Ok(AdvisoryType::Warning),
            "alert" => Ok(AdvisoryType::Alert),
            _ => Err(Error::InvalidAdvisoryType(s.to_string())),
        }
    }
}

impl std::fmt::Display for AdvisoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored advisory.
///
/// Serializes as `{"id": .., "type": .., "message": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Identifier assigned by storage on insert
    pub id: i64,
    /// Severity
    #[serde(rename = "type")]
    pub kind: AdvisoryType,
    /// Free-text description
    pub message: String,
}

impl Advisory {
    pub fn new(id: i64, kind: AdvisoryType, message: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            message: message.into(),
        }
    }
}

/// Sort advisories by severity, most severe first.
///
/// The sort is stable, so advisories of the same type keep the order
/// they were given in (storage returns them by id).
pub fn sort_by_severity(advisories: &mut [Advisory]) {
    advisories.sort_by_key(|advisory| advisory.kind.priority());
}
