//! Service version reports
//!
//! A version report is one observation of a service running a given
//! version in a given environment. Reports are append-only; the registry
//! folds them into a `name -> env -> version` map where the most recently
//! inserted report for a (name, env) pair wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated view: service name -> environment -> version
pub type ServiceVersions = BTreeMap<String, BTreeMap<String, String>>;

/// A stored version report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReport {
    /// Identifier assigned by storage; increases with insertion order
    pub id: i64,
    pub name: String,
    pub env: String,
    pub version: String,
}

impl VersionReport {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        env: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            env: env.into(),
            version: version.into(),
        }
    }
}

/// Fold reports into the per-service view.
///
/// Reports must be given in insertion order; later entries overwrite
/// earlier ones for the same (name, env).
pub fn aggregate<I>(reports: I) -> ServiceVersions
where
    I: IntoIterator<Item = VersionReport>,
{
    let mut services = ServiceVersions::new();
    for report in reports {
        services
            .entry(report.name)
            .or_default()
            .insert(report.env, report.version);
    }
    services
}
