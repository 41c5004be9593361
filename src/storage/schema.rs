//! Database schema definitions

/// SQL to create the advisories table
pub const CREATE_ADVISORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS advisories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL CHECK (type IN ('info', 'warning', 'alert')),
    message TEXT NOT NULL
)
"#;

/// SQL to create the versions table
/// Rows are observations, so (name, env) is deliberately not unique
pub const CREATE_VERSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    env TEXT NOT NULL,
    version TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_advisories_type ON advisories(type)",
    "CREATE INDEX IF NOT EXISTS idx_versions_name ON versions(name)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_ADVISORIES_TABLE, CREATE_VERSIONS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
