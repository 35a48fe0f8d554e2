//! Table definition for the candidate store.
//!
//! The store has exactly one table and it is never migrated: the statement
//! is idempotent and runs on every open.

/// Candidate table, four untyped text columns, no keys.
pub(crate) const CREATE_CV_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS cv_table (name TEXT, github TEXT, cv_filename TEXT, status TEXT)";
