//! Whole-document validation pass.
//!
//! Runs before any execution and never stops at the first problem. Two
//! rules are enforced here: executor-name uniqueness across the union of
//! all kind tables, and each executor's own structural checks.
//!
//! Referential integrity — target and bundle references resolving to
//! declared names — is deliberately *not* checked here; it surfaces at
//! resolution time ([`crate::resolve`]). A document can therefore pass
//! `validate` and still fail to resolve.

use thiserror::Error;

use super::Document;
use crate::error::DecodeError;
use crate::executors::{self, Kind};

/// One problem found by the validation pass.
#[derive(Error, Debug)]
pub enum ValidationIssue {
    /// The same name is declared by more than one kind table.
    #[error("duplicate name '{name}': declared as {}", join_kinds(.kinds))]
    DuplicateName {
        /// The colliding name.
        name: String,
        /// Every kind declaring it.
        kinds: Vec<Kind>,
    },

    /// A spec failed to decode into its kind's shape.
    #[error(transparent)]
    Decode(DecodeError),

    /// A decoded executor failed its own structural check.
    #[error("{kind} '{name}': {message}")]
    Structural {
        /// Executor name.
        name: String,
        /// Executor kind.
        kind: Kind,
        /// Failure description from the executor.
        message: String,
    },
}

fn join_kinds(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Validate the whole document, aggregating every issue.
#[must_use]
pub fn validate(doc: &Document) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut reported_duplicates: Vec<&str> = Vec::new();

    for (kind, table) in doc.kind_tables() {
        for (name, params) in table {
            let kinds = doc.declared_kinds(name);
            if kinds.len() > 1 && !reported_duplicates.contains(&name.as_str()) {
                reported_duplicates.push(name);
                issues.push(ValidationIssue::DuplicateName {
                    name: name.clone(),
                    kinds,
                });
            }

            match executors::decode_kind(name, kind, params) {
                Err(error) => issues.push(ValidationIssue::Decode(error)),
                Ok(executor) => {
                    for message in executor.validate() {
                        issues.push(ValidationIssue::Structural {
                            name: name.clone(),
                            kind,
                            message,
                        });
                    }
                }
            }
        }
    }

    issues
}
