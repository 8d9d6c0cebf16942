//! Bundle executor: a named union of other executors.
use serde::{Deserialize, Serialize};

/// Parameters for a bundle executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleSpec {
    /// Executor names this bundle stands for, in order.
    pub members: Vec<String>,
}

/// A bundle performs no work itself; resolution splices its members in
/// place (depth-first, preorder) and deduplicates the result.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub name: String,
    pub spec: BundleSpec,
}

impl Bundle {
    pub(super) fn validate(&self) -> Vec<String> {
        self.spec
            .members
            .iter()
            .filter(|member| member.trim().is_empty())
            .map(|_| "member names must not be empty".to_string())
            .collect()
    }
}
