//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors ([`DecodeError`], [`ResolveError`],
//! [`DetectError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator. Passes that must
//! surface *every* problem in one run ([`crate::resolve`], [`crate::sync`])
//! accumulate failures into an [`ErrorList`] instead of stopping at the
//! first.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from decoding a raw named spec into a typed executor.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The kind tag is not one of the closed executor set.
    #[error("unsupported executor kind '{0}'")]
    UnsupportedType(String),

    /// The parameter table does not match the kind's shape.
    #[error("invalid parameters for {kind} '{name}': {source}")]
    InvalidParams {
        /// Name of the executor being decoded.
        name: String,
        /// Kind tag the parameters were decoded against.
        kind: &'static str,
        /// Underlying structural mismatch.
        #[source]
        source: toml::de::Error,
    },
}

/// Errors from resolving a target name into a flat executor list.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The requested target is not present in the document.
    #[error("target '{0}' is not defined")]
    UnknownTarget(String),

    /// A selection or bundle references a name no executor declares.
    #[error("'{0}' is not a declared executor")]
    Referential(String),

    /// A bundle references itself, directly or transitively.
    #[error("bundle cycle detected: {0}")]
    CyclicBundle(String),
}

/// Errors from release-asset auto-detection.
#[derive(Error, Debug)]
pub enum DetectError {
    /// A user-supplied override pattern failed to compile.
    #[error("invalid asset pattern '{pattern}': {source}")]
    BadPattern {
        /// The pattern as configured.
        pattern: String,
        /// Regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// The override pattern matched no asset.
    #[error("asset pattern '{0}' matched no assets")]
    NoPatternMatch(String),

    /// The override pattern matched more than one asset.
    #[error("asset pattern '{pattern}' matched {count} assets")]
    AmbiguousPatternMatch {
        /// The pattern as configured.
        pattern: String,
        /// Number of assets it matched.
        count: usize,
    },

    /// A filter stage eliminated every remaining candidate.
    #[error("no asset survived the {stage} filter")]
    DetectionFailed {
        /// Name of the stage that failed.
        stage: &'static str,
    },

    /// Every stage ran and more than one candidate survived.
    #[error("cannot choose between assets: {}", .candidates.join(", "))]
    AmbiguousAsset {
        /// Names of the surviving assets.
        candidates: Vec<String>,
    },
}

/// Errors from the render & symlink engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The destination exists as an unmanaged file and force was not given.
    #[error("refusing to replace unmanaged file: {}", .0.display())]
    Conflict(PathBuf),
}

/// The phase in which a recorded failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Target resolution / bundle expansion.
    Resolve,
    /// Whole-document validation.
    Validate,
    /// Executor execution during sync.
    Execute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Validate => write!(f, "validate"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// One recorded failure: the executor (or reference) it concerns, the phase
/// it occurred in, and the underlying cause.
#[derive(Debug)]
pub struct Failure {
    /// Executor or referenced name the failure concerns.
    pub name: String,
    /// Phase the failure occurred in.
    pub phase: Phase,
    /// Underlying cause.
    pub error: anyhow::Error,
}

/// Ordered collection of failures accumulated across a whole pass.
///
/// Resolution, validation and execution never stop at the first problem;
/// they push every failure here so one run reports the complete picture.
#[derive(Debug, Default)]
pub struct ErrorList {
    failures: Vec<Failure>,
}

impl ErrorList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, name: impl Into<String>, phase: Phase, error: anyhow::Error) {
        self.failures.push(Failure {
            name: name.into(),
            phase,
            error,
        });
    }

    /// Whether any failure has been recorded.
    #[must_use]
    pub fn has_any(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Iterate over recorded failures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.failures.iter()
    }

    /// Convert into a `Result`: `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_any() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} step{} failed:",
            self.failures.len(),
            if self.failures.len() == 1 { "" } else { "s" }
        )?;
        for failure in &self.failures {
            writeln!(
                f,
                "  {} ({}): {:#}",
                failure.name, failure.phase, failure.error
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
