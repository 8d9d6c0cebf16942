//! Thin subcommand orchestration over the library layers.
pub mod add;
pub mod edit;
pub mod select;
pub mod sync;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};

use crate::cli::GlobalOpts;
use crate::config::DOCUMENT_NAME;

/// Resolve the machine-config root from CLI arguments or the environment.
///
/// # Errors
///
/// Returns an error when no root can be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(root) = &global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var("RIGUP_ROOT") {
        return Ok(PathBuf::from(root));
    }

    let cwd = std::env::current_dir().context("read current directory")?;
    if cwd.join(DOCUMENT_NAME).exists() {
        return Ok(cwd);
    }

    bail!("cannot determine config root. Use --root or set RIGUP_ROOT")
}

/// The home directory; its absence is process-fatal.
///
/// # Errors
///
/// Returns an error when the platform reports no home directory.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("cannot determine home directory")
}
