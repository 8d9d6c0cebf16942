use anyhow::{Result, bail};

use crate::cli::GlobalOpts;
use crate::config::{DOCUMENT_NAME, Document, validation};

/// Run the validate command.
///
/// Checks name uniqueness and each executor's structural shape. Target and
/// bundle references are *not* checked here; they surface when a target is
/// resolved during sync.
///
/// # Errors
///
/// Returns an error when the document cannot be loaded or any validation
/// issue was found.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let root = super::resolve_root(global)?;
    let doc = Document::load(&root.join(DOCUMENT_NAME))?;

    let issues = validation::validate(&doc);
    if issues.is_empty() {
        tracing::info!("document is valid");
        return Ok(());
    }

    for issue in &issues {
        tracing::error!("{issue}");
    }
    bail!(
        "{} validation issue{} found",
        issues.len(),
        if issues.len() == 1 { "" } else { "s" }
    )
}
