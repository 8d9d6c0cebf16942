use anyhow::{Context as _, Result, bail};

use crate::cli::GlobalOpts;
use crate::config::{DOCUMENT_NAME, Document, validation};

/// Run the edit command: open the document in the user's editor, then
/// reload and report validation issues as warnings.
///
/// # Errors
///
/// Returns an error when no editor can be found, the editor exits
/// non-zero, or the edited document no longer parses.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let root = super::resolve_root(global)?;
    let path = root.join(DOCUMENT_NAME);

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    // Editors need the terminal, so this bypasses the capture-everything
    // runner and inherits stdio.
    let status = std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("launch editor '{editor}'"))?;
    if !status.success() {
        bail!("editor '{editor}' exited with failure");
    }

    let doc = Document::load(&path)?;
    for issue in validation::validate(&doc) {
        tracing::warn!("{issue}");
    }
    Ok(())
}
