use anyhow::Result;

use crate::cli::{GlobalOpts, SelectOpts};
use crate::config::{DOCUMENT_NAME, Document};
use crate::exec::SystemRunner;
use crate::vcs::{GitVcs, Vcs as _};

/// Run the use command: select an executor for a target.
///
/// # Errors
///
/// Returns an error when the name is undeclared or the document cannot be
/// persisted.
pub fn run_use(global: &GlobalOpts, opts: &SelectOpts) -> Result<()> {
    mutate(global, opts, |doc| doc.select(&opts.target, &opts.name), "use")
}

/// Run the cease command: remove an executor from a target's selection.
///
/// # Errors
///
/// Returns an error when the target does not select the name or the
/// document cannot be persisted.
pub fn run_cease(global: &GlobalOpts, opts: &SelectOpts) -> Result<()> {
    mutate(global, opts, |doc| doc.deselect(&opts.target, &opts.name), "cease")
}

fn mutate(
    global: &GlobalOpts,
    opts: &SelectOpts,
    change: impl FnOnce(&mut Document) -> Result<()>,
    verb: &str,
) -> Result<()> {
    let root = super::resolve_root(global)?;
    let doc_path = root.join(DOCUMENT_NAME);
    let mut doc = Document::load(&doc_path)?;

    change(&mut doc)?;
    doc.save(&doc_path)?;
    tracing::info!("{verb} {} for target '{}'", opts.name, opts.target);

    if GitVcs::is_repository(&root) {
        let runner = SystemRunner;
        let message = format!("rigup: {verb} {} ({})", opts.name, opts.target);
        if let Err(e) = GitVcs::new(&root, &runner).push(&message) {
            tracing::warn!("document saved but not pushed: {e:#}");
        }
    }
    Ok(())
}
