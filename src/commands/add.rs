use anyhow::{Result, bail};
use toml::{Table, Value};

use crate::cli::{AddOpts, GlobalOpts};
use crate::config::{DOCUMENT_NAME, Document};
use crate::error::DecodeError;
use crate::exec::SystemRunner;
use crate::executors::{self, Kind};
use crate::vcs::{GitVcs, Vcs as _};

/// Run the add command: declare a new executor and persist the document.
///
/// The spec is decoded through the registry before insertion so bad kinds
/// and malformed parameters are rejected up front.
///
/// # Errors
///
/// Returns an error on unknown kinds, malformed parameters, name clashes,
/// or document I/O failures.
pub fn run(global: &GlobalOpts, opts: &AddOpts) -> Result<()> {
    let root = super::resolve_root(global)?;
    let doc_path = root.join(DOCUMENT_NAME);
    let mut doc = Document::load(&doc_path)?;

    let kind = Kind::from_tag(&opts.kind)
        .ok_or_else(|| DecodeError::UnsupportedType(opts.kind.clone()))?;
    let params = parse_params(&opts.params, kind)?;

    let executor = executors::decode_kind(&opts.name, kind, &params)?;
    let issues = executor.validate();
    if !issues.is_empty() {
        bail!("invalid {kind} '{}': {}", opts.name, issues.join("; "));
    }

    doc.insert(kind, &opts.name, params)?;
    doc.save(&doc_path)?;
    tracing::info!("added {kind} '{}'", opts.name);

    if GitVcs::is_repository(&root) {
        let runner = SystemRunner;
        if let Err(e) = GitVcs::new(&root, &runner).push(&format!("rigup: add {}", opts.name)) {
            tracing::warn!("document saved but not pushed: {e:#}");
        }
    }
    Ok(())
}

/// Turn `key=value` arguments into a parameter table.
///
/// Values are strings, except a bundle's `members`, which splits on commas
/// into an array.
fn parse_params(pairs: &[String], kind: Kind) -> Result<Table> {
    let mut params = Table::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("parameter '{pair}' is not of the form key=value");
        };
        let value = if kind == Kind::Bundle && key == "members" {
            Value::Array(
                value
                    .split(',')
                    .filter(|member| !member.is_empty())
                    .map(|member| Value::String(member.to_string()))
                    .collect(),
            )
        } else {
            Value::String(value.to_string())
        };
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
