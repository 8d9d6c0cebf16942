//! Render-time template substitution for config file sources.
//!
//! The language is deliberately small: three variables and a target-set
//! conditional.
//!
//! ```text
//! {{target}}                    current target name
//! {{home}}                      home directory path
//! {{modules}}                   checked-out modules directory path
//! {{#target a b}} ... {{/target}}   body only when the target is one of a, b
//! {{^target a b}} ... {{/target}}   body only when it is not
//! ```
//!
//! Sections may nest. The closing tag is written exactly `{{/target}}`.

use thiserror::Error;

/// Variables available during a render pass.
#[derive(Debug, Clone)]
pub struct Vars {
    /// Current target name.
    pub target: String,
    /// Home directory path.
    pub home: String,
    /// Modules directory path.
    pub modules: String,
}

/// Errors from rendering a template.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` without a matching `}}`.
    #[error("unterminated template tag")]
    UnterminatedTag,

    /// A section tag without a matching `{{/target}}`.
    #[error("unclosed section '{0}'")]
    UnclosedSection(String),

    /// A `{{/target}}` with no open section.
    #[error("unexpected section close")]
    UnexpectedSectionClose,

    /// A variable tag that is not one of target/home/modules.
    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    /// A section tag whose keyword is not `target`.
    #[error("unknown section '{0}'")]
    UnknownSection(String),
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const SECTION_CLOSE: &str = "{{/target}}";

/// Render `input` with the given variables.
///
/// # Errors
///
/// Returns a [`TemplateError`] on malformed tags or unknown variables; the
/// engine treats any render error as that file's failure.
pub fn render(input: &str, vars: &Vars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let end = rest.find(CLOSE).ok_or(TemplateError::UnterminatedTag)?;
        let tag = rest[OPEN.len()..end].trim().to_string();
        let after_tag = &rest[end + CLOSE.len()..];

        if let Some(section) = tag.strip_prefix('#') {
            let (body, remainder) = split_section(after_tag, &tag)?;
            if in_target_set(section, vars)? {
                out.push_str(&render(body, vars)?);
            }
            rest = remainder;
        } else if let Some(section) = tag.strip_prefix('^') {
            let (body, remainder) = split_section(after_tag, &tag)?;
            if !in_target_set(section, vars)? {
                out.push_str(&render(body, vars)?);
            }
            rest = remainder;
        } else if tag.starts_with('/') {
            return Err(TemplateError::UnexpectedSectionClose);
        } else {
            out.push_str(lookup(&tag, vars)?);
            rest = after_tag;
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Evaluate a `target a b c` section head against the current target.
fn in_target_set(section: &str, vars: &Vars) -> Result<bool, TemplateError> {
    let mut words = section.split_whitespace();
    match words.next() {
        Some("target") => Ok(words.any(|name| name == vars.target)),
        _ => Err(TemplateError::UnknownSection(section.trim().to_string())),
    }
}

fn lookup<'a>(name: &str, vars: &'a Vars) -> Result<&'a str, TemplateError> {
    match name {
        "target" => Ok(&vars.target),
        "home" => Ok(&vars.home),
        "modules" => Ok(&vars.modules),
        other => Err(TemplateError::UnknownVariable(other.to_string())),
    }
}

/// Split `input` into the body of the innermost open section and the text
/// after its matching `{{/target}}`, accounting for nested sections.
fn split_section<'a>(input: &'a str, tag: &str) -> Result<(&'a str, &'a str), TemplateError> {
    let mut depth = 1usize;
    let mut idx = 0usize;

    loop {
        let Some(pos) = input[idx..].find(OPEN) else {
            return Err(TemplateError::UnclosedSection(tag.to_string()));
        };
        let abs = idx + pos;
        let ahead = &input[abs..];
        if ahead.starts_with(SECTION_CLOSE) {
            depth -= 1;
            if depth == 0 {
                return Ok((&input[..abs], &input[abs + SECTION_CLOSE.len()..]));
            }
            idx = abs + SECTION_CLOSE.len();
        } else if ahead.starts_with("{{#") || ahead.starts_with("{{^") {
            depth += 1;
            idx = abs + OPEN.len();
        } else {
            idx = abs + OPEN.len();
        }
    }
}
