//! Target resolution: turn a target name into a flat, deduplicated,
//! ordered list of concrete executors.
//!
//! Bundles are expanded depth-first in preorder — a bundle's members are
//! spliced in place of the bundle itself. Bad references and undecodable
//! specs are collected rather than raised, so one run names every problem.
//! Bundle self-reference (direct or transitive) is detected with an
//! explicit in-progress name set and reported as a cycle instead of
//! recursing unbounded.

use std::collections::HashSet;

use crate::config::Document;
use crate::error::{ErrorList, Phase, ResolveError};
use crate::executors::{self, Executor};

/// Resolve `target` against the document.
///
/// The returned list preserves selection order; when a name is reached
/// more than once (directly or through bundles), only its first
/// occurrence is kept.
///
/// # Errors
///
/// Returns an [`ErrorList`] naming every unknown reference, decode
/// failure and bundle cycle found during expansion. An unknown target is
/// reported the same way.
pub fn resolve(doc: &Document, target: &str) -> Result<Vec<Executor>, ErrorList> {
    let mut errors = ErrorList::new();

    let Some(selection) = doc.targets.get(target) else {
        errors.push(
            target,
            Phase::Resolve,
            ResolveError::UnknownTarget(target.to_string()).into(),
        );
        return Err(errors);
    };

    let mut flat = Vec::new();
    let mut expanding = Vec::new();
    expand(doc, selection, &mut expanding, &mut flat, &mut errors);

    let deduplicated = dedup_first_seen(flat);
    if errors.has_any() {
        Err(errors)
    } else {
        Ok(deduplicated)
    }
}

/// Expand one selection list, splicing bundle members in place.
///
/// `expanding` holds the chain of bundle names currently being expanded,
/// outermost first; hitting a name already on it is a cycle.
fn expand(
    doc: &Document,
    names: &[String],
    expanding: &mut Vec<String>,
    out: &mut Vec<Executor>,
    errors: &mut ErrorList,
) {
    for name in names {
        let Some((kind, params)) = doc.lookup(name) else {
            errors.push(
                name.clone(),
                Phase::Resolve,
                ResolveError::Referential(name.clone()).into(),
            );
            continue;
        };

        let executor = match executors::decode_kind(name, kind, params) {
            Ok(executor) => executor,
            Err(e) => {
                errors.push(name.clone(), Phase::Resolve, e.into());
                continue;
            }
        };

        match executor {
            Executor::Bundle(bundle) => {
                if expanding.iter().any(|open| open == name) {
                    let chain = expanding
                        .iter()
                        .map(String::as_str)
                        .chain(std::iter::once(name.as_str()))
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    errors.push(
                        name.clone(),
                        Phase::Resolve,
                        ResolveError::CyclicBundle(chain).into(),
                    );
                    continue;
                }
                expanding.push(name.clone());
                expand(doc, &bundle.spec.members, expanding, out, errors);
                expanding.pop();
            }
            concrete => out.push(concrete),
        }
    }
}

/// Drop later duplicates, keeping each name's first-encountered position.
fn dedup_first_seen(flat: Vec<Executor>) -> Vec<Executor> {
    let mut seen: HashSet<String> = HashSet::new();
    flat.into_iter()
        .filter(|executor| seen.insert(executor.name().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Document;

    fn doc(text: &str) -> Document {
        Document::parse(text).expect("test document must parse")
    }

    fn names(executors: &[Executor]) -> Vec<&str> {
        executors.iter().map(Executor::name).collect()
    }

    #[test]
    fn resolves_plain_selection_in_order() {
        let doc = doc(
            r#"
            [packages.git]
            [packages.curl]
            [targets]
            box = ["curl", "git"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["curl", "git"]);
    }

    #[test]
    fn unknown_target_is_an_error() {
        let doc = doc("[packages.git]\n");
        let errors = resolve(&doc, "mainframe").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("target 'mainframe' is not defined"));
    }

    #[test]
    fn bundle_members_spliced_in_place() {
        let doc = doc(
            r#"
            [packages.git]
            [packages.curl]
            [packages.jq]
            [bundles.base]
            members = ["curl", "jq"]
            [targets]
            box = ["git", "base"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["git", "curl", "jq"]);
    }

    #[test]
    fn nested_bundles_expand_depth_first() {
        let doc = doc(
            r#"
            [packages.a]
            [packages.b]
            [packages.c]
            [bundles.inner]
            members = ["b"]
            [bundles.outer]
            members = ["a", "inner", "c"]
            [targets]
            box = ["outer"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicates_keep_first_seen_position() {
        let doc = doc(
            r#"
            [packages.shared]
            [packages.x]
            [packages.y]
            [bundles.one]
            members = ["shared", "x"]
            [bundles.two]
            members = ["y", "shared"]
            [targets]
            box = ["one", "two"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["shared", "x", "y"]);
    }

    #[test]
    fn direct_selection_duplicate_dropped() {
        let doc = doc(
            r#"
            [packages.git]
            [packages.curl]
            [targets]
            box = ["git", "curl", "git"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["git", "curl"]);
    }

    #[test]
    fn undeclared_reference_named_in_error() {
        let doc = doc(
            r#"
            [packages.git]
            [targets]
            box = ["git", "ghost"]
            "#,
        );
        let errors = resolve(&doc, "box").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("'ghost' is not a declared executor"));
    }

    #[test]
    fn every_bad_reference_reported_in_one_run() {
        let doc = doc(
            r#"
            [packages.git]
            [files.broken]
            source = "only"
            [targets]
            box = ["ghost1", "git", "broken", "ghost2"]
            "#,
        );
        let errors = resolve(&doc, "box").unwrap_err();
        assert_eq!(errors.len(), 3);
        let text = errors.to_string();
        assert!(text.contains("ghost1"));
        assert!(text.contains("broken"));
        assert!(text.contains("ghost2"));
    }

    #[test]
    fn self_referencing_bundle_is_a_cycle() {
        let doc = doc(
            r#"
            [bundles.loop]
            members = ["loop"]
            [targets]
            box = ["loop"]
            "#,
        );
        let errors = resolve(&doc, "box").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("bundle cycle detected: loop -> loop"));
    }

    #[test]
    fn transitive_bundle_cycle_names_the_chain() {
        let doc = doc(
            r#"
            [bundles.a]
            members = ["b"]
            [bundles.b]
            members = ["a"]
            [targets]
            box = ["a"]
            "#,
        );
        let errors = resolve(&doc, "box").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn same_bundle_twice_is_not_a_cycle() {
        let doc = doc(
            r#"
            [packages.git]
            [bundles.base]
            members = ["git"]
            [targets]
            box = ["base", "base"]
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert_eq!(names(&resolved), vec!["git"]);
    }

    #[test]
    fn empty_selection_resolves_empty() {
        let doc = doc(
            r#"
            [targets]
            box = []
            "#,
        );
        let resolved = resolve(&doc, "box").unwrap();
        assert!(resolved.is_empty());
    }
}
