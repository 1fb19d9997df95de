//! Staged selector interpretation.
//!
//! Resolution consumes the selector string one grammatical unit at a time and
//! immediately narrows the current result set: fast path for the leading
//! simple selector, then alternating combinator steps and filter chains until
//! the group is exhausted; a top-level comma restarts from the original scope
//! and appends. Result sets keep insertion order and are never deduplicated.

use smallvec::SmallVec;
use tracing::trace;

use crate::model::{IndexLookup, NodeKind, TreeNode};
use crate::runtime::{Error, PseudoHandler, QueryContext};
use crate::scanner::{AttrOp, Combinator, Filter, Scanner, Simple};

/// Reserved identity value assigned by the scoped-id guard in [`matches`].
pub const RESERVED_ID: &str = "__siftdom__";

/// Resolve `selector` against the subtree rooted at `scope`, with the default
/// pseudo-class registry. Returns the matching nodes in resolution order;
/// never fails with an empty selector and never returns partial results on
/// error.
pub fn resolve<N: TreeNode + 'static>(selector: &str, scope: &N) -> Result<Vec<N>, Error> {
    resolve_with(selector, scope, &QueryContext::default())
}

/// [`resolve`] with an explicit context (custom pseudo-classes, location
/// fragment).
pub fn resolve_with<N: TreeNode>(
    selector: &str,
    scope: &N,
    ctx: &QueryContext<N>,
) -> Result<Vec<N>, Error> {
    trace!(selector, "resolve");
    resolve_on(selector.trim(), core::slice::from_ref(scope), ctx)
}

/// First match only, or `None`.
pub fn resolve_first<N: TreeNode + 'static>(selector: &str, scope: &N) -> Result<Option<N>, Error> {
    resolve_first_with(selector, scope, &QueryContext::default())
}

pub fn resolve_first_with<N: TreeNode>(
    selector: &str,
    scope: &N,
    ctx: &QueryContext<N>,
) -> Result<Option<N>, Error> {
    Ok(resolve_with(selector, scope, ctx)?.into_iter().next())
}

/// Does `node` match `selector`? Uses the default pseudo-class registry.
pub fn matches<N: TreeNode + 'static>(node: &N, selector: &str) -> Result<bool, Error> {
    matches_with(node, selector, &QueryContext::default())
}

/// Membership test against the node's parent subtree, falling back to the
/// tree root for selectors that reach above the parent. While the test runs,
/// a node without an id attribute carries the reserved id [`RESERVED_ID`] so
/// that identity-keyed ports keep a usable key; the attribute is removed
/// again on every exit path, including errors.
pub fn matches_with<N: TreeNode>(node: &N, selector: &str, ctx: &QueryContext<N>) -> Result<bool, Error> {
    if node.kind() != NodeKind::Element {
        return Ok(false);
    }
    trace!(selector, "matches");
    let _guard = ScopedId::ensure(node);
    let selector = selector.trim();
    if let Some(parent) = node.parent() {
        if resolve_on(selector, core::slice::from_ref(&parent), ctx)?.contains(node) {
            return Ok(true);
        }
        let root = tree_root(node);
        if root == parent {
            return Ok(false);
        }
        Ok(resolve_on(selector, core::slice::from_ref(&root), ctx)?.contains(node))
    } else {
        // An orphan node is its own root; resolution scoped to it can never
        // reach it, consistent with membership in resolve(root).
        Ok(resolve_on(selector, core::slice::from_ref(node), ctx)?.contains(node))
    }
}

/// One resolution pass over `selector`, starting from `start`. `start` is
/// also the scope every comma-separated group restarts from.
pub(crate) fn resolve_on<N: TreeNode>(
    selector: &str,
    start: &[N],
    ctx: &QueryContext<N>,
) -> Result<Vec<N>, Error> {
    let mut scanner = Scanner::new(selector);
    let mut result: Vec<N> = start.to_vec();
    let mut in_group = false;

    while !scanner.at_end() {
        let before = scanner.pos();

        // A top-level comma closes the group; the remainder resolves against
        // the original scope and is appended as-is (duplicates preserved).
        if scanner.eat_group_separator() {
            if !in_group {
                return Err(Error::syntax(selector));
            }
            let mut rest = resolve_on(scanner.rest(), start, ctx)?;
            result.append(&mut rest);
            return Ok(result);
        }

        if let Some(simple) = scanner.scan_simple() {
            result = fast_path(&simple, &result);
        } else if let Some((combinator, qualifier)) = scanner.scan_combinator() {
            result = apply_combinator(combinator, qualifier.as_deref(), &result);
        } else if scanner.peek_is_filter() {
            // A group may open directly with a filter; candidates are then
            // every descendant element of the scope.
            result = descendant_elements(&result, None);
        }

        while let Some(filter) = scanner.scan_filter()? {
            result = apply_filter(&filter, result, ctx)?;
        }

        if scanner.pos() == before {
            return Err(Error::syntax(scanner.rest()));
        }
        in_group = true;
    }

    Ok(result)
}

fn tree_root<N: TreeNode>(node: &N) -> N {
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

/// Initial result set for a group: indexed lookup when the port has one,
/// full descendant scan otherwise.
fn fast_path<N: TreeNode>(simple: &Simple, current: &[N]) -> Vec<N> {
    let mut out = Vec::new();
    for node in current {
        match simple {
            Simple::Id(id) => match node.find_by_id(id) {
                IndexLookup::Found(hit) => {
                    // Id lookups may be backed by primitives that also match
                    // name attributes; trust only a literal id.
                    if let Some(hit) = hit {
                        if hit.attribute("id").as_deref() == Some(id.as_str()) {
                            out.push(hit);
                        }
                    }
                }
                IndexLookup::Unsupported => {
                    if let Some(hit) = first_descendant_with_id(node, id) {
                        out.push(hit);
                    }
                }
            },
            Simple::Class(name) => match node.find_by_class(name) {
                IndexLookup::Found(hits) => out.extend(hits),
                IndexLookup::Unsupported => {
                    let mut all = Vec::new();
                    collect_descendants(node, None, &mut all);
                    out.extend(
                        all.into_iter()
                            .filter(|n| attr_matches(n.attribute("class").as_deref(), AttrOp::Includes, name)),
                    );
                }
            },
            Simple::Tag(tag) => {
                let tag = tag.to_ascii_lowercase();
                match node.find_by_tag(&tag) {
                    IndexLookup::Found(hits) => out.extend(hits),
                    IndexLookup::Unsupported => collect_descendants(node, Some(tag.as_str()), &mut out),
                }
            }
            Simple::Universal => collect_descendants(node, None, &mut out),
        }
    }
    out
}

fn first_descendant_with_id<N: TreeNode>(node: &N, id: &str) -> Option<N> {
    for child in node.children() {
        if child.kind() == NodeKind::Element {
            if child.attribute("id").as_deref() == Some(id) {
                return Some(child);
            }
            if let Some(hit) = first_descendant_with_id(&child, id) {
                return Some(hit);
            }
        }
    }
    None
}

fn qualifier_matches<N: TreeNode>(node: &N, qualifier: Option<&str>) -> bool {
    if node.kind() != NodeKind::Element {
        return false;
    }
    match qualifier {
        None | Some("*") => true,
        Some(tag) => node.tag_name().is_some_and(|t| t.eq_ignore_ascii_case(tag)),
    }
}

/// Descendant elements of `node` matching `qualifier`, preorder, self
/// excluded.
fn collect_descendants<N: TreeNode>(node: &N, qualifier: Option<&str>, out: &mut Vec<N>) {
    for child in node.children() {
        if qualifier_matches(&child, qualifier) {
            out.push(child.clone());
        }
        collect_descendants(&child, qualifier, out);
    }
}

fn descendant_elements<N: TreeNode>(current: &[N], qualifier: Option<&str>) -> Vec<N> {
    let mut out = Vec::new();
    for node in current {
        collect_descendants(node, qualifier, &mut out);
    }
    out
}

fn next_element_sibling<N: TreeNode>(node: &N) -> Option<N> {
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        if sibling.kind() == NodeKind::Element {
            return Some(sibling);
        }
        current = sibling.next_sibling();
    }
    None
}

/// Directional step: per-source-node output in natural document order,
/// source nodes in result-set order, no dedup.
fn apply_combinator<N: TreeNode>(combinator: Combinator, qualifier: Option<&str>, current: &[N]) -> Vec<N> {
    let mut out = Vec::new();
    for node in current {
        match combinator {
            Combinator::Descendant => collect_descendants(node, qualifier, &mut out),
            Combinator::Child => {
                out.extend(node.children().into_iter().filter(|c| qualifier_matches(c, qualifier)));
            }
            Combinator::Adjacent => {
                if let Some(sibling) = next_element_sibling(node) {
                    if qualifier_matches(&sibling, qualifier) {
                        out.push(sibling);
                    }
                }
            }
            Combinator::Sibling => {
                let mut current = node.next_sibling();
                while let Some(sibling) = current {
                    if qualifier_matches(&sibling, qualifier) {
                        out.push(sibling.clone());
                    }
                    current = sibling.next_sibling();
                }
            }
            Combinator::Ancestor => {
                let mut chain: SmallVec<[N; 8]> = SmallVec::new();
                let mut current = node.parent();
                while let Some(ancestor) = current {
                    current = ancestor.parent();
                    if qualifier_matches(&ancestor, qualifier) {
                        chain.push(ancestor);
                    }
                }
                out.extend(chain);
            }
        }
    }
    out
}

fn apply_filter<N: TreeNode>(filter: &Filter, current: Vec<N>, ctx: &QueryContext<N>) -> Result<Vec<N>, Error> {
    match filter {
        Filter::Id(id) => Ok(current
            .into_iter()
            .filter(|n| attr_matches(n.attribute("id").as_deref(), AttrOp::Equals, id))
            .collect()),
        Filter::Class(name) => Ok(current
            .into_iter()
            .filter(|n| attr_matches(n.attribute("class").as_deref(), AttrOp::Includes, name))
            .collect()),
        Filter::Attr { name, op, value } => Ok(current
            .into_iter()
            .filter(|n| attr_matches(n.attribute(name).as_deref(), *op, value))
            .collect()),
        Filter::Pseudo { name, arg } => match ctx.pseudos.resolve(name)? {
            PseudoHandler::Predicate(predicate) => {
                let mut out = Vec::with_capacity(current.len());
                for node in current {
                    if predicate(ctx, &node, arg.as_deref())? {
                        out.push(node);
                    }
                }
                Ok(out)
            }
            PseudoHandler::Positional(positional) => {
                let mut out = Vec::new();
                positional(ctx, arg.as_deref(), &current, &mut out)?;
                Ok(out)
            }
        },
    }
}

/// Attribute operator table. An absent attribute satisfies only the negative
/// test against a non-empty expected value.
pub(crate) fn attr_matches(actual: Option<&str>, op: AttrOp, expected: &str) -> bool {
    let Some(actual) = actual else {
        return matches!(op, AttrOp::NotEqual) && !expected.is_empty();
    };
    match op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == expected,
        AttrOp::Includes => includes_token(actual, expected),
        AttrOp::NotEqual => actual != expected,
        AttrOp::DashMatch => {
            actual == expected
                || (actual.len() > expected.len()
                    && actual.starts_with(expected)
                    && actual.as_bytes()[expected.len()] == b'-')
        }
        AttrOp::Prefix => !actual.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !actual.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !actual.is_empty() && actual.contains(expected),
    }
}

/// Whitespace-token membership, with the padded-containment semantics of the
/// `~=` operator (the needle itself may span tokens).
fn includes_token(value: &str, token: &str) -> bool {
    format!(" {value} ").contains(&format!(" {token} "))
}

/// Assigns the reserved id to nodes that lack one, so identity-keyed lookups
/// stay usable for the duration of a `matches` call. The attribute is
/// removed on drop, which runs on every exit path.
struct ScopedId<'a, N: TreeNode> {
    node: &'a N,
    added: bool,
}

impl<'a, N: TreeNode> ScopedId<'a, N> {
    fn ensure(node: &'a N) -> Self {
        let added = node.attribute("id").is_none();
        if added {
            node.set_attribute("id", RESERVED_ID);
        }
        Self { node, added }
    }
}

impl<N: TreeNode> Drop for ScopedId<'_, N> {
    fn drop(&mut self) {
        if self.added {
            self.node.remove_attribute("id");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_operator_table() {
        let v = Some("foo bar");
        assert!(attr_matches(v, AttrOp::Includes, "foo"));
        assert!(!attr_matches(v, AttrOp::Includes, "foobar"));
        assert!(attr_matches(v, AttrOp::Prefix, "foo"));
        assert!(attr_matches(v, AttrOp::Suffix, "bar"));
        assert!(attr_matches(v, AttrOp::Substring, "oob"));
        assert!(attr_matches(v, AttrOp::NotEqual, "baz"));
        assert!(!attr_matches(v, AttrOp::Equals, "foo"));
    }

    #[test]
    fn absent_attribute_only_satisfies_not_equal() {
        for op in [AttrOp::Exists, AttrOp::Equals, AttrOp::Includes, AttrOp::Prefix, AttrOp::Suffix, AttrOp::Substring, AttrOp::DashMatch] {
            assert!(!attr_matches(None, op, "x"));
        }
        assert!(attr_matches(None, AttrOp::NotEqual, "x"));
        assert!(!attr_matches(None, AttrOp::NotEqual, ""));
    }

    #[test]
    fn dash_match_is_exact_or_hyphen_prefixed() {
        assert!(attr_matches(Some("en"), AttrOp::DashMatch, "en"));
        assert!(attr_matches(Some("en-US"), AttrOp::DashMatch, "en"));
        assert!(!attr_matches(Some("ens"), AttrOp::DashMatch, "en"));
    }
}
