//! Built-in pseudo-classes.
//!
//! Predicates test one candidate at a time; positionals see the whole
//! candidate ordering and rebuild the result set, which is the only way
//! position-relative semantics exist in this engine. The registry returned
//! here is what [`crate::runtime::QueryContext::default`] wires in; callers
//! can extend a copy before freezing it behind an `Arc`.

use crate::evaluator::{matches_with, resolve_with};
use crate::model::{NodeKind, TreeNode};
use crate::runtime::{Error, PseudoHandler, PseudoRegistry};

fn require_arg<'a>(arg: Option<&'a str>, name: &str) -> Result<&'a str, Error> {
    arg.ok_or_else(|| Error::Syntax(format!(":{name}()")))
}

fn is_hidden<N: TreeNode>(node: &N) -> bool {
    node.display().is_some_and(|d| d.eq_ignore_ascii_case("none"))
}

fn is_form_control<N: TreeNode>(node: &N) -> bool {
    node.tag_name()
        .is_some_and(|t| matches!(t.as_str(), "input" | "select" | "textarea" | "button"))
}

pub fn default_pseudo_registry<N: TreeNode + 'static>() -> PseudoRegistry<N> {
    let mut reg = PseudoRegistry::new();

    reg.register_predicate("empty", |_, node: &N, _| {
        Ok(node
            .children()
            .iter()
            .all(|c| !matches!(c.kind(), NodeKind::Element | NodeKind::Text)))
    });

    reg.register_predicate("contains", |_, node, arg| {
        let needle = require_arg(arg, "contains")?;
        Ok(node.text_content().contains(needle))
    });

    reg.register_predicate("hidden", |_, node, _| Ok(is_hidden(node)));
    reg.register_predicate("visible", |_, node, _| Ok(!is_hidden(node)));

    reg.register_predicate("not", |ctx, node, arg| {
        let selector = require_arg(arg, "not")?;
        Ok(!matches_with(node, selector, ctx)?)
    });

    reg.register_predicate("has", |ctx, node, arg| {
        let selector = require_arg(arg, "has")?;
        Ok(!resolve_with(selector, node, ctx)?.is_empty())
    });

    reg.register_predicate("selected", |_, node, _| Ok(node.attribute("selected").is_some()));
    reg.register_predicate("checked", |_, node, _| Ok(node.attribute("checked").is_some()));
    reg.register_predicate("enabled", |_, node, _| {
        Ok(is_form_control(node) && node.attribute("disabled").is_none())
    });
    reg.register_predicate("disabled", |_, node, _| {
        Ok(is_form_control(node) && node.attribute("disabled").is_some())
    });
    reg.register_predicate("input", |_, node, _| Ok(is_form_control(node)));

    reg.register_predicate("target", |ctx, node: &N, _| {
        let Some(fragment) = ctx.fragment.as_deref() else {
            return Ok(false);
        };
        let identity = node.attribute("id").or_else(|| node.attribute("name"));
        Ok(identity.as_deref() == Some(fragment))
    });

    reg.register_predicate("only-child", |_, node: &N, _| {
        let Some(parent) = node.parent() else {
            return Ok(false);
        };
        Ok(parent
            .children()
            .iter()
            .filter(|c| c.kind() == NodeKind::Element)
            .all(|c| c == node))
    });

    reg.register_positional("first-child", |_, _, src, dst| {
        if let Some(node) = src.first() {
            dst.push(node.clone());
        }
        Ok(())
    });

    reg.register_positional("last-child", |_, _, src, dst| {
        if let Some(node) = src.last() {
            dst.push(node.clone());
        }
        Ok(())
    });

    reg.register_positional("odd", |_, _, src, dst| {
        dst.extend(src.iter().skip(1).step_by(2).cloned());
        Ok(())
    });

    reg.register_positional("even", |_, _, src, dst| {
        dst.extend(src.iter().step_by(2).cloned());
        Ok(())
    });

    reg.register_positional("nth-child", |ctx, arg, src, dst| {
        let Some(arg) = arg else {
            return Ok(());
        };
        // nth-child(odd) and friends defer to the named positional filter
        if let Ok(PseudoHandler::Positional(inner)) = ctx.pseudos.resolve(arg) {
            return inner(ctx, None, src, dst);
        }
        if let Ok(index) = arg.trim().parse::<usize>() {
            if index >= 1 {
                if let Some(node) = src.get(index - 1) {
                    dst.push(node.clone());
                }
            }
        }
        Ok(())
    });

    reg
}
