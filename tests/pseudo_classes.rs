use std::sync::Arc;

use rstest::{fixture, rstest};
use siftdom::simple_node::{comment, doc, elem, text};
use siftdom::{
    Error, QueryContextBuilder, SimpleNode, TreeNode, default_pseudo_registry, resolve, resolve_with,
};

#[fixture]
fn root() -> SimpleNode {
    doc()
        .child(
            elem("body")
                .child(
                    elem("ul")
                        .attr("id", "list")
                        .child(elem("li").attr("id", "l1"))
                        .child(elem("li").attr("id", "l2").attr("data-marked", "1"))
                        .child(elem("li").attr("id", "l3"))
                        .child(elem("li").attr("id", "l4"))
                        .child(elem("li").attr("id", "l5")),
                )
                .child(
                    elem("div")
                        .attr("id", "forms")
                        .child(elem("input").attr("id", "inp1").attr("type", "radio").attr("checked", "checked"))
                        .child(elem("input").attr("id", "inp2").attr("disabled", "disabled"))
                        .child(elem("select").attr("id", "sel").child(elem("option").attr("id", "opt").attr("selected", "selected")))
                        .child(elem("textarea").attr("id", "ta"))
                        .child(elem("button").attr("id", "btn"))
                        .child(elem("div").attr("id", "plain")),
                )
                .child(elem("div").attr("id", "hid").attr("style", "display: none"))
                .child(elem("div").attr("id", "vis"))
                .child(elem("p").attr("id", "lone").child(elem("span").attr("id", "only")))
                .child(
                    elem("div")
                        .attr("id", "texts")
                        .child(elem("p").attr("id", "t1").child(text("hello world")))
                        .child(elem("p").attr("id", "t2").child(text("goodbye"))),
                )
                .child(
                    elem("div")
                        .attr("id", "voids")
                        .child(elem("p").attr("id", "v1"))
                        .child(elem("p").attr("id", "v2").child(comment("note")))
                        .child(elem("p").attr("id", "v3").child(text("x"))),
                ),
        )
        .build()
}

fn ids(nodes: &[SimpleNode]) -> Vec<String> {
    nodes.iter().map(|n| n.attribute("id").unwrap_or_default()).collect()
}

#[rstest]
fn positional_filters_on_the_candidate_list(root: SimpleNode) {
    assert_eq!(ids(&resolve("li:first-child", &root).unwrap()), vec!["l1"]);
    assert_eq!(ids(&resolve("li:last-child", &root).unwrap()), vec!["l5"]);
    assert_eq!(ids(&resolve("li:nth-child(3)", &root).unwrap()), vec!["l3"]);
    assert!(resolve("li:nth-child(0)", &root).unwrap().is_empty());
    assert!(resolve("li:nth-child(99)", &root).unwrap().is_empty());
    assert!(resolve("li:nth-child(froz)", &root).unwrap().is_empty());
}

#[rstest]
fn nth_child_one_equals_first_child(root: SimpleNode) {
    let list = resolve("#list", &root).unwrap().remove(0);
    assert_eq!(
        resolve(":nth-child(1)", &list).unwrap(),
        resolve(":first-child", &list).unwrap()
    );
}

#[rstest]
fn odd_and_even_use_zero_based_positions(root: SimpleNode) {
    assert_eq!(ids(&resolve("li:odd", &root).unwrap()), vec!["l2", "l4"]);
    assert_eq!(ids(&resolve("li:even", &root).unwrap()), vec!["l1", "l3", "l5"]);
}

#[rstest]
fn nth_child_delegates_named_arguments(root: SimpleNode) {
    assert_eq!(
        resolve("li:nth-child(odd)", &root).unwrap(),
        resolve("li:odd", &root).unwrap()
    );
    assert_eq!(
        resolve("li:nth-child(even)", &root).unwrap(),
        resolve("li:even", &root).unwrap()
    );
}

#[rstest]
fn empty_ignores_comments_but_not_text(root: SimpleNode) {
    assert_eq!(ids(&resolve("#voids p:empty", &root).unwrap()), vec!["v1", "v2"]);
}

#[rstest]
fn contains_tests_text_content(root: SimpleNode) {
    assert_eq!(ids(&resolve("p:contains(hello)", &root).unwrap()), vec!["t1"]);
    assert_eq!(ids(&resolve("p:contains('hello world')", &root).unwrap()), vec!["t1"]);
    assert_eq!(ids(&resolve("#texts p:contains(o)", &root).unwrap()), vec!["t1", "t2"]);
}

#[rstest]
fn not_negates_a_nested_selector(root: SimpleNode) {
    assert_eq!(ids(&resolve("#forms input:not([disabled])", &root).unwrap()), vec!["inp1"]);
    assert_eq!(ids(&resolve("#texts p:not(:contains(goodbye))", &root).unwrap()), vec!["t1"]);
}

#[rstest]
fn has_resolves_scoped_to_the_candidate(root: SimpleNode) {
    assert_eq!(ids(&resolve("p:has(span)", &root).unwrap()), vec!["lone"]);
    assert_eq!(ids(&resolve("div:has(input)", &root).unwrap()), vec!["forms"]);
}

#[rstest]
fn form_state_pseudos(root: SimpleNode) {
    assert_eq!(ids(&resolve(":input", &root).unwrap()), vec!["inp1", "inp2", "sel", "ta", "btn"]);
    assert_eq!(ids(&resolve(":enabled", &root).unwrap()), vec!["inp1", "sel", "ta", "btn"]);
    assert_eq!(ids(&resolve(":disabled", &root).unwrap()), vec!["inp2"]);
    assert_eq!(ids(&resolve(":checked", &root).unwrap()), vec!["inp1"]);
    assert_eq!(ids(&resolve("option:selected", &root).unwrap()), vec!["opt"]);
}

#[rstest]
fn hidden_and_visible_consult_the_display_state(root: SimpleNode) {
    assert_eq!(ids(&resolve("div:hidden", &root).unwrap()), vec!["hid"]);
    let visible = resolve("div:visible", &root).unwrap();
    assert!(visible.iter().all(|n| n.attribute("id").as_deref() != Some("hid")));
    assert!(visible.iter().any(|n| n.attribute("id").as_deref() == Some("vis")));
}

#[rstest]
fn target_compares_against_the_context_fragment(root: SimpleNode) {
    let ctx = QueryContextBuilder::new().with_fragment("l3").build();
    assert_eq!(ids(&resolve_with("li:target", &root, &ctx).unwrap()), vec!["l3"]);
    // without a fragment nothing is the target
    assert!(resolve("li:target", &root).unwrap().is_empty());
}

#[rstest]
fn only_child(root: SimpleNode) {
    assert_eq!(ids(&resolve("span:only-child", &root).unwrap()), vec!["only"]);
    assert!(resolve("li:only-child", &root).unwrap().is_empty());
}

#[rstest]
fn unknown_pseudo_class_is_an_error(root: SimpleNode) {
    assert_eq!(
        resolve("li:frobnicate", &root),
        Err(Error::UnknownPseudoClass("frobnicate".into()))
    );
}

#[rstest]
fn nested_selector_pseudos_require_an_argument(root: SimpleNode) {
    assert!(matches!(resolve("p:not", &root), Err(Error::Syntax(_))));
    assert!(matches!(resolve("p:has", &root), Err(Error::Syntax(_))));
}

#[rstest]
fn custom_pseudo_classes_are_dispatched(root: SimpleNode) {
    let mut registry = default_pseudo_registry::<SimpleNode>();
    registry.register_predicate("marked", |_, node, _| Ok(node.attribute("data-marked").is_some()));
    registry.register_positional("second", |_, _, src, dst| {
        if let Some(node) = src.get(1) {
            dst.push(node.clone());
        }
        Ok(())
    });
    let ctx = QueryContextBuilder::new().with_pseudos(Arc::new(registry)).build();
    assert_eq!(ids(&resolve_with("li:marked", &root, &ctx).unwrap()), vec!["l2"]);
    assert_eq!(ids(&resolve_with("li:second", &root, &ctx).unwrap()), vec!["l2"]);
}
