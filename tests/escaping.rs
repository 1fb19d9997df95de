use rstest::{fixture, rstest};
use siftdom::simple_node::{doc, elem};
use siftdom::{SimpleNode, TreeNode, resolve};

#[fixture]
fn root() -> SimpleNode {
    doc()
        .child(
            elem("body")
                .child(elem("div").attr("id", "dots").attr("class", "a.b"))
                .child(elem("div").attr("id", "123"))
                .child(elem("div").attr("id", "a:b"))
                .child(elem("div").attr("id", "plain").attr("data-k", "a.b").attr("data-h", "AZ")),
        )
        .build()
}

fn ids(nodes: &[SimpleNode]) -> Vec<String> {
    nodes.iter().map(|n| n.attribute("id").unwrap_or_default()).collect()
}

#[rstest]
fn backslash_escapes_punctuation_in_class_names(root: SimpleNode) {
    assert_eq!(ids(&resolve(r".a\.b", &root).unwrap()), vec!["dots"]);
    assert!(resolve(".a", &root).unwrap().is_empty());
}

#[rstest]
fn hex_escapes_decode_to_code_points(root: SimpleNode) {
    // \31 is `1`, the space terminates the escape
    assert_eq!(ids(&resolve(r"#\31 23", &root).unwrap()), vec!["123"]);
}

#[rstest]
fn hex_escapes_work_in_tag_names(root: SimpleNode) {
    // \64 is `d`
    assert_eq!(resolve(r"\64 iv", &root).unwrap(), resolve("div", &root).unwrap());
}

#[rstest]
fn escapes_decode_inside_bare_attribute_values(root: SimpleNode) {
    assert_eq!(ids(&resolve(r"div[data-k=a\.b]", &root).unwrap()), vec!["plain"]);
    assert_eq!(ids(&resolve(r"div[data-h=\41 Z]", &root).unwrap()), vec!["plain"]);
}

#[rstest]
fn single_char_escapes_are_literal(root: SimpleNode) {
    assert_eq!(ids(&resolve(r"#a\:b", &root).unwrap()), vec!["a:b"]);
}
