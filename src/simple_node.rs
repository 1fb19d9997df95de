//! Simple Arc-backed in-memory tree implementing [`TreeNode`], for tests and
//! quick prototypes.
//!
//! Node identity is pointer identity. The builder wires parent links when
//! `build` runs, so trees read naturally top-down:
//!
//! ```
//! use siftdom::simple_node::{doc, elem, text};
//! use siftdom::{TreeNode, resolve};
//!
//! // <div id="r"><p class="note">Hello</p><p/></div>
//! let root = doc()
//!     .child(
//!         elem("div")
//!             .attr("id", "r")
//!             .child(elem("p").attr("class", "note").child(text("Hello")))
//!             .child(elem("p")),
//!     )
//!     .build();
//!
//! let notes = resolve(".note", &root).unwrap();
//! assert_eq!(notes.len(), 1);
//! assert_eq!(notes[0].text_content(), "Hello");
//! ```
//!
//! The id and tag lookups answer through the indexed port methods (emulated
//! with scans); the class lookup stays unsupported so the engine's scan
//! fallback is exercised, mirroring trees without a class index.

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use compact_str::CompactString;
use string_cache::DefaultAtom;

use crate::intern::{intern_attr_name, intern_tag};
use crate::model::{IndexLookup, NodeKind, TreeNode};

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    tag: Option<DefaultAtom>,
    value: RwLock<Option<String>>, // text / comment content
    parent: RwLock<Option<Weak<Inner>>>,
    attributes: RwLock<Vec<(DefaultAtom, String)>>,
    children: RwLock<Vec<SimpleNode>>,
}

#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("tag", &self.0.tag)
            .finish_non_exhaustive()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, tag: Option<DefaultAtom>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            tag,
            value: RwLock::new(value),
            parent: RwLock::new(None),
            attributes: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None, None)
    }

    pub fn element(tag: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(intern_tag(tag)), None)
    }

    pub fn text(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Text, None, Some(value.to_string()))
    }

    pub fn comment(value: &str) -> SimpleNode {
        SimpleNode::new(NodeKind::Comment, None, Some(value.to_string()))
    }

    fn scan<F: FnMut(&SimpleNode)>(&self, visit: &mut F) {
        for child in self.children() {
            if child.kind() == NodeKind::Element {
                visit(&child);
            }
            child.scan(visit);
        }
    }
}

pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<(DefaultAtom, String)>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, tag: Option<DefaultAtom>, value: Option<String>) -> Self {
        Self { node: SimpleNode::new(kind, tag, value), pending_children: Vec::new(), pending_attrs: Vec::new() }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.pending_attrs.push((intern_attr_name(name), value.to_string()));
        self
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        match child.into() {
            SimpleNodeOrBuilder::Built(n) => self.pending_children.push(n),
            SimpleNodeOrBuilder::Builder(b) => self.pending_children.push(b.build()),
        }
        self
    }

    pub fn build(self) -> SimpleNode {
        if let Ok(mut attrs) = self.node.0.attributes.write() {
            attrs.extend(self.pending_attrs);
        }
        if let Ok(mut children) = self.node.0.children.write() {
            for child in &self.pending_children {
                if let Ok(mut parent) = child.0.parent.write() {
                    *parent = Some(Arc::downgrade(&self.node.0));
                }
            }
            children.extend(self.pending_children);
        }
        self.node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helpers for concise test trees.
pub fn elem(tag: &str) -> SimpleNodeBuilder {
    SimpleNode::element(tag)
}
pub fn text(value: &str) -> SimpleNode {
    SimpleNode::text(value)
}
pub fn comment(value: &str) -> SimpleNode {
    SimpleNode::comment(value)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl TreeNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn tag_name(&self) -> Option<CompactString> {
        self.0.tag.as_ref().map(|t| CompactString::from(t.as_ref()))
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.read().ok()?.as_ref()?.upgrade().map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        let key = intern_attr_name(name);
        self.0
            .attributes
            .read()
            .ok()?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let key = intern_attr_name(name);
        if let Ok(mut attrs) = self.0.attributes.write() {
            if let Some(slot) = attrs.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value.to_string();
            } else {
                attrs.push((key, value.to_string()));
            }
        }
    }

    fn remove_attribute(&self, name: &str) {
        let key = intern_attr_name(name);
        if let Ok(mut attrs) = self.0.attributes.write() {
            attrs.retain(|(k, _)| *k != key);
        }
    }

    fn text_content(&self) -> String {
        match self.kind() {
            NodeKind::Text | NodeKind::Comment => {
                self.0.value.read().map(|v| v.clone().unwrap_or_default()).unwrap_or_default()
            }
            NodeKind::Element | NodeKind::Document => {
                let mut out = String::new();
                fn dfs(node: &SimpleNode, out: &mut String) {
                    for child in node.children() {
                        if child.kind() == NodeKind::Text {
                            out.push_str(&child.text_content());
                        } else {
                            dfs(&child, out);
                        }
                    }
                }
                dfs(self, &mut out);
                out
            }
        }
    }

    fn find_by_id(&self, id: &str) -> IndexLookup<Option<Self>> {
        let mut hit = None;
        self.scan(&mut |node| {
            if hit.is_none() && node.attribute("id").as_deref() == Some(id) {
                hit = Some(node.clone());
            }
        });
        IndexLookup::Found(hit)
    }

    fn find_by_tag(&self, tag: &str) -> IndexLookup<Vec<Self>> {
        let atom = intern_tag(tag);
        let mut hits = Vec::new();
        self.scan(&mut |node| {
            if node.0.tag.as_ref() == Some(&atom) {
                hits.push(node.clone());
            }
        });
        IndexLookup::Found(hits)
    }
}
