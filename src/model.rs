pub use compact_str::CompactString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

/// Outcome of an indexed lookup offered by a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLookup<T> {
    /// The tree keeps no such index; the engine falls back to a subtree scan.
    Unsupported,
    /// The index was consulted and produced these hits.
    Found(T),
}

/// The tree access port consumed by the selector engine.
///
/// Nodes are cheap handles into an externally-owned tree: cloning a node
/// clones the handle, never the tree, and equality is node identity. The
/// engine holds handles only for the duration of a single `resolve`/`matches`
/// call and performs no mutation beyond the scoped temporary id described on
/// [`crate::matches`].
///
/// Back-references (`parent`, siblings) are navigation only; implementations
/// must not treat them as ownership.
pub trait TreeNode: Clone + PartialEq + Eq + core::fmt::Debug {
    fn kind(&self) -> NodeKind;

    /// Tag name in ASCII lowercase; `None` for non-element nodes.
    fn tag_name(&self) -> Option<CompactString>;

    fn parent(&self) -> Option<Self>;

    /// All child nodes (any kind) in document order.
    fn children(&self) -> Vec<Self>;

    /// Attribute value, or `None` when the attribute is absent. Names compare
    /// ASCII-case-insensitively.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Set an attribute. The engine itself only ever writes the reserved
    /// scoped id during `matches`.
    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    /// Concatenated text content of the subtree (the text itself for text
    /// and comment nodes).
    fn text_content(&self) -> String;

    fn next_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.children();
        let pos = siblings.iter().position(|s| s == self)?;
        siblings.into_iter().nth(pos + 1)
    }

    fn prev_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let siblings = parent.children();
        let pos = siblings.iter().position(|s| s == self)?;
        if pos == 0 { None } else { siblings.into_iter().nth(pos - 1) }
    }

    /// Indexed id lookup rooted at this node. Trees backed by a
    /// document-global index must either verify containment or answer
    /// `Unsupported` for non-root nodes. The engine re-verifies the id
    /// attribute of every hit, so an index that also matches `name`
    /// attributes (as some legacy primitives do) is tolerated.
    fn find_by_id(&self, _id: &str) -> IndexLookup<Option<Self>> {
        IndexLookup::Unsupported
    }

    /// Indexed class-bucket lookup rooted at this node, document order.
    fn find_by_class(&self, _name: &str) -> IndexLookup<Vec<Self>> {
        IndexLookup::Unsupported
    }

    /// Indexed tag lookup rooted at this node, document order. The engine
    /// passes the tag in ASCII lowercase.
    fn find_by_tag(&self, _tag: &str) -> IndexLookup<Vec<Self>> {
        IndexLookup::Unsupported
    }

    /// Computed display value used by `:hidden`/`:visible`. The default reads
    /// the inline `style` attribute; embedders with a real style engine
    /// should override.
    fn display(&self) -> Option<String> {
        let style = self.attribute("style")?;
        for declaration in style.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                if property.trim().eq_ignore_ascii_case("display") {
                    return Some(value.trim().to_string());
                }
            }
        }
        None
    }
}
