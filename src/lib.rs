pub mod evaluator;
pub mod intern;
pub mod model;
pub mod pseudos;
pub mod runtime;
mod scanner;
pub mod simple_node;

pub use evaluator::{
    RESERVED_ID, matches, matches_with, resolve, resolve_first, resolve_first_with, resolve_with,
};
pub use model::{CompactString, IndexLookup, NodeKind, TreeNode};
pub use pseudos::default_pseudo_registry;
pub use runtime::{Error, PseudoHandler, PseudoRegistry, QueryContext, QueryContextBuilder};
pub use simple_node::{SimpleNode, SimpleNodeBuilder, comment, doc, elem, text};
