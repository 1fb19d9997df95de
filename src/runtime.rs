use std::collections::HashMap;
use std::sync::Arc;

use compact_str::CompactString;
use thiserror::Error as ThisError;

use crate::model::TreeNode;

/// Error raised while resolving a selector. All variants are fatal for the
/// current call; no partial result set is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// The cursor could not advance. Carries the unconsumed remainder of the
    /// selector, starting at the offending token.
    #[error("invalid or illegal selector near `{0}`")]
    Syntax(String),

    /// A `:name` filter referenced a pseudo-class that is not registered.
    #[error("unknown pseudo-class `{0}`")]
    UnknownPseudoClass(String),

    /// An attribute test used an operator outside the supported set.
    #[error("unsupported attribute operator `{0}`")]
    InvalidOperator(String),
}

impl Error {
    /// The selector substring this error is about.
    pub fn offending(&self) -> &str {
        match self {
            Self::Syntax(s) | Self::UnknownPseudoClass(s) | Self::InvalidOperator(s) => s,
        }
    }

    pub(crate) fn syntax(rest: &str) -> Self {
        Self::Syntax(rest.to_string())
    }
}

/// Per-node pseudo-class test, evaluated independently for every candidate.
pub type PredicateImpl<N> =
    Arc<dyn Fn(&QueryContext<N>, &N, Option<&str>) -> Result<bool, Error> + Send + Sync>;

/// List-aware pseudo-class transform, evaluated once per filter application
/// with the full candidate ordering; the output list becomes the new result
/// set.
pub type PositionalImpl<N> =
    Arc<dyn Fn(&QueryContext<N>, Option<&str>, &[N], &mut Vec<N>) -> Result<(), Error> + Send + Sync>;

/// A registry entry. The two variants have deliberately distinct signatures;
/// position-relative semantics are only expressible through `Positional`.
pub enum PseudoHandler<N> {
    Predicate(PredicateImpl<N>),
    Positional(PositionalImpl<N>),
}

impl<N> Clone for PseudoHandler<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Predicate(f) => Self::Predicate(Arc::clone(f)),
            Self::Positional(f) => Self::Positional(Arc::clone(f)),
        }
    }
}

/// Name → handler table for `:pseudo` filters. Populated once (usually via
/// [`crate::pseudos::default_pseudo_registry`]), then shared read-only behind
/// an `Arc` in a [`QueryContext`].
pub struct PseudoRegistry<N> {
    entries: HashMap<CompactString, PseudoHandler<N>>,
}

impl<N> Default for PseudoRegistry<N> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<N> PseudoRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_predicate<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&QueryContext<N>, &N, Option<&str>) -> Result<bool, Error> + Send + Sync + 'static,
    {
        self.entries
            .insert(CompactString::from(name), PseudoHandler::Predicate(Arc::new(f)));
    }

    pub fn register_positional<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&QueryContext<N>, Option<&str>, &[N], &mut Vec<N>) -> Result<(), Error>
            + Send
            + Sync
            + 'static,
    {
        self.entries
            .insert(CompactString::from(name), PseudoHandler::Positional(Arc::new(f)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&PseudoHandler<N>, Error> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownPseudoClass(name.to_string()))
    }
}

/// Everything a resolution call needs besides the tree itself: the
/// pseudo-class registry and the environment state some pseudo-classes
/// consult (`:target` compares against `fragment`).
pub struct QueryContext<N> {
    pub pseudos: Arc<PseudoRegistry<N>>,
    pub fragment: Option<String>,
}

impl<N> Clone for QueryContext<N> {
    fn clone(&self) -> Self {
        Self { pseudos: Arc::clone(&self.pseudos), fragment: self.fragment.clone() }
    }
}

impl<N: TreeNode + 'static> Default for QueryContext<N> {
    fn default() -> Self {
        Self { pseudos: Arc::new(crate::pseudos::default_pseudo_registry()), fragment: None }
    }
}

pub struct QueryContextBuilder<N> {
    ctx: QueryContext<N>,
}

impl<N: TreeNode + 'static> Default for QueryContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: TreeNode + 'static> QueryContextBuilder<N> {
    pub fn new() -> Self {
        Self { ctx: QueryContext::default() }
    }

    /// Replace the pseudo-class registry, e.g. with one extended by custom
    /// pseudo-classes.
    pub fn with_pseudos(mut self, registry: Arc<PseudoRegistry<N>>) -> Self {
        self.ctx.pseudos = registry;
        self
    }

    /// Location fragment `:target` compares identities against.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.ctx.fragment = Some(fragment.into());
        self
    }

    pub fn build(self) -> QueryContext<N> {
        self.ctx
    }
}
