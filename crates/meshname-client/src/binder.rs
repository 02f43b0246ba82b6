//! Binds a name within a root to bound identifiers.

use meshname_core::Path;
use tracing::debug;

use crate::deadline::Deadline;
use crate::error::{ResolveError, TransportError};
use crate::transport::{BoundTree, Interpreter};

/// Classified result of binding a name.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingOutcome {
    /// The name bound to concrete identifiers.
    Leaf(Vec<Path>),
    /// The naming service recorded that the name does not exist.
    NegativeBinding(Path),
    /// A tree shape the client cannot decompose yet (alt, union, fail, empty).
    Unsupported(BoundTree),
}

impl BindingOutcome {
    /// Classify an interpreter response for `name`.
    pub fn classify(name: &Path, tree: BoundTree) -> Self {
        match tree {
            BoundTree::Leaf { id, .. } => BindingOutcome::Leaf(vec![id]),
            BoundTree::Neg => BindingOutcome::NegativeBinding(name.clone()),
            other => BindingOutcome::Unsupported(other),
        }
    }

    /// Identifiers eligible for resolution; any other outcome is an error.
    pub fn into_identifiers(self) -> Result<Vec<Path>, ResolveError> {
        match self {
            BindingOutcome::Leaf(ids) => Ok(ids),
            BindingOutcome::NegativeBinding(name) => Err(ResolveError::NegativeBinding {
                name: name.to_string(),
            }),
            BindingOutcome::Unsupported(tree) => Err(ResolveError::UnsupportedTree { tree }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binder<I> {
    interpreter: I,
}

impl<I: Interpreter> Binder<I> {
    pub fn new(interpreter: I) -> Self {
        Self { interpreter }
    }

    /// Bind `name` within `root` with a single interpreter call.
    ///
    /// Transport failures, deadline expiry included, are returned as
    /// errors before any classification happens.
    pub async fn bind(
        &self,
        root: &Path,
        name: &Path,
        deadline: Deadline,
    ) -> Result<BindingOutcome, TransportError> {
        let tree = deadline
            .within(self.interpreter.get_bound_tree(root, name, deadline))
            .await??;

        debug!(%root, %name, kind = tree.kind(), "bound name");
        Ok(BindingOutcome::classify(name, tree))
    }
}
