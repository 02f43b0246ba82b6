//! Naming service collaborators.
//!
//! The interpreter binds names; the resolver turns bound identifiers
//! into replicas. Implementations own the wire protocol and connection;
//! the client only issues calls through these traits.

use std::fmt;
use std::future::Future;

use futures_core::Stream;
use meshname_core::{Endpoint, Path};

use crate::deadline::Deadline;
use crate::error::TransportError;

/// A bound name tree as returned by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundTree {
    /// The name is known not to exist.
    Neg,
    Fail,
    Empty,
    /// A concrete identifier, plus the part of the name it did not consume.
    Leaf { id: Path, residual: Path },
    Alt(Vec<BoundTree>),
    Union(Vec<WeightedTree>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTree {
    pub weight: f64,
    pub tree: BoundTree,
}

impl BoundTree {
    pub fn leaf(id: Path) -> Self {
        BoundTree::Leaf {
            id,
            residual: Path::empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BoundTree::Neg => "neg",
            BoundTree::Fail => "fail",
            BoundTree::Empty => "empty",
            BoundTree::Leaf { .. } => "leaf",
            BoundTree::Alt(_) => "alt",
            BoundTree::Union(_) => "union",
        }
    }
}

/// Name-tree notation: `~` neg, `!` fail, `$` empty, `a | b` alt,
/// `0.5*a & 0.5*b` union.
impl fmt::Display for BoundTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundTree::Neg => f.write_str("~"),
            BoundTree::Fail => f.write_str("!"),
            BoundTree::Empty => f.write_str("$"),
            BoundTree::Leaf { id, residual } if residual.is_empty() => write!(f, "{id}"),
            BoundTree::Leaf { id, residual } => write!(f, "{id}{residual}"),
            BoundTree::Alt(trees) => {
                for (i, tree) in trees.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{tree}")?;
                }
                Ok(())
            }
            BoundTree::Union(weighted) => {
                for (i, w) in weighted.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{}*{}", w.weight, w.tree)?;
                }
                Ok(())
            }
        }
    }
}

/// A resolver answer for one bound identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaResponse {
    /// The identifier is bound to this endpoint set, possibly empty.
    Bound(Vec<Endpoint>),
    /// The identifier is known but its endpoints are not computed yet.
    Pending,
    Neg,
    Failed(String),
    /// The response carried no result the client understands.
    Unrecognized,
}

impl fmt::Display for ReplicaResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicaResponse::Bound(endpoints) => write!(f, "bound({} endpoints)", endpoints.len()),
            ReplicaResponse::Pending => f.write_str("pending"),
            ReplicaResponse::Neg => f.write_str("neg"),
            ReplicaResponse::Failed(message) => write!(f, "failed: {message}"),
            ReplicaResponse::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

/// Name → bound tree.
pub trait Interpreter {
    fn get_bound_tree(
        &self,
        root: &Path,
        name: &Path,
        deadline: Deadline,
    ) -> impl Future<Output = Result<BoundTree, TransportError>> + Send;
}

/// Bound identifier → replicas, as a single answer or a subscription.
pub trait Resolver {
    /// Replica updates for one identifier. Dropping it closes the
    /// subscription.
    type ReplicaStream: Stream<Item = Result<ReplicaResponse, TransportError>> + Unpin + Send;

    fn get_replicas(
        &self,
        id: &Path,
        deadline: Deadline,
    ) -> impl Future<Output = Result<ReplicaResponse, TransportError>> + Send;

    fn stream_replicas(
        &self,
        id: &Path,
        deadline: Deadline,
    ) -> impl Future<Output = Result<Self::ReplicaStream, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::read(s).unwrap()
    }

    #[test]
    fn display_leaf_and_alt() {
        let tree = BoundTree::Alt(vec![
            BoundTree::leaf(path("/#/io.l5d.fs/foo")),
            BoundTree::Neg,
        ]);
        assert_eq!(tree.to_string(), "/#/io.l5d.fs/foo | ~");
    }

    #[test]
    fn display_leaf_with_residual() {
        let tree = BoundTree::Leaf {
            id: path("/#/io.l5d.fs/foo"),
            residual: path("/bar"),
        };
        assert_eq!(tree.to_string(), "/#/io.l5d.fs/foo/bar");
    }

    #[test]
    fn display_union() {
        let tree = BoundTree::Union(vec![
            WeightedTree {
                weight: 0.25,
                tree: BoundTree::leaf(path("/#/a")),
            },
            WeightedTree {
                weight: 0.75,
                tree: BoundTree::Fail,
            },
        ]);
        assert_eq!(tree.to_string(), "0.25*/#/a & 0.75*!");
        assert_eq!(tree.kind(), "union");
    }

    #[test]
    fn display_replica_responses() {
        assert_eq!(ReplicaResponse::Bound(vec![]).to_string(), "bound(0 endpoints)");
        assert_eq!(ReplicaResponse::Failed("boom".into()).to_string(), "failed: boom");
    }
}
