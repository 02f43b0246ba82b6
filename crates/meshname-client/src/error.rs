//! Client error types.

use thiserror::Error;

use crate::transport::{BoundTree, ReplicaResponse};

/// Failures of the channel to the naming service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("rpc failed ({code}): {message}")]
    Rpc { code: String, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Errors surfaced by binding and resolution.
///
/// `NegativeBinding` and `Pending` are expected naming outcomes rather
/// than failures; callers decide whether either is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("negative binding: {name}")]
    NegativeBinding { name: String },

    #[error("resolution pending: {id}")]
    Pending { id: String },

    #[error("unsupported bound tree: {tree}")]
    UnsupportedTree { tree: BoundTree },

    #[error("unsupported replicas response for {id}: {response}")]
    UnsupportedReplicas { id: String, response: ReplicaResponse },

    #[error("replica stream for {id} ended without a bound update")]
    NoResult { id: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ResolveError {
    pub fn is_negative_binding(&self) -> bool {
        matches!(self, ResolveError::NegativeBinding { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ResolveError::Transport(_))
    }
}
