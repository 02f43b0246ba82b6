//! Resolution strategy engine: bound identifier → endpoints.
//!
//! Three policies share one signature:
//!
//! - **unary**: one `GetReplicas`; `Pending` is returned as-is
//! - **stream**: one `StreamReplicas`, read until the first bound update
//! - **unary then stream**: unary first, subscribe only on `Pending`
//!
//! Each invocation makes a single attempt. Retrying is left to callers.

use futures_util::StreamExt;
use meshname_core::{Endpoint, Path, Strategy};
use tracing::{debug, trace};

use crate::deadline::Deadline;
use crate::error::ResolveError;
use crate::transport::{ReplicaResponse, Resolver};

/// Non-error result of resolving one bound identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The current endpoint set, possibly empty.
    Endpoints(Vec<Endpoint>),
    /// The resolver knows the identifier but has no endpoints for it yet.
    Pending(Path),
}

impl Resolution {
    /// Endpoints, with `Pending` surfaced as [`ResolveError::Pending`].
    pub fn into_endpoints(self) -> Result<Vec<Endpoint>, ResolveError> {
        match self {
            Resolution::Endpoints(endpoints) => Ok(endpoints),
            Resolution::Pending(id) => Err(ResolveError::Pending { id: id.to_string() }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyEngine<R> {
    resolver: R,
}

impl<R: Resolver> StrategyEngine<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolve `id` with the given strategy.
    pub async fn resolve(
        &self,
        strategy: Strategy,
        id: &Path,
        deadline: Deadline,
    ) -> Result<Resolution, ResolveError> {
        match strategy {
            Strategy::UnaryOnly => self.unary(id, deadline).await,
            Strategy::StreamOnly => self.stream(id, deadline).await,
            Strategy::UnaryThenStream => self.unary_then_stream(id, deadline).await,
        }
    }

    pub async fn unary(&self, id: &Path, deadline: Deadline) -> Result<Resolution, ResolveError> {
        let response = deadline
            .within(self.resolver.get_replicas(id, deadline))
            .await??;

        match response {
            ReplicaResponse::Bound(endpoints) => {
                debug!(%id, endpoints = endpoints.len(), "resolved via GetReplicas");
                Ok(Resolution::Endpoints(endpoints))
            }
            ReplicaResponse::Pending => {
                debug!(%id, "GetReplicas reported pending");
                Ok(Resolution::Pending(id.clone()))
            }
            response => Err(ResolveError::UnsupportedReplicas {
                id: id.to_string(),
                response,
            }),
        }
    }

    /// Subscribe to `id` and return the first bound update.
    ///
    /// Updates before it are skipped. The subscription is dropped, and
    /// so closed, as soon as this returns; nothing after the first bound
    /// update is read.
    pub async fn stream(&self, id: &Path, deadline: Deadline) -> Result<Resolution, ResolveError> {
        let mut updates = deadline
            .within(self.resolver.stream_replicas(id, deadline))
            .await??;
        let mut skipped = 0usize;

        loop {
            match deadline.within(updates.next()).await? {
                Some(Ok(ReplicaResponse::Bound(endpoints))) => {
                    debug!(%id, endpoints = endpoints.len(), skipped, "resolved via StreamReplicas");
                    return Ok(Resolution::Endpoints(endpoints));
                }
                Some(Ok(update)) => {
                    skipped += 1;
                    trace!(%id, %update, "skipping replica update without endpoints");
                }
                Some(Err(err)) => return Err(err.into()),
                None => return Err(ResolveError::NoResult { id: id.to_string() }),
            }
        }
    }

    pub async fn unary_then_stream(
        &self,
        id: &Path,
        deadline: Deadline,
    ) -> Result<Resolution, ResolveError> {
        match self.unary(id, deadline).await? {
            Resolution::Pending(_) => {
                debug!(%id, "falling back to StreamReplicas");
                self.stream(id, deadline).await
            }
            resolved => Ok(resolved),
        }
    }
}
