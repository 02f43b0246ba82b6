//! Resolve orchestrator. Binds a name, then resolves every bound
//! identifier under one shared deadline.

use meshname_core::{ClientOptions, Endpoint, Path, Strategy};
use tracing::{debug, warn};

use crate::binder::{Binder, BindingOutcome};
use crate::deadline::Deadline;
use crate::error::{ResolveError, TransportError};
use crate::strategy::{Resolution, StrategyEngine};
use crate::transport::{Interpreter, Resolver};

/// Endpoints gathered for a name, with the error to report, if any.
///
/// Endpoints from identifiers that resolved are kept even when another
/// identifier failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    pub endpoints: Vec<Endpoint>,
    pub error: Option<ResolveError>,
}

impl ResolveReport {
    fn failed(error: ResolveError) -> Self {
        Self {
            endpoints: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drop partial results in favour of the error, if there is one.
    pub fn into_result(self) -> Result<Vec<Endpoint>, ResolveError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.endpoints),
        }
    }
}

/// Client for binding and resolving names.
///
/// Cheap to clone; holds no mutable state, so one client can serve
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct NameClient<T> {
    binder: Binder<T>,
    engine: StrategyEngine<T>,
    options: ClientOptions,
}

impl<T> NameClient<T>
where
    T: Interpreter + Resolver + Clone,
{
    pub fn new(transport: T, options: ClientOptions) -> Self {
        Self {
            binder: Binder::new(transport.clone()),
            engine: StrategyEngine::new(transport),
            options,
        }
    }

    /// A fresh deadline for one top-level operation.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.options.op_timeout)
    }

    pub async fn bind(&self, root: &Path, name: &Path) -> Result<BindingOutcome, TransportError> {
        self.binder.bind(root, name, self.deadline()).await
    }

    /// Resolve with the strategy from [`ClientOptions`].
    pub async fn resolve_default(&self, root: &Path, name: &Path) -> ResolveReport {
        self.resolve(root, name, self.options.strategy).await
    }

    pub async fn resolve(&self, root: &Path, name: &Path, strategy: Strategy) -> ResolveReport {
        self.resolve_with_deadline(root, name, strategy, self.deadline())
            .await
    }

    /// Bind `name`, then resolve each bound identifier in order.
    ///
    /// Binding failures, negative bindings, and unsupported trees end the
    /// call with no endpoints.
    pub async fn resolve_with_deadline(
        &self,
        root: &Path,
        name: &Path,
        strategy: Strategy,
        deadline: Deadline,
    ) -> ResolveReport {
        let identifiers = match self.binder.bind(root, name, deadline).await {
            Ok(outcome) => match outcome.into_identifiers() {
                Ok(identifiers) => identifiers,
                Err(err) => {
                    debug!(%root, %name, error = %err, "binding did not yield identifiers");
                    return ResolveReport::failed(err);
                }
            },
            Err(err) => return ResolveReport::failed(err.into()),
        };

        let report = self
            .resolve_identifiers(&identifiers, strategy, deadline)
            .await;
        debug!(
            %name,
            identifiers = identifiers.len(),
            endpoints = report.endpoints.len(),
            ok = report.is_ok(),
            "resolve complete"
        );
        report
    }

    /// Resolve already-bound identifiers sequentially, in order.
    ///
    /// Endpoints are concatenated without deduplication. A failure is
    /// logged and the remaining identifiers are still resolved. The
    /// reported error is the outcome of the last identifier, so a later
    /// success clears an earlier failure.
    pub async fn resolve_identifiers(
        &self,
        identifiers: &[Path],
        strategy: Strategy,
        deadline: Deadline,
    ) -> ResolveReport {
        let mut report = ResolveReport::default();
        for id in identifiers {
            let resolved = self
                .engine
                .resolve(strategy, id, deadline)
                .await
                .and_then(Resolution::into_endpoints);

            report.error = match resolved {
                Ok(endpoints) => {
                    report.endpoints.extend(endpoints);
                    None
                }
                Err(err) => {
                    warn!(%id, %strategy, error = %err, "failed to resolve bound identifier");
                    Some(err)
                }
            };
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockTransport, Reply};
    use crate::transport::{BoundTree, ReplicaResponse};
    use std::time::Duration;

    fn path(s: &str) -> Path {
        Path::read(s).unwrap()
    }

    fn ep(s: &str) -> Endpoint {
        s.parse::<std::net::SocketAddr>().unwrap().into()
    }

    fn client(mock: &MockTransport) -> NameClient<MockTransport> {
        NameClient::new(mock.clone(), ClientOptions::default())
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(1))
    }

    // ── scenarios ──────────────────────────────────────────────────

    #[tokio::test]
    async fn unary_only_returns_bound_endpoints() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.replicas(&id, Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:8080")])));

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert_eq!(report.endpoints, vec![ep("10.0.0.1:8080")]);
        assert_eq!(report.error, None);
        assert_eq!(
            mock.calls(),
            vec![
                Call::GetBoundTree {
                    root: path("/svc"),
                    name: path("/svc/foo"),
                },
                Call::GetReplicas(id),
            ]
        );
    }

    #[tokio::test]
    async fn pending_falls_back_to_first_bound_stream_update() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.replicas(&id, Reply::Ok(ReplicaResponse::Pending));
        mock.stream(
            &id,
            vec![
                Reply::Ok(ReplicaResponse::Pending),
                Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.2:9090")])),
            ],
        );

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryThenStream)
            .await;

        assert_eq!(report.into_result().unwrap(), vec![ep("10.0.0.2:9090")]);
        assert_eq!(mock.open_streams(), 0);
    }

    #[tokio::test]
    async fn negative_binding_stops_before_resolution() {
        let mock = MockTransport::new();
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::Neg));

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryThenStream)
            .await;

        assert!(report.endpoints.is_empty());
        let err = report.error.unwrap();
        assert!(err.is_negative_binding());
        assert_eq!(
            err,
            ResolveError::NegativeBinding {
                name: "/svc/foo".to_string()
            }
        );
        assert_eq!(mock.calls().len(), 1, "resolver must not be called");
    }

    #[tokio::test]
    async fn unsupported_tree_is_reported_with_tree() {
        let mock = MockTransport::new();
        let tree = BoundTree::Alt(vec![BoundTree::leaf(path("/#/a")), BoundTree::leaf(path("/#/b"))]);
        mock.bind_to(&path("/svc/foo"), Reply::Ok(tree.clone()));

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert!(report.endpoints.is_empty());
        assert_eq!(report.error, Some(ResolveError::UnsupportedTree { tree }));
        assert_eq!(mock.bind_calls(), 1);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn bind_transport_error_is_surfaced() {
        let mock = MockTransport::new();
        let err = TransportError::Rpc {
            code: "Unavailable".into(),
            message: "namerd down".into(),
        };
        mock.bind_to(&path("/svc/foo"), Reply::Err(err.clone()));

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert!(report.endpoints.is_empty());
        assert_eq!(report.error, Some(ResolveError::Transport(err)));
    }

    #[tokio::test]
    async fn unary_pending_surfaces_as_pending_error() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.replicas(&id, Reply::Ok(ReplicaResponse::Pending));

        let report = client(&mock)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert!(report.endpoints.is_empty());
        assert_eq!(report.error, Some(ResolveError::Pending { id: id.to_string() }));
        assert_eq!(mock.stream_calls(&id), 0);
    }

    #[tokio::test]
    async fn resolving_twice_is_stable() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.replicas(
            &id,
            Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:8080"), ep("10.0.0.3:8080")])),
        );

        let client = client(&mock);
        let first = client
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;
        let second = client
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert_eq!(first, second);
        assert_eq!(first.endpoints.len(), 2);
    }

    #[tokio::test]
    async fn resolve_default_uses_configured_strategy() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.stream(&id, vec![Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.4:80")]))]);

        let options = ClientOptions {
            strategy: Strategy::StreamOnly,
            ..ClientOptions::default()
        };
        let report = NameClient::new(mock.clone(), options)
            .resolve_default(&path("/svc"), &path("/svc/foo"))
            .await;

        assert_eq!(report.endpoints, vec![ep("10.0.0.4:80")]);
        assert_eq!(mock.unary_calls(&id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_gets_only_the_budget_left_after_bind() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(
            &path("/svc/foo"),
            Reply::Delayed(Duration::from_millis(200), BoundTree::leaf(id.clone())),
        );
        mock.replicas(
            &id,
            Reply::Delayed(
                Duration::from_millis(200),
                ReplicaResponse::Bound(vec![ep("10.0.0.1:8080")]),
            ),
        );

        let options = ClientOptions {
            op_timeout: Duration::from_millis(300),
            ..ClientOptions::default()
        };
        let started = tokio::time::Instant::now();
        let report = NameClient::new(mock.clone(), options)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        // Each call alone fits in 300ms; together they do not.
        assert!(report.endpoints.is_empty());
        assert_eq!(
            report.error,
            Some(ResolveError::Transport(TransportError::DeadlineExceeded))
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(400));
        assert_eq!(mock.unary_calls(&id), 1);

        let options = ClientOptions {
            op_timeout: Duration::from_millis(500),
            ..ClientOptions::default()
        };
        let report = NameClient::new(mock, options)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;
        assert_eq!(report.into_result().unwrap(), vec![ep("10.0.0.1:8080")]);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_op_timeout_still_resolves() {
        let mock = MockTransport::new();
        let id = path("/#/io.l5d.fs/foo");
        mock.bind_to(&path("/svc/foo"), Reply::Ok(BoundTree::leaf(id.clone())));
        mock.replicas(&id, Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:8080")])));

        let options = ClientOptions {
            op_timeout: Duration::from_secs(u64::MAX),
            ..ClientOptions::default()
        };
        let report = NameClient::new(mock, options)
            .resolve(&path("/svc"), &path("/svc/foo"), Strategy::UnaryOnly)
            .await;

        assert_eq!(report.into_result().unwrap(), vec![ep("10.0.0.1:8080")]);
    }

    // ── multiple identifiers ───────────────────────────────────────

    #[tokio::test]
    async fn partial_failure_keeps_endpoints_and_last_error() {
        let mock = MockTransport::new();
        let a = path("/#/io.l5d.fs/a");
        let b = path("/#/io.l5d.fs/b");
        let transport_err = TransportError::Rpc {
            code: "Unavailable".into(),
            message: "stream reset".into(),
        };
        mock.replicas(&a, Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:80")])));
        mock.replicas(&b, Reply::Err(transport_err.clone()));

        let report = client(&mock)
            .resolve_identifiers(&[a.clone(), b.clone()], Strategy::UnaryOnly, deadline())
            .await;

        assert_eq!(report.endpoints, vec![ep("10.0.0.1:80")]);
        assert_eq!(report.error, Some(ResolveError::Transport(transport_err)));
        assert_eq!(
            mock.calls(),
            vec![Call::GetReplicas(a), Call::GetReplicas(b)]
        );
    }

    #[tokio::test]
    async fn duplicate_endpoints_across_identifiers_are_kept() {
        let mock = MockTransport::new();
        let a = path("/#/io.l5d.fs/a");
        let b = path("/#/io.l5d.fs/b");
        mock.replicas(&a, Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:80")])));
        mock.replicas(&b, Reply::Ok(ReplicaResponse::Bound(vec![ep("10.0.0.1:80")])));

        let report = client(&mock)
            .resolve_identifiers(&[a, b], Strategy::UnaryOnly, deadline())
            .await;

        assert_eq!(report.endpoints, vec![ep("10.0.0.1:80"), ep("10.0.0.1:80")]);
        assert!(report.is_ok());
    }

    #[tokio::test]
    async fn later_success_clears_earlier_error() {
        let mock = MockTransport::new();
        let a = path("/#/io.l5d.fs/a");
        let b = path("/#/io.l5d.fs/b");
        mock.replicas(&a, Reply::Err(TransportError::DeadlineExceeded));
        mock.replicas(&b, Reply::Ok(ReplicaResponse::Bound(vec![])));
        let c = path("/#/io.l5d.fs/c");
        mock.replicas(&c, Reply::Ok(ReplicaResponse::Pending));

        let report = client(&mock)
            .resolve_identifiers(&[a.clone(), b.clone()], Strategy::UnaryOnly, deadline())
            .await;
        assert!(report.endpoints.is_empty());
        assert_eq!(report.error, None);

        let report = client(&mock)
            .resolve_identifiers(&[c.clone(), a, b], Strategy::UnaryOnly, deadline())
            .await;
        assert_eq!(report.error, None);

        let report = client(&mock)
            .resolve_identifiers(&[c.clone()], Strategy::UnaryOnly, deadline())
            .await;
        assert_eq!(report.error, Some(ResolveError::Pending { id: c.to_string() }));
    }
}
