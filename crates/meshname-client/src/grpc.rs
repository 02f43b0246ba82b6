//! gRPC transport for namerd's mesh interface.
//!
//! One tonic `Channel` is dialed up front and shared by the interpreter
//! and resolver stubs. Every request carries the time left on the
//! caller's deadline as its gRPC timeout.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use meshname_core::{Endpoint, EndpointMeta, Path};
use tonic::transport::Channel;
use tracing::{debug, info, warn};

use crate::deadline::Deadline;
use crate::error::TransportError;
use crate::proto;
use crate::proto::interpreter_client::InterpreterClient;
use crate::proto::resolver_client::ResolverClient;
use crate::transport::{BoundTree, Interpreter, ReplicaResponse, Resolver, WeightedTree};

#[derive(Debug, Clone)]
pub struct GrpcTransport {
    interpreter: InterpreterClient<Channel>,
    resolver: ResolverClient<Channel>,
}

impl GrpcTransport {
    /// Dial the naming service at `address` (`host:port` or a full URI).
    pub async fn connect(address: &str, dial_timeout: Duration) -> Result<Self, TransportError> {
        let uri = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        let endpoint = tonic::transport::Endpoint::from_shared(uri.clone())
            .map_err(|e| TransportError::Connect(format!("invalid address {uri}: {e}")))?
            .connect_timeout(dial_timeout);

        let channel = tokio::time::timeout(dial_timeout, endpoint.connect())
            .await
            .map_err(|_| TransportError::Connect(format!("timed out dialing {uri}")))?
            .map_err(|e| {
                warn!(%uri, error = %e, "failed to connect to naming service");
                TransportError::Connect(format!("dial {uri}: {e}"))
            })?;

        info!(%uri, "connected to naming service");
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            interpreter: InterpreterClient::new(channel.clone()),
            resolver: ResolverClient::new(channel),
        }
    }
}

fn request<T>(message: T, deadline: Deadline) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    request.set_timeout(deadline.remaining());
    request
}

impl Interpreter for GrpcTransport {
    async fn get_bound_tree(
        &self,
        root: &Path,
        name: &Path,
        deadline: Deadline,
    ) -> Result<BoundTree, TransportError> {
        let req = proto::BindReq {
            root: Some(root.into()),
            name: Some(name.into()),
        };
        let rsp = self
            .interpreter
            .clone()
            .get_bound_tree(request(req, deadline))
            .await?
            .into_inner();

        let tree = rsp
            .tree
            .ok_or_else(|| TransportError::Decode("bound tree response without a tree".into()))?;
        BoundTree::try_from(tree)
    }
}

impl Resolver for GrpcTransport {
    type ReplicaStream = BoxStream<'static, Result<ReplicaResponse, TransportError>>;

    async fn get_replicas(
        &self,
        id: &Path,
        deadline: Deadline,
    ) -> Result<ReplicaResponse, TransportError> {
        let req = proto::ReplicasReq { id: Some(id.into()) };
        let rsp = self
            .resolver
            .clone()
            .get_replicas(request(req, deadline))
            .await?
            .into_inner();
        ReplicaResponse::try_from(rsp)
    }

    async fn stream_replicas(
        &self,
        id: &Path,
        deadline: Deadline,
    ) -> Result<Self::ReplicaStream, TransportError> {
        let req = proto::ReplicasReq { id: Some(id.into()) };
        let updates = self
            .resolver
            .clone()
            .stream_replicas(request(req, deadline))
            .await?
            .into_inner();

        debug!(%id, "opened replica stream");
        Ok(updates
            .map(|update| update.map_err(TransportError::from).and_then(ReplicaResponse::try_from))
            .boxed())
    }
}

// ── Wire conversions ───────────────────────────────────────────────

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::DeadlineExceeded => TransportError::DeadlineExceeded,
            code => TransportError::Rpc {
                code: format!("{code:?}"),
                message: status.message().to_string(),
            },
        }
    }
}

impl From<&Path> for proto::Path {
    fn from(path: &Path) -> Self {
        Self {
            elems: path.segments().iter().map(|s| s.to_vec()).collect(),
        }
    }
}

impl From<proto::Path> for Path {
    fn from(path: proto::Path) -> Self {
        Path::from_segments(path.elems)
    }
}

impl TryFrom<proto::BoundNameTree> for BoundTree {
    type Error = TransportError;

    fn try_from(tree: proto::BoundNameTree) -> Result<Self, Self::Error> {
        use proto::bound_name_tree::Node;

        let node = tree
            .node
            .ok_or_else(|| TransportError::Decode("bound tree without a node".into()))?;

        Ok(match node {
            Node::Neg(_) => BoundTree::Neg,
            Node::Fail(_) => BoundTree::Fail,
            Node::Empty(_) => BoundTree::Empty,
            Node::Leaf(leaf) => BoundTree::Leaf {
                id: leaf
                    .id
                    .map(Path::from)
                    .ok_or_else(|| TransportError::Decode("leaf without an id".into()))?,
                residual: leaf.residual.map(Path::from).unwrap_or_default(),
            },
            Node::Alt(alt) => BoundTree::Alt(
                alt.trees
                    .into_iter()
                    .map(BoundTree::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Node::Union(union) => BoundTree::Union(
                union
                    .trees
                    .into_iter()
                    .map(|weighted| {
                        let tree = weighted.tree.ok_or_else(|| {
                            TransportError::Decode("weighted union branch without a tree".into())
                        })?;
                        Ok(WeightedTree {
                            weight: weighted.weight,
                            tree: BoundTree::try_from(tree)?,
                        })
                    })
                    .collect::<Result<_, TransportError>>()?,
            ),
        })
    }
}

impl TryFrom<proto::Replicas> for ReplicaResponse {
    type Error = TransportError;

    fn try_from(replicas: proto::Replicas) -> Result<Self, Self::Error> {
        use proto::replicas::Outcome;

        Ok(match replicas.outcome {
            Some(Outcome::Bound(bound)) => ReplicaResponse::Bound(
                bound
                    .endpoints
                    .into_iter()
                    .map(Endpoint::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Some(Outcome::Pending(_)) => ReplicaResponse::Pending,
            Some(Outcome::Neg(_)) => ReplicaResponse::Neg,
            Some(Outcome::Failed(failed)) => ReplicaResponse::Failed(failed.message),
            None => ReplicaResponse::Unrecognized,
        })
    }
}

impl TryFrom<proto::Endpoint> for Endpoint {
    type Error = TransportError;

    fn try_from(endpoint: proto::Endpoint) -> Result<Self, Self::Error> {
        let address = if let Ok(octets) = <[u8; 4]>::try_from(&endpoint.address[..]) {
            IpAddr::V4(Ipv4Addr::from(octets))
        } else if let Ok(octets) = <[u8; 16]>::try_from(&endpoint.address[..]) {
            IpAddr::V6(Ipv6Addr::from(octets))
        } else {
            return Err(TransportError::Decode(format!(
                "endpoint address has {} bytes, expected 4 or 16",
                endpoint.address.len()
            )));
        };
        let port = u16::try_from(endpoint.port).map_err(|_| {
            TransportError::Decode(format!("endpoint port {} out of range", endpoint.port))
        })?;

        let meta = endpoint
            .meta
            .map(|meta| EndpointMeta {
                authority: Some(meta.authority).filter(|s| !s.is_empty()),
                node_name: Some(meta.node_name).filter(|s| !s.is_empty()),
            })
            .unwrap_or_default();

        Ok(Endpoint::new(address, port).with_meta(meta))
    }
}
