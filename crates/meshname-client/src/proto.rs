//! `io.linkerd.mesh` messages and service stubs.
//!
//! Only the subset the client sends or reads is declared here; fields
//! the client never touches (dtabs, replica metadata) are left out and
//! skipped by the decoder as unknown fields.

use tonic::codegen::StdError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Path {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub elems: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BindReq {
    #[prost(message, optional, tag = "1")]
    pub root: Option<Path>,
    #[prost(message, optional, tag = "2")]
    pub name: Option<Path>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoundTreeRsp {
    #[prost(message, optional, tag = "1")]
    pub tree: Option<BoundNameTree>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoundNameTree {
    #[prost(oneof = "bound_name_tree::Node", tags = "1, 2, 3, 4, 5, 6")]
    pub node: Option<bound_name_tree::Node>,
}

pub mod bound_name_tree {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Node {
        #[prost(message, tag = "1")]
        Neg(Neg),
        #[prost(message, tag = "2")]
        Fail(Fail),
        #[prost(message, tag = "3")]
        Empty(Empty),
        #[prost(message, tag = "4")]
        Leaf(Leaf),
        #[prost(message, tag = "5")]
        Alt(Alt),
        #[prost(message, tag = "6")]
        Union(Union),
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Neg {}

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Fail {}

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Empty {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Leaf {
        #[prost(message, optional, tag = "1")]
        pub id: Option<super::Path>,
        #[prost(message, optional, tag = "2")]
        pub residual: Option<super::Path>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Alt {
        #[prost(message, repeated, tag = "1")]
        pub trees: Vec<super::BoundNameTree>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Union {
        #[prost(message, repeated, tag = "1")]
        pub trees: Vec<Weighted>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Weighted {
        #[prost(double, tag = "1")]
        pub weight: f64,
        #[prost(message, optional, tag = "2")]
        pub tree: Option<super::BoundNameTree>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReplicasReq {
    #[prost(message, optional, tag = "1")]
    pub id: Option<Path>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Replicas {
    #[prost(oneof = "replicas::Outcome", tags = "1, 2, 3, 4")]
    pub outcome: Option<replicas::Outcome>,
}

pub mod replicas {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Pending(Pending),
        #[prost(message, tag = "2")]
        Neg(Neg),
        #[prost(message, tag = "3")]
        Failed(Failed),
        #[prost(message, tag = "4")]
        Bound(Bound),
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Pending {}

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Neg {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Failed {
        #[prost(string, tag = "1")]
        pub message: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Bound {
        #[prost(message, repeated, tag = "1")]
        pub endpoints: Vec<super::Endpoint>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Endpoint {
    /// `INET4 = 0`, `INET6 = 1`.
    #[prost(int32, tag = "1")]
    pub inet_af: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub address: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub port: i32,
    #[prost(message, optional, tag = "4")]
    pub meta: Option<endpoint::Meta>,
}

pub mod endpoint {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Meta {
        #[prost(string, tag = "1")]
        pub authority: String,
        #[prost(string, tag = "2")]
        pub node_name: String,
    }
}

fn not_ready<E: Into<StdError>>(e: E) -> tonic::Status {
    tonic::Status::new(
        tonic::Code::Unknown,
        format!("Service was not ready: {}", e.into()),
    )
}

pub mod interpreter_client {
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct InterpreterClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> InterpreterClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            Self {
                inner: tonic::client::Grpc::new(inner),
            }
        }

        pub async fn get_bound_tree(
            &mut self,
            request: impl tonic::IntoRequest<super::BindReq>,
        ) -> std::result::Result<tonic::Response<super::BoundTreeRsp>, tonic::Status> {
            self.inner.ready().await.map_err(super::not_ready)?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/io.linkerd.mesh.Interpreter/GetBoundTree",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("io.linkerd.mesh.Interpreter", "GetBoundTree"));
            self.inner.unary(req, path, codec).await
        }
    }
}

pub mod resolver_client {
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct ResolverClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> ResolverClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            Self {
                inner: tonic::client::Grpc::new(inner),
            }
        }

        pub async fn get_replicas(
            &mut self,
            request: impl tonic::IntoRequest<super::ReplicasReq>,
        ) -> std::result::Result<tonic::Response<super::Replicas>, tonic::Status> {
            self.inner.ready().await.map_err(super::not_ready)?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/io.linkerd.mesh.Resolver/GetReplicas");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("io.linkerd.mesh.Resolver", "GetReplicas"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn stream_replicas(
            &mut self,
            request: impl tonic::IntoRequest<super::ReplicasReq>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::Replicas>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(super::not_ready)?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/io.linkerd.mesh.Resolver/StreamReplicas");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("io.linkerd.mesh.Resolver", "StreamReplicas"));
            self.inner.server_streaming(req, path, codec).await
        }
    }
}
