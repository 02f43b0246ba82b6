//! meshname-client: name resolution against a namerd mesh interface.
//!
//! Resolving a name is two phases: the interpreter binds `(root, name)`
//! to bound identifiers, then the resolver turns each identifier into
//! its current endpoint set.
//!
//! # Architecture
//!
//! ```text
//! NameClient::resolve(root, name, strategy)
//!   ├── Binder
//!   │   └── Interpreter.GetBoundTree → Leaf | Neg | unsupported tree
//!   └── StrategyEngine (per bound identifier, in order)
//!       ├── UnaryOnly        → Resolver.GetReplicas
//!       ├── StreamOnly       → Resolver.StreamReplicas, first bound update
//!       └── UnaryThenStream  → GetReplicas, StreamReplicas only on Pending
//! ```
//!
//! One [`Deadline`] bounds the whole call. Transports implement the
//! [`Interpreter`] and [`Resolver`] traits; [`GrpcTransport`] speaks
//! the `io.linkerd.mesh` gRPC services.

pub mod binder;
pub mod client;
pub mod deadline;
pub mod error;
pub mod grpc;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod proto;
pub mod strategy;
pub mod transport;

pub use binder::{Binder, BindingOutcome};
pub use client::{NameClient, ResolveReport};
pub use deadline::Deadline;
pub use error::{ResolveError, TransportError};
pub use grpc::GrpcTransport;
pub use strategy::{Resolution, StrategyEngine};
pub use transport::{BoundTree, Interpreter, ReplicaResponse, Resolver, WeightedTree};

pub use meshname_core::{ClientOptions, Endpoint, Path, Strategy};
