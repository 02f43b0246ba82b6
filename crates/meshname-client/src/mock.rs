//! Scripted in-memory transport for tests.
//!
//! Replies are queued per name (interpreter) or per bound identifier
//! (resolver). Each call takes the next queued reply; the last one
//! repeats, so the same script can serve repeated resolves. Calls,
//! stream reads, and open streams are recorded for assertions.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use meshname_core::Path;
use tokio::time::Sleep;

use crate::deadline::Deadline;
use crate::error::TransportError;
use crate::transport::{BoundTree, Interpreter, ReplicaResponse, Resolver};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Err(TransportError),
    /// Answers with the value once the delay has passed.
    Delayed(Duration, T),
    /// Never answers; only a deadline ends the call.
    Hang,
}

impl<T> Reply<T> {
    async fn settle(self) -> Result<T, TransportError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Err(err) => Err(err),
            Reply::Delayed(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBoundTree { root: Path, name: Path },
    GetReplicas(Path),
    StreamReplicas(Path),
}

#[derive(Debug, Clone)]
enum StreamScript {
    Open(Vec<Reply<ReplicaResponse>>),
    Refuse(TransportError),
}

#[derive(Debug, Default)]
struct MockState {
    trees: HashMap<String, VecDeque<Reply<BoundTree>>>,
    replicas: HashMap<String, VecDeque<Reply<ReplicaResponse>>>,
    streams: HashMap<String, VecDeque<StreamScript>>,
    calls: Vec<Call>,
    stream_reads: HashMap<String, usize>,
    open_streams: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock transport lock")
    }

    /// Queue an interpreter reply for `name`.
    pub fn bind_to(&self, name: &Path, reply: Reply<BoundTree>) -> &Self {
        self.state()
            .trees
            .entry(name.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a `GetReplicas` reply for `id`.
    pub fn replicas(&self, id: &Path, reply: Reply<ReplicaResponse>) -> &Self {
        self.state()
            .replicas
            .entry(id.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a `StreamReplicas` subscription for `id` yielding `items`,
    /// then ending.
    pub fn stream(&self, id: &Path, items: Vec<Reply<ReplicaResponse>>) -> &Self {
        self.push_stream(id, StreamScript::Open(items))
    }

    /// Queue a `StreamReplicas` call for `id` that fails to open.
    pub fn refuse_stream(&self, id: &Path, err: TransportError) -> &Self {
        self.push_stream(id, StreamScript::Refuse(err))
    }

    fn push_stream(&self, id: &Path, script: StreamScript) -> &Self {
        self.state()
            .streams
            .entry(id.to_string())
            .or_default()
            .push_back(script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn bind_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::GetBoundTree { .. }))
    }

    pub fn unary_calls(&self, id: &Path) -> usize {
        self.count(|call| matches!(call, Call::GetReplicas(p) if p == id))
    }

    pub fn stream_calls(&self, id: &Path) -> usize {
        self.count(|call| matches!(call, Call::StreamReplicas(p) if p == id))
    }

    /// Items handed out by `id`'s streams so far.
    pub fn stream_reads(&self, id: &Path) -> usize {
        self.state()
            .stream_reads
            .get(&id.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Streams opened and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.state().open_streams
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| pred(call)).count()
    }
}

fn next_scripted<T: Clone>(queue: Option<&mut VecDeque<T>>) -> Option<T> {
    let queue = queue?;
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

fn unscripted(method: &str, key: &Path) -> TransportError {
    TransportError::Rpc {
        code: "Unimplemented".to_string(),
        message: format!("no scripted {method} reply for {key}"),
    }
}

impl Interpreter for MockTransport {
    async fn get_bound_tree(
        &self,
        root: &Path,
        name: &Path,
        _deadline: Deadline,
    ) -> Result<BoundTree, TransportError> {
        let reply = {
            let mut state = self.state();
            state.calls.push(Call::GetBoundTree {
                root: root.clone(),
                name: name.clone(),
            });
            next_scripted(state.trees.get_mut(&name.to_string()))
        };
        match reply {
            Some(reply) => reply.settle().await,
            None => Err(unscripted("GetBoundTree", name)),
        }
    }
}

impl Resolver for MockTransport {
    type ReplicaStream = MockStream;

    async fn get_replicas(
        &self,
        id: &Path,
        _deadline: Deadline,
    ) -> Result<ReplicaResponse, TransportError> {
        let reply = {
            let mut state = self.state();
            state.calls.push(Call::GetReplicas(id.clone()));
            next_scripted(state.replicas.get_mut(&id.to_string()))
        };
        match reply {
            Some(reply) => reply.settle().await,
            None => Err(unscripted("GetReplicas", id)),
        }
    }

    async fn stream_replicas(
        &self,
        id: &Path,
        _deadline: Deadline,
    ) -> Result<MockStream, TransportError> {
        let script = {
            let mut state = self.state();
            state.calls.push(Call::StreamReplicas(id.clone()));
            let script = next_scripted(state.streams.get_mut(&id.to_string()));
            if let Some(StreamScript::Open(_)) = &script {
                state.open_streams += 1;
            }
            script
        };
        match script {
            Some(StreamScript::Open(items)) => Ok(MockStream {
                items: items.into(),
                delay: None,
                id: id.to_string(),
                state: self.inner.clone(),
            }),
            Some(StreamScript::Refuse(err)) => Err(err),
            None => Err(unscripted("StreamReplicas", id)),
        }
    }
}

/// Subscription handed out by [`MockTransport`].
#[derive(Debug)]
pub struct MockStream {
    items: VecDeque<Reply<ReplicaResponse>>,
    delay: Option<Pin<Box<Sleep>>>,
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl Stream for MockStream {
    type Item = Result<ReplicaResponse, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(Reply::Delayed(delay, _)) = self.items.front() {
            let delay = *delay;
            let sleep = self
                .delay
                .get_or_insert_with(|| Box::pin(tokio::time::sleep(delay)));
            if sleep.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            self.delay = None;
        }

        let item = match self.items.pop_front() {
            None => return Poll::Ready(None),
            Some(Reply::Hang) => {
                self.items.push_front(Reply::Hang);
                return Poll::Pending;
            }
            Some(Reply::Ok(response)) | Some(Reply::Delayed(_, response)) => Ok(response),
            Some(Reply::Err(err)) => Err(err),
        };

        let mut state = self.state.lock().expect("mock transport lock");
        *state.stream_reads.entry(self.id.clone()).or_default() += 1;
        Poll::Ready(Some(item))
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.open_streams -= 1;
        }
    }
}
