//! RPC actor: an isolated Tokio task that owns the service connection.
//!
//! Callers never touch the connection directly. They send a command to the
//! actor through an mpsc channel and wait for the reply on a `oneshot`
//! channel. The actor tags every request with a fresh id and routes each
//! reply back to the caller waiting on that id, so a long `WaitTurn` and a
//! quick `LeaveGame` can share one connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tengen_protocol::{Body, Codec, Envelope, Reply, Request};
use tengen_transport::{Connection, TransportError};
use tokio::sync::{mpsc, oneshot};

use crate::ServiceError;

/// Envelope id reserved for the handshake and for cancel notices.
pub(crate) const CONTROL_ID: u64 = 0;

type ReplySender = oneshot::Sender<Result<Reply, ServiceError>>;

/// Commands sent to the RPC actor through its channel.
pub(crate) enum RpcCommand {
    /// Send a request and deliver its reply on `reply`.
    Call {
        id: u64,
        request: Request,
        reply: ReplySender,
    },

    /// The caller of request `id` stopped waiting.
    Cancel { id: u64 },
}

/// Handle to a running RPC actor.
///
/// Cheap to clone. The channel is unbounded so a dropped call can post
/// its cancel from a synchronous `Drop`.
#[derive(Clone)]
pub(crate) struct RpcHandle {
    sender: mpsc::UnboundedSender<RpcCommand>,
    next_id: Arc<AtomicU64>,
}

impl RpcHandle {
    /// Sends `request` and waits for its reply.
    ///
    /// Dropping the returned future before it completes cancels the
    /// request on the service side.
    pub(crate) async fn call(&self, request: Request) -> Result<Reply, ServiceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RpcCommand::Call {
                id,
                request,
                reply: reply_tx,
            })
            .map_err(|_| ServiceError::Disconnected)?;

        let guard = CancelOnDrop {
            id,
            sender: Some(self.sender.clone()),
        };
        let result = reply_rx.await;
        guard.disarm();

        result.map_err(|_| ServiceError::Disconnected)?
    }
}

/// Posts a cancel for an abandoned call.
struct CancelOnDrop {
    id: u64,
    sender: Option<mpsc::UnboundedSender<RpcCommand>>,
}

impl CancelOnDrop {
    fn disarm(mut self) {
        self.sender = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(RpcCommand::Cancel { id: self.id });
        }
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RpcActor<C, K> {
    conn: C,
    codec: K,
    /// Callers still waiting for a reply, keyed by request id.
    pending: HashMap<u64, ReplySender>,
    receiver: mpsc::UnboundedReceiver<RpcCommand>,
}

impl<C, K> RpcActor<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    /// Runs until every handle is dropped or the connection ends.
    async fn run(mut self) {
        let conn_id = self.conn.id();
        tracing::debug!(%conn_id, "rpc actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RpcCommand::Call { id, request, reply }) => {
                        self.start_call(id, request, reply).await;
                    }
                    Some(RpcCommand::Cancel { id }) => {
                        self.cancel_call(id).await;
                    }
                    None => {
                        tracing::debug!(%conn_id, "all service handles dropped");
                        break;
                    }
                },
                incoming = self.conn.recv() => match incoming {
                    Ok(Some(data)) => self.handle_incoming(&data),
                    Ok(None) => {
                        tracing::info!(%conn_id, "service closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(%conn_id, error = %e, "receive from service failed");
                        break;
                    }
                },
            }
        }

        // Dropping the remaining reply senders wakes every waiting caller
        // with `Disconnected`.
        if !self.pending.is_empty() {
            tracing::debug!(
                %conn_id,
                in_flight = self.pending.len(),
                "failing in-flight calls"
            );
        }
        self.pending.clear();
        let _ = self.conn.close().await;

        tracing::debug!(%conn_id, "rpc actor stopped");
    }

    async fn start_call(&mut self, id: u64, request: Request, reply: ReplySender) {
        let name = request.name();
        let bytes = match self.codec.encode(&Envelope::request(id, request)) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        if let Err(e) = self.conn.send(&bytes).await {
            tracing::warn!(id, request = name, error = %e, "send to service failed");
            let _ = reply.send(Err(e.into()));
            return;
        }

        tracing::trace!(id, request = name, "request sent");
        self.pending.insert(id, reply);
    }

    async fn cancel_call(&mut self, id: u64) {
        // Already answered: nothing to release on the service side.
        if self.pending.remove(&id).is_none() {
            return;
        }

        tracing::debug!(id, "cancelling request");
        let cancel = Envelope::request(CONTROL_ID, Request::Cancel { id });
        match self.codec.encode(&cancel) {
            Ok(bytes) => {
                if let Err(e) = self.conn.send(&bytes).await {
                    tracing::debug!(id, error = %e, "cancel notice not delivered");
                }
            }
            Err(e) => tracing::debug!(id, error = %e, "cancel notice not encoded"),
        }
    }

    fn handle_incoming(&mut self, data: &[u8]) {
        let envelope: Envelope = match self.codec.decode(data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode envelope");
                return;
            }
        };

        match envelope.body {
            Body::Reply(reply) => match self.pending.remove(&envelope.id) {
                Some(caller) => {
                    let _ = caller.send(Ok(reply));
                }
                None => {
                    tracing::debug!(id = envelope.id, "reply for cancelled or unknown request");
                }
            },
            Body::Request(request) => {
                tracing::debug!(request = request.name(), "ignoring request from service");
            }
        }
    }
}

/// Spawns the RPC actor over an already-handshaken connection.
pub(crate) fn spawn_rpc<C, K>(conn: C, codec: K) -> RpcHandle
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    let actor = RpcActor {
        conn,
        codec,
        pending: HashMap::new(),
        receiver,
    };
    tokio::spawn(actor.run());

    RpcHandle {
        sender,
        next_id: Arc::new(AtomicU64::new(CONTROL_ID + 1)),
    }
}
