//! `RemoteGameService`: the [`GameService`] implementation that talks to
//! the real service over a [`Connection`].
//!
//! The flow is:
//!   1. Open the connection (WebSocket by default)
//!   2. Send Handshake with credentials → expect Ack
//!   3. Spawn the RPC actor; every trait method becomes one request

use tengen_protocol::{
    Body, Codec, Envelope, ErrorCode, GameSnapshot, JsonCodec, PROTOCOL_VERSION, ProtocolError,
    Reply, Request,
};
use tengen_transport::{Connection, TlsRoots, TransportError, WebSocketConnection};

use crate::rpc::{CONTROL_ID, RpcHandle, spawn_rpc};
use crate::{Credentials, GameService, ServiceError};

/// A connected, authenticated game-service client.
pub struct RemoteGameService {
    rpc: RpcHandle,
}

impl RemoteGameService {
    /// Connects to the service at `url` over WebSocket with the JSON codec
    /// and authenticates.
    ///
    /// # Errors
    /// Transport failures, or [`ServiceError::Rejected`] when the service
    /// refuses the credentials. Both are fatal for the client.
    pub async fn connect(url: &str, credentials: &Credentials) -> Result<Self, ServiceError> {
        let conn = WebSocketConnection::connect(url).await?;
        Self::over(conn, JsonCodec, credentials).await
    }

    /// Same as [`connect`](Self::connect), over `wss://` trusting `roots`.
    pub async fn connect_tls(
        url: &str,
        roots: &TlsRoots,
        credentials: &Credentials,
    ) -> Result<Self, ServiceError> {
        let conn = WebSocketConnection::connect_tls(url, roots).await?;
        Self::over(conn, JsonCodec, credentials).await
    }

    /// Authenticates over an already-open connection and starts the RPC
    /// actor on it.
    pub async fn over<C, K>(conn: C, codec: K, credentials: &Credentials) -> Result<Self, ServiceError>
    where
        C: Connection<Error = TransportError>,
        K: Codec,
    {
        handshake(&conn, &codec, credentials).await?;
        tracing::info!(login = %credentials.login, conn_id = %conn.id(), "authenticated");
        Ok(Self {
            rpc: spawn_rpc(conn, codec),
        })
    }

    async fn ack(&self, request: Request) -> Result<(), ServiceError> {
        let name = request.name();
        match self.rpc.call(request).await? {
            Reply::Ack => Ok(()),
            Reply::Error { code, message } => Err(ServiceError::Rejected { code, message }),
            Reply::State { .. } => Err(ServiceError::UnexpectedReply { request: name }),
        }
    }

    async fn state(&self, request: Request) -> Result<GameSnapshot, ServiceError> {
        let name = request.name();
        match self.rpc.call(request).await? {
            Reply::State { snapshot } => Ok(snapshot),
            Reply::Error { code, message } => Err(ServiceError::Rejected { code, message }),
            Reply::Ack => Err(ServiceError::UnexpectedReply { request: name }),
        }
    }
}

impl GameService for RemoteGameService {
    async fn register_user(&self) -> Result<(), ServiceError> {
        self.ack(Request::RegisterUser).await
    }

    async fn enter_lobby(&self) -> Result<(), ServiceError> {
        self.ack(Request::EnterLobby).await
    }

    async fn leave_lobby(&self) -> Result<(), ServiceError> {
        self.ack(Request::LeaveLobby).await
    }

    async fn join_game(&self) -> Result<GameSnapshot, ServiceError> {
        self.state(Request::JoinGame).await
    }

    async fn wait_turn(&self) -> Result<GameSnapshot, ServiceError> {
        self.state(Request::WaitTurn).await
    }

    async fn make_turn(&self, x: i64, y: i64) -> Result<GameSnapshot, ServiceError> {
        match self.state(Request::MakeTurn { x, y }).await {
            // The last snapshot is still actual: the player may retry.
            Err(ServiceError::Rejected {
                code: ErrorCode::InvalidArgument,
                message,
            }) => Err(ServiceError::InvalidMove(message)),
            other => other,
        }
    }

    async fn leave_game(&self) -> Result<(), ServiceError> {
        self.ack(Request::LeaveGame).await
    }
}

/// Sends the Handshake and waits for the service's verdict.
async fn handshake<C, K>(conn: &C, codec: &K, credentials: &Credentials) -> Result<(), ServiceError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    let hello = Envelope::request(
        CONTROL_ID,
        Request::Handshake {
            version: PROTOCOL_VERSION,
            login: credentials.login.clone(),
            password: credentials.password.clone(),
        },
    );
    conn.send(&codec.encode(&hello)?).await?;

    let data = conn.recv().await?.ok_or_else(|| {
        TransportError::ConnectionClosed("connection closed before handshake".into())
    })?;
    let envelope: Envelope = codec.decode(&data)?;

    match envelope.body {
        Body::Reply(Reply::Ack) if envelope.id == CONTROL_ID => Ok(()),
        Body::Reply(Reply::Error { code, message }) => {
            Err(ServiceError::Rejected { code, message })
        }
        _ => Err(ProtocolError::InvalidMessage("expected handshake acknowledgement".into()).into()),
    }
}
