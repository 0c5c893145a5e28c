//! WebSocket client transport using `tokio-tungstenite`.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use rustls::{ClientConfig, RootCertStore};
use tokio::sync::Mutex;
use tokio_tungstenite::Connector;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// The certificates a `wss://` connection trusts.
#[derive(Debug, Clone)]
pub struct TlsRoots {
    config: Arc<ClientConfig>,
}

impl TlsRoots {
    /// Trusts exactly the PEM certificates in `path`, usually the game
    /// service's own certificate or the CA that signed it.
    pub fn from_pem_file(path: &Path) -> Result<Self, TransportError> {
        let fail = |reason: String| TransportError::Certificate {
            path: path.to_path_buf(),
            reason,
        };

        let mut roots = RootCertStore::empty();
        for cert in CertificateDer::pem_file_iter(path).map_err(|e| fail(format!("{e:?}")))? {
            let cert = cert.map_err(|e| fail(format!("{e:?}")))?;
            roots.add(cert).map_err(|e| fail(e.to_string()))?;
        }
        if roots.is_empty() {
            return Err(fail("no certificate found".into()));
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| fail(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        tracing::debug!(path = %path.display(), "loaded tls roots");

        Ok(Self {
            config: Arc::new(config),
        })
    }
}

/// A WebSocket connection to the game service.
///
/// The stream is split so a pending `recv` never blocks a `send`: the RPC
/// actor waits for replies and writes new requests from the same
/// `select!` loop.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// Opens a WebSocket connection to `url` (e.g. `ws://localhost:7777`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        Self::open(url, None).await
    }

    /// Opens a `wss://` connection that only trusts `roots`.
    pub async fn connect_tls(url: &str, roots: &TlsRoots) -> Result<Self, TransportError> {
        let connector = Connector::Rustls(Arc::clone(&roots.config));
        Self::open(url, Some(connector)).await
    }

    async fn open(url: &str, connector: Option<Connector>) -> Result<Self, TransportError> {
        let (ws, _response) =
            tokio_tungstenite::connect_async_tls_with_config(url, None, false, connector)
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    url: url.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e),
                })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, url, "connected WebSocket");

        let (sink, stream) = ws.split();
        Ok(Self {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
