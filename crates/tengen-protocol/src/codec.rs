//! Codec trait and implementations for serializing/deserializing envelopes.
//!
//! The RPC client doesn't care HOW envelopes become bytes: it just needs
//! something that implements [`Codec`]. [`JsonCodec`] is the only format
//! the Go service speaks today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the RPC actor
/// task for the whole lifetime of the connection.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tengen_protocol::{Codec, Envelope, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::request(1, Request::MakeTurn { x: 3, y: 4 });
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Body, Envelope, Reply, Request};

    #[test]
    fn test_json_codec_decodes_service_reply() {
        let raw = br#"{"id": 4, "body": {"type": "Reply", "data": {"type": "Ack"}}}"#;
        let env: Envelope = JsonCodec.decode(raw).unwrap();
        assert_eq!(env.id, 4);
        assert_eq!(env.body, Body::Reply(Reply::Ack));
    }

    #[test]
    fn test_json_codec_encodes_request() {
        let bytes = JsonCodec
            .encode(&Envelope::request(2, Request::LeaveGame))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"LeaveGame\""));
    }

    #[test]
    fn test_json_codec_decode_error_is_classified() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"{");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
