//! Body encodings.
//!
//! The client never looks into request or response bodies itself, it hands
//! them to a [`Codec`]. The codec also decides how a watch stream is split
//! into frames.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("encode body failed, {0}")]
    Encode(#[source] BoxError),

    #[error("decode body failed, {0}")]
    Decode(#[source] BoxError),
}

/// How the frames of a watch stream are delimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    /// One JSON value per frame. Values may be separated by whitespace or
    /// newlines, or not separated at all.
    #[default]
    Json,

    /// Every frame is prefixed by its length, a 4 byte big-endian integer.
    LengthDelimited,
}

pub trait Codec: Clone + Send + Sync + 'static {
    /// The media type sent in `Accept` and `Content-Type` headers.
    fn content_type(&self) -> &'static str;

    /// The framing of watch responses in this encoding.
    fn framing(&self) -> Framing {
        Framing::Json
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes, Error>;

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, Error>;
}

/// The default codec, `application/json` bodies and newline delimited watch
/// events.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes, Error> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|err| Error::Encode(err.into()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(data).map_err(|err| Error::Decode(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn json() {
        let codec = JsonCodec;
        let value = BTreeMap::from([("hello".to_string(), "world".to_string())]);

        let encoded = codec.encode(&value).unwrap();
        assert_eq!(encoded.as_ref(), br#"{"hello":"world"}"#);
        assert_eq!(codec.framing(), Framing::Json);

        let err = codec.decode::<BTreeMap<String, u32>>(&encoded).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
