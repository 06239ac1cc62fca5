//! Splits a watch body into frames.

use bytes::{Buf, BytesMut};
use serde::de::IgnoredAny;
use tokio_util::codec::Decoder;

use crate::codec::Framing;

/// Size of the length prefix of [`Framing::LengthDelimited`] frames.
const LENGTH_FIELD_LENGTH: usize = 4;

/// Anything bigger is a corrupted prefix rather than an object.
const MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The body ended in the middle of a frame.
    #[error("stream ended in the middle of a frame")]
    Truncated,

    /// The body is not a sequence of JSON values, frame boundaries are lost.
    #[error("malformed json frame, {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("frame of {0} bytes exceeds the limit")]
    TooLong(usize),
}

pub struct FrameDecoder {
    framing: Framing,
    scanner: JsonScanner,
}

impl FrameDecoder {
    pub fn new(framing: Framing) -> Self {
        FrameDecoder {
            framing,
            scanner: JsonScanner::default(),
        }
    }

    /// Takes the first complete JSON value off `src`.
    ///
    /// Whitespace between values is dropped, so servers terminating events
    /// with `\n` and ones that don't are both fine. Objects and arrays are
    /// delimited by bracket matching, which resumes where the previous call
    /// stopped.
    fn decode_json(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, FrameError> {
        if self.scanner.offset == 0 {
            match src.iter().position(|b| !is_json_whitespace(*b)) {
                Some(start) => src.advance(start),
                None => {
                    src.clear();
                    return Ok(None);
                }
            }

            if !matches!(src[0], b'{' | b'[') {
                return decode_json_scalar(src);
            }
        }

        Ok(self.scanner.scan(src).map(|end| src.split_to(end)))
    }
}

/// Bracket matching state of the frame being received.
#[derive(Debug, Default)]
struct JsonScanner {
    /// Bytes of the pending frame already looked at.
    offset: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl JsonScanner {
    /// Returns the length of the object or array at the start of `src` once
    /// it is complete.
    fn scan(&mut self, src: &[u8]) -> Option<usize> {
        for (index, &b) in src.iter().enumerate().skip(self.offset) {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        *self = JsonScanner::default();
                        return Some(index + 1);
                    }
                }
                _ => {}
            }
        }

        self.offset = src.len();
        None
    }
}

/// The whitespace JSON allows between values, form feeds are not part of it.
#[inline]
fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

impl Decoder for FrameDecoder {
    type Item = BytesMut;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.framing {
            Framing::Json => self.decode_json(src),
            Framing::LengthDelimited => decode_length_delimited(src),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::Truncated),
        }
    }
}

/// Anything but an object or array, which is short or garbage. serde_json
/// tells which, and where a valid value ends.
fn decode_json_scalar(src: &mut BytesMut) -> Result<Option<BytesMut>, FrameError> {
    let end = {
        let mut values = serde_json::Deserializer::from_slice(src).into_iter::<IgnoredAny>();
        match values.next() {
            Some(Ok(_)) => values.byte_offset(),
            Some(Err(err)) if err.is_eof() => return Ok(None),
            Some(Err(err)) => return Err(FrameError::Malformed(err)),
            None => return Ok(None),
        }
    };

    Ok(Some(src.split_to(end)))
}

/// Takes the first length prefixed frame off `src`, the prefix stays in
/// `src` until the whole frame is there.
fn decode_length_delimited(src: &mut BytesMut) -> Result<Option<BytesMut>, FrameError> {
    if src.len() < LENGTH_FIELD_LENGTH {
        return Ok(None);
    }

    let len = (&src[..LENGTH_FIELD_LENGTH]).get_u32() as usize;
    if len > MAX_FRAME_LENGTH {
        return Err(FrameError::TooLong(len));
    }

    let total = LENGTH_FIELD_LENGTH + len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(LENGTH_FIELD_LENGTH);
    Ok(Some(src.split_to(len)))
}
