//! Decoding of watch streams.
//!
//! A watch response is a never ending body of framed events. [`Watcher`]
//! pulls one frame at a time off the body and turns it into a typed
//! [`WatchEvent`], remembering the last resource version it has seen so the
//! watch can be resumed after the server hangs up.

mod frame;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::marker::PhantomData;

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::client::{Error, ErrorResponse};
use crate::codec::{self, Codec, JsonCodec};
use crate::resource::Resource;
use crate::transport::{Body, TransportError};
use frame::{FrameDecoder, FrameError};

/// The `type` of a watch event on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    Added,
    Modified,
    Deleted,
    Bookmark,
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
            EventType::Bookmark => "BOOKMARK",
            EventType::Error => "ERROR",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BookmarkMeta {
    /// The only field we need from a Bookmark event.
    #[serde(rename = "resourceVersion")]
    pub resource_version: String,

    /// Streaming lists mark the end of the initial events with the
    /// `k8s.io/initial-events-end` annotation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Can only be relied upon to have metadata with resource version.
/// Bookmarks contain apiVersion + kind + basically empty metadata
///
/// See <https://kubernetes.io/docs/reference/using-api/api-concepts/#watch-bookmarks>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Bookmark {
    pub metadata: BookmarkMeta,
}

/// A change of an object, in the order the server sent it.
///
/// `ERROR` events are not events, [`Watcher::next`] reports them as
/// [`Error::WatchEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum WatchEvent<R> {
    /// Resource was added
    Added(R),
    /// Resource was modified
    Modified(R),
    /// Resource was deleted
    Deleted(R),
    /// Nothing changed, but the collection is known to be at the bookmarked
    /// resource version.
    Bookmark(Bookmark),
}

impl<R> WatchEvent<R> {
    pub fn event_type(&self) -> EventType {
        match self {
            WatchEvent::Added(_) => EventType::Added,
            WatchEvent::Modified(_) => EventType::Modified,
            WatchEvent::Deleted(_) => EventType::Deleted,
            WatchEvent::Bookmark(_) => EventType::Bookmark,
        }
    }

    pub fn object(&self) -> Option<&R> {
        match self {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) | WatchEvent::Deleted(obj) => {
                Some(obj)
            }
            WatchEvent::Bookmark(_) => None,
        }
    }

    pub fn into_object(self) -> Option<R> {
        match self {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) | WatchEvent::Deleted(obj) => {
                Some(obj)
            }
            WatchEvent::Bookmark(_) => None,
        }
    }
}

/// The envelope of a frame, `{"type": "...", "object": {...}}`.
#[derive(Deserialize)]
#[serde(tag = "type", content = "object", rename_all = "UPPERCASE")]
enum RawEvent<R> {
    Added(R),
    Modified(R),
    Deleted(R),
    Bookmark(Bookmark),
    Error(ErrorResponse),
}

type Frames = FramedRead<StreamReader<Body, bytes::Bytes>, FrameDecoder>;

enum State {
    Open(Frames),
    /// The server ended the body cleanly.
    Drained,
    Closed,
}

/// An open watch, drained by calling [`Watcher::next`] until it fails with
/// [`Error::EndOfStream`].
///
/// Dropping the watcher releases the connection just like
/// [`Watcher::close`] does.
pub struct Watcher<R, C = JsonCodec> {
    state: State,
    codec: C,
    resource_version: Option<String>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource, C: Codec> Watcher<R, C> {
    /// Wraps the body of a watch response. `resource_version` is the cursor
    /// the watch was started from, if any.
    pub fn new(body: Body, codec: C, resource_version: Option<String>) -> Self {
        let frames = FramedRead::new(
            StreamReader::new(body),
            FrameDecoder::new(codec.framing()),
        );

        Watcher {
            state: State::Open(frames),
            codec,
            resource_version,
            _marker: PhantomData,
        }
    }

    /// Waits for the next event.
    ///
    /// Errors of a single event, [`Error::WatchEvent`] and [`Error::Codec`],
    /// leave the watcher open. A body that ends in the middle of a frame
    /// yields [`Error::TruncatedStream`] and closes the watcher, so do
    /// transport failures. Once the body has ended cleanly every call
    /// returns [`Error::EndOfStream`].
    pub async fn next(&mut self) -> Result<WatchEvent<R>, Error> {
        let frames = match &mut self.state {
            State::Open(frames) => frames,
            State::Drained => return Err(Error::EndOfStream),
            State::Closed => return Err(Error::StreamClosed),
        };

        let frame = match frames.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                self.state = State::Closed;
                return Err(self.stream_error(err));
            }
            None => {
                debug!(
                    message = "watch stream reached its end",
                    resource_version = ?self.resource_version,
                );

                self.state = State::Drained;
                return Err(Error::EndOfStream);
            }
        };

        let event = match self.codec.decode::<RawEvent<R>>(&frame)? {
            RawEvent::Added(obj) => WatchEvent::Added(obj),
            RawEvent::Modified(obj) => WatchEvent::Modified(obj),
            RawEvent::Deleted(obj) => WatchEvent::Deleted(obj),
            RawEvent::Bookmark(bookmark) => {
                self.advance(&bookmark.metadata.resource_version);
                return Ok(WatchEvent::Bookmark(bookmark));
            }
            RawEvent::Error(status) => return Err(Error::WatchEvent(status)),
        };

        if let Some(obj) = event.object() {
            self.advance(&obj.metadata().resource_version);
        }

        Ok(event)
    }

    /// Releases the underlying body. Closing twice is fine, and any later
    /// [`Watcher::next`] fails with [`Error::StreamClosed`].
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// The last resource version observed, from objects and bookmarks, or
    /// the one the watch started from. Watching again from it continues
    /// where this watch stopped.
    pub fn resource_version(&self) -> Option<&str> {
        self.resource_version.as_deref()
    }

    /// Adapts the watcher into a stream, which ends when the body does or
    /// after a failure that closes the watcher.
    pub fn into_stream(self) -> BoxStream<'static, Result<WatchEvent<R>, Error>> {
        futures::stream::unfold(self, |mut watcher| async move {
            match watcher.next().await {
                Err(Error::EndOfStream | Error::StreamClosed) => None,
                result => Some((result, watcher)),
            }
        })
        .boxed()
    }

    fn advance(&mut self, resource_version: &str) {
        if !resource_version.is_empty() {
            self.resource_version = Some(resource_version.to_string());
        }
    }

    fn stream_error(&self, err: FrameError) -> Error {
        match err {
            FrameError::Truncated => {
                warn!(
                    message = "watch stream ended in the middle of a frame",
                    resource_version = ?self.resource_version,
                );
                Error::TruncatedStream
            }
            FrameError::Io(err) if err.kind() == ErrorKind::UnexpectedEof => {
                warn!(
                    message = "watch connection closed unexpectedly",
                    %err,
                    resource_version = ?self.resource_version,
                );
                Error::TruncatedStream
            }
            FrameError::Io(err) => Error::Transport(TransportError::Io(err)),
            FrameError::Malformed(err) => Error::Codec(codec::Error::Decode(err.into())),
            err @ FrameError::TooLong(_) => Error::Codec(codec::Error::Decode(err.into())),
        }
    }
}
