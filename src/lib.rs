//! A typed client for Kubernetes style REST APIs.
//!
//! Resource types are registered once in a [`Registry`], which maps every Rust
//! type to its API coordinates. The [`Client`] resolves those coordinates,
//! renders the REST URL and decodes responses straight into the caller's
//! types. Watches are exposed as a pull based [`Watcher`].

mod client;
pub mod codec;
pub mod config;
mod registry;
pub mod resource;
pub mod transport;
mod url;
mod version;
pub mod watch;

pub use client::{Client, Error, ErrorResponse};
pub use codec::{Codec, Framing, JsonCodec};
pub use registry::{EntryKind, Registry, RegistryEntry, RegistryError, ResourceIdentity};
pub use resource::{ListMeta, ObjectList, ObjectMeta, Resource, ResourceList};
pub use transport::{Body, HttpTransport, Transport, TransportError};
pub use url::{RequestOptions, VersionMatch, format_url, resource_url};
pub use version::Version;
pub use watch::{Bookmark, EventType, WatchEvent, Watcher};
