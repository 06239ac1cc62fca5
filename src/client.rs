use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::{self, Codec, JsonCodec};
use crate::config::{self, Config};
use crate::registry::{Registry, ResourceIdentity};
use crate::resource::{Resource, ResourceList};
use crate::transport::{Body, HttpTransport, Transport, TransportError};
use crate::url::{RequestOptions, format_url};
use crate::version::Version;
use crate::watch::Watcher;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The type was never registered, no request has been sent.
    #[error("resource type {0} is not registered")]
    UnregisteredType(&'static str),

    #[error("resource name is required")]
    MissingName,

    #[error("invalid request options, {0}")]
    Validation(String),

    #[error("api server error, status: {}, reason: {}, message: {}", .0.status, .0.reason, .0.message)]
    Api(ErrorResponse),

    /// An `ERROR` event of a watch stream, the stream itself is still usable.
    #[error("watch error event, code: {}, reason: {}, message: {}", .0.code, .0.reason, .0.message)]
    WatchEvent(ErrorResponse),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] codec::Error),

    #[error("build http request failed, {0}")]
    BuildRequest(#[from] http::Error),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error("watch stream ended in the middle of an event")]
    TruncatedStream,

    #[error("watch stream is closed")]
    StreamClosed,

    #[error("watch stream reached its end")]
    EndOfStream,
}

/// An error response from the API.
///
/// This is the `Status` object servers send along with non 2xx responses.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// The status
    #[serde(default)]
    pub status: String,
    /// A message about the error
    #[serde(default)]
    pub message: String,
    /// The reason for the error
    #[serde(default)]
    pub reason: String,
    /// The error code
    #[serde(default)]
    pub code: u16,
}

impl ErrorResponse {
    pub fn is_not_found(&self) -> bool {
        self.code == 404 || self.reason == "NotFound"
    }

    /// Optimistic concurrency failures, and creating something that exists.
    pub fn is_conflict(&self) -> bool {
        self.code == 409 || self.reason == "Conflict" || self.reason == "AlreadyExists"
    }

    /// The requested resource version is too old, the watch or list has to
    /// start over without one.
    pub fn is_gone(&self) -> bool {
        self.code == 410 || self.reason == "Expired" || self.reason == "Gone"
    }

    pub fn is_forbidden(&self) -> bool {
        self.code == 403 || self.reason == "Forbidden"
    }

    /// Interprets the body of a failed response. Proxies and load balancers
    /// answer with plain text, a status is made up from the HTTP status then.
    fn from_response<C: Codec>(codec: &C, status: StatusCode, body: &[u8]) -> Self {
        match codec.decode::<ErrorResponse>(body) {
            Ok(mut resp) => {
                if resp.code == 0 {
                    resp.code = status.as_u16();
                }
                if resp.reason.is_empty() {
                    resp.reason = reason_of(status);
                }
                resp
            }
            Err(_) => ErrorResponse {
                status: "Failure".to_string(),
                message: String::from_utf8_lossy(body).trim().to_string(),
                reason: reason_of(status),
                code: status.as_u16(),
            },
        }
    }
}

/// `Not Found` -> `NotFound`, the way servers spell reasons.
fn reason_of(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or_default()
        .split_whitespace()
        .collect()
}

/// A typed client, every call resolves the coordinates of its type parameter
/// in the [`Registry`] first, unregistered types never hit the network.
#[derive(Clone)]
pub struct Client<T = HttpTransport, C = JsonCodec> {
    transport: T,
    codec: C,
    registry: Arc<Registry>,
    endpoint: String,
    namespace: String,
}

impl Client {
    /// Builds a client from [`Config::infer`], talking JSON over hyper.
    pub fn infer(registry: Arc<Registry>) -> Result<Self, Error> {
        let config = Config::infer()?;
        let endpoint = config.endpoint();
        let namespace = config.default_namespace.clone();
        let transport = HttpTransport::from_config(config);

        let mut client = Client::new(endpoint, registry, transport, JsonCodec);
        client.set_namespace(namespace);

        Ok(client)
    }
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// `endpoint` is the scheme and authority of the API server, like
    /// `https://10.96.0.1:6443`.
    pub fn new(
        endpoint: impl Into<String>,
        registry: Arc<Registry>,
        transport: T,
        codec: C,
    ) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }

        Client {
            transport,
            codec,
            registry,
            endpoint,
            namespace: String::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The namespace from the configuration, empty if there is none.
    /// Calls take their namespace explicitly, this is just what the
    /// configuration suggests.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The URL `resource` would be requested at.
    pub fn resource_url<R: Resource>(
        &self,
        resource: &R,
        with_name: bool,
        options: &RequestOptions,
    ) -> Result<String, Error> {
        crate::url::resource_url(&self.registry, &self.endpoint, resource, with_name, options)
    }

    /// Retrieve version info of the API server, so we can check the compatibility
    pub async fn version(&self) -> Result<Version, Error> {
        let url = format!("{}/version", self.endpoint);
        let body = self
            .exchange(Method::GET, url, JsonCodec.content_type(), None)
            .await?;

        JsonCodec.decode(&body).map_err(Into::into)
    }

    /// Fetches a single object. An empty `namespace` is only valid for
    /// cluster scoped types.
    pub async fn get<R: Resource>(
        &self,
        namespace: &str,
        name: &str,
        options: &RequestOptions,
    ) -> Result<R, Error> {
        let identity = self.identity::<R>()?;
        let url = format_url(&self.endpoint, &identity, namespace, Some(name), options)?;
        let body = self
            .exchange(Method::GET, url, self.codec.content_type(), None)
            .await?;

        self.codec.decode(&body).map_err(Into::into)
    }

    /// List a collection of a resource, `L` is usually an `ObjectList<R>`.
    /// An empty `namespace` lists across all namespaces.
    ///
    /// Large collections come in pages when `limit` is set, the
    /// `continue` token of the returned list metadata fetches the next one.
    pub async fn list<L: ResourceList>(
        &self,
        namespace: &str,
        options: &RequestOptions,
    ) -> Result<L, Error> {
        let identity = self.identity::<L>()?;
        let url = format_url(&self.endpoint, &identity, namespace, None, options)?;
        let body = self
            .exchange(Method::GET, url, self.codec.content_type(), None)
            .await?;

        self.codec.decode(&body).map_err(Into::into)
    }

    /// Creates `resource` in its namespace, and returns what the server
    /// stored.
    pub async fn create<R: Resource>(&self, resource: &R) -> Result<R, Error> {
        let url = self.resource_url(resource, false, &RequestOptions::default())?;
        let body = self.codec.encode(resource)?;
        let body = self
            .exchange(Method::POST, url, self.codec.content_type(), Some(body))
            .await?;

        self.codec.decode(&body).map_err(Into::into)
    }

    /// Replaces `resource`, or one of its subresources. A stale
    /// `resourceVersion` is reported by the server as a conflict.
    pub async fn update<R: Resource>(
        &self,
        resource: &R,
        options: &RequestOptions,
    ) -> Result<R, Error> {
        let url = self.resource_url(resource, true, options)?;
        let body = self.codec.encode(resource)?;
        let body = self
            .exchange(Method::PUT, url, self.codec.content_type(), Some(body))
            .await?;

        self.codec.decode(&body).map_err(Into::into)
    }

    pub async fn delete<R: Resource>(
        &self,
        resource: &R,
        options: &RequestOptions,
    ) -> Result<(), Error> {
        let url = self.resource_url(resource, true, options)?;
        self.exchange(Method::DELETE, url, self.codec.content_type(), None)
            .await?;

        Ok(())
    }

    /// Opens a watch on the collection of `R`. With a `resource_version` in
    /// `options` the watch resumes after that version, otherwise the server
    /// starts with synthetic `ADDED` events for every existing object.
    ///
    /// The watch ends when the server closes it, typically after the
    /// `timeout`. Watch again from [`Watcher::resource_version`] to continue.
    pub async fn watch<R: Resource>(
        &self,
        namespace: &str,
        mut options: RequestOptions,
    ) -> Result<Watcher<R, C>, Error> {
        options.watch = true;

        let identity = self.identity::<R>()?;
        let url = format_url(&self.endpoint, &identity, namespace, None, &options)?;
        let resp = self
            .send(Method::GET, url, self.codec.content_type(), None)
            .await?;

        let (parts, body) = resp.into_parts();
        if !parts.status.is_success() {
            let body = read_body(body).await?;
            return Err(Error::Api(ErrorResponse::from_response(
                &self.codec,
                parts.status,
                &body,
            )));
        }

        Ok(Watcher::new(
            body,
            self.codec.clone(),
            options.resource_version.filter(|version| !version.is_empty()),
        ))
    }

    fn identity<R: 'static>(&self) -> Result<ResourceIdentity, Error> {
        self.registry
            .lookup::<R>()
            .ok_or_else(|| Error::UnregisteredType(std::any::type_name::<R>()))
    }

    async fn send(
        &self,
        method: Method,
        uri: String,
        accept: &'static str,
        body: Option<Bytes>,
    ) -> Result<Response<Body>, Error> {
        trace!(message = "doing http request", %method, uri = %uri);

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACCEPT, accept);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, self.codec.content_type());
        }
        let req = builder.body(body.unwrap_or_default())?;

        self.transport.send(req).await.map_err(Into::into)
    }

    /// Sends the request and reads the whole response body, non 2xx
    /// responses become [`Error::Api`].
    async fn exchange(
        &self,
        method: Method,
        uri: String,
        accept: &'static str,
        body: Option<Bytes>,
    ) -> Result<Bytes, Error> {
        let (parts, body) = self.send(method, uri, accept, body).await?.into_parts();
        let body = read_body(body).await?;

        if !parts.status.is_success() {
            return Err(Error::Api(ErrorResponse::from_response(
                &self.codec,
                parts.status,
                &body,
            )));
        }

        Ok(body)
    }
}

async fn read_body(body: Body) -> Result<Bytes, Error> {
    let buf = body
        .try_fold(BytesMut::new(), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk);
            Ok(buf)
        })
        .await
        .map_err(TransportError::Io)?;

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body() {
        let body = br#"{
  "kind": "Status",
  "apiVersion": "v1",
  "metadata": {},
  "status": "Failure",
  "message": "pods \"foo\" not found",
  "reason": "NotFound",
  "details": {"name": "foo", "kind": "pods"},
  "code": 404
}"#;

        let resp = ErrorResponse::from_response(&JsonCodec, StatusCode::NOT_FOUND, body);
        assert_eq!(
            resp,
            ErrorResponse {
                status: "Failure".into(),
                message: "pods \"foo\" not found".into(),
                reason: "NotFound".into(),
                code: 404,
            }
        );
        assert!(resp.is_not_found());
        assert!(!resp.is_conflict());
    }

    #[test]
    fn plain_text_body() {
        let resp = ErrorResponse::from_response(
            &JsonCodec,
            StatusCode::SERVICE_UNAVAILABLE,
            b"upstream connect error\n",
        );

        assert_eq!(resp.status, "Failure");
        assert_eq!(resp.message, "upstream connect error");
        assert_eq!(resp.reason, "ServiceUnavailable");
        assert_eq!(resp.code, 503);
    }

    #[test]
    fn partial_status() {
        let resp = ErrorResponse::from_response(
            &JsonCodec,
            StatusCode::GONE,
            br#"{"message": "too old resource version: 1 (5)"}"#,
        );

        assert_eq!(resp.code, 410);
        assert_eq!(resp.reason, "Gone");
        assert!(resp.is_gone());
    }

    #[test]
    fn display() {
        let err = Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "forbidden".into(),
            reason: "Forbidden".into(),
            code: 403,
        });

        assert_eq!(
            err.to_string(),
            "api server error, status: Failure, reason: Forbidden, message: forbidden"
        );
    }
}
