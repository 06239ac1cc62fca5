//! The HTTP exchange.
//!
//! The client builds requests and interprets responses, moving bytes is left
//! to a [`Transport`]. TLS, credentials and connection reuse are the
//! transport's business.

use std::error::Error as _;
use std::future::Future;
use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::config::{Auth, Config};

/// A streamed response body.
pub type Body = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] hyper_util::client::legacy::Error),

    #[error("apply credentials failed, {0}")]
    Auth(#[source] io::Error),

    #[error("io error, {0}")]
    Io(#[from] io::Error),
}

pub trait Transport: Send + Sync {
    /// Performs one exchange. The returned future resolves as soon as the
    /// response head arrives, the body is read lazily.
    fn send(
        &self,
        req: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Body>, TransportError>> + Send;
}

/// [`Transport`] on top of hyper, with rustls for TLS.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: HttpClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    auth: Auth,
}

impl HttpTransport {
    pub fn new(tls: rustls::ClientConfig, auth: Auth) -> Self {
        let mut inner = HttpConnector::new();
        inner.enforce_http(false);

        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http()
            .enable_http1()
            .wrap_connector(inner);

        let http_client = HttpClient::builder(TokioExecutor::new()).build(connector);

        HttpTransport { http_client, auth }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(config.tls, config.auth)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = req.into_parts();
        let mut req = Request::from_parts(parts, Full::new(body));
        self.auth.apply(&mut req).map_err(TransportError::Auth)?;

        let resp = self.http_client.request(req).await?;
        let (parts, incoming) = resp.into_parts();
        let body = incoming.into_data_stream().map_err(body_error).boxed();

        Ok(Response::from_parts(parts, body))
    }
}

/// The connection going away in the middle of the body, which is how dropped
/// watch connections show up, becomes [`io::ErrorKind::UnexpectedEof`].
///
/// hyper reports it as an incomplete message when it happens between chunks
/// and wraps the socket's `UnexpectedEof` when it happens inside one.
fn body_error(err: hyper::Error) -> io::Error {
    let unexpected_eof = std::iter::successors(err.source(), |err| (*err).source()).any(|err| {
        err.downcast_ref::<io::Error>()
            .is_some_and(|err| err.kind() == io::ErrorKind::UnexpectedEof)
    });

    if err.is_incomplete_message() || unexpected_eof {
        io::Error::new(io::ErrorKind::UnexpectedEof, err)
    } else {
        io::Error::other(err)
    }
}
