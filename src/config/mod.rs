//! Where the cluster is and how to talk to it.
//!
//! [`Config::infer`] looks at `$KUBECONFIG`, then `~/.kube/config`, and
//! finally falls back to the service account mounted into pods.

mod incluster;
mod kubeconfig;
mod tls;

use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use headers::{Authorization, HeaderMapExt};
use http::Request;
use tracing::debug;

pub use incluster::Error as InClusterError;
pub use kubeconfig::Error as KubeConfigError;
pub use tls::Error as TlsError;

/// How long a token read from a file is trusted before it is read again.
const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Errors from loading data from a base64 string or a file
#[derive(Debug, thiserror::Error)]
pub enum LoadDataError {
    /// Failed to decode base64 data
    #[error("failed to decode base64 data: {0}")]
    DecodeBase64(#[source] base64::DecodeError),

    /// Failed to read file
    #[error("failed to read file '{1:?}': {0}")]
    ReadFile(#[source] std::io::Error, PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InCluster(#[from] incluster::Error),

    #[error(transparent)]
    KubeConfig(#[from] kubeconfig::Error),
}

struct CachedToken {
    token: String,
    expire_at: Instant,
}

/// A bearer token backed by a file which is rotated by someone else, e.g. the
/// projected service account token of a pod.
#[derive(Clone)]
pub struct RefreshableToken {
    path: PathBuf,
    cached: Arc<Mutex<CachedToken>>,
}

impl Debug for RefreshableToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshableToken")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RefreshableToken {
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let token = read_token(&path)?;

        Ok(RefreshableToken {
            path,
            cached: Arc::new(Mutex::new(CachedToken {
                token,
                expire_at: Instant::now() + TOKEN_REFRESH_INTERVAL,
            })),
        })
    }

    pub fn token(&self) -> std::io::Result<String> {
        let now = Instant::now();
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        if now >= cached.expire_at {
            cached.token = read_token(&self.path)?;
            cached.expire_at = now + TOKEN_REFRESH_INTERVAL;
        }

        Ok(cached.token.clone())
    }
}

fn read_token(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path).map(|token| token.trim().to_string())
}

/// Credentials attached to every request.
#[derive(Clone, Debug, Default)]
pub enum Auth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
    RefreshableToken(RefreshableToken),
}

impl Auth {
    pub fn apply<T>(&self, req: &mut Request<T>) -> std::io::Result<()> {
        let headers = req.headers_mut();

        match self {
            Auth::None => {}
            Auth::Basic { username, password } => {
                headers.typed_insert(Authorization::basic(username, password));
            }
            Auth::Bearer { token } => {
                headers.typed_insert(bearer(token)?);
            }
            Auth::RefreshableToken(refreshable) => {
                let token = refreshable.token()?;
                headers.typed_insert(bearer(&token)?);
            }
        }

        Ok(())
    }
}

fn bearer(token: &str) -> std::io::Result<Authorization<headers::authorization::Bearer>> {
    Authorization::bearer(token).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid bearer token, {err}"),
        )
    })
}

/// Cluster url, default namespace, credentials and TLS settings.
///
/// Prefer [`Config::infer`], the struct exists to be consumed by
/// [`HttpTransport`](crate::HttpTransport) and [`Client`](crate::Client).
#[derive(Debug)]
pub struct Config {
    /// The configured cluster url.
    pub cluster_url: http::Uri,

    /// The configured default namespace.
    pub default_namespace: String,

    /// Stores information to tell the cluster who you are.
    pub auth: Auth,

    pub tls: rustls::ClientConfig,
}

impl Config {
    /// Loads the kubeconfig named by `$KUBECONFIG` or found at
    /// `~/.kube/config`, and the in-cluster configuration if neither exists.
    pub fn infer() -> Result<Config, Error> {
        match kubeconfig_path() {
            Some(path) => {
                debug!(message = "loading kubeconfig", ?path);
                Self::from_kubeconfig(path)
            }
            None => {
                debug!(message = "no kubeconfig found, loading in-cluster config");
                Self::incluster()
            }
        }
    }

    pub fn from_kubeconfig(path: impl AsRef<Path>) -> Result<Config, Error> {
        kubeconfig::load(path.as_ref()).map_err(Into::into)
    }

    pub fn incluster() -> Result<Config, Error> {
        incluster::load().map_err(Into::into)
    }

    /// The cluster url without a trailing slash, ready to be prefixed to
    /// request paths.
    pub fn endpoint(&self) -> String {
        self.cluster_url
            .to_string()
            .trim_end_matches('/')
            .to_string()
    }
}

fn kubeconfig_path() -> Option<PathBuf> {
    if let Some(value) = std::env::var_os("KUBECONFIG") {
        if let Some(path) = std::env::split_paths(&value).find(|path| !path.as_os_str().is_empty())
        {
            return Some(path);
        }
    }

    let home = std::env::var_os("HOME")?;
    let path = Path::new(&home).join(".kube").join("config");
    path.exists().then_some(path)
}

fn load_base64_or_file(
    data: Option<&String>,
    file: Option<&PathBuf>,
) -> Result<Option<Vec<u8>>, LoadDataError> {
    use base64::Engine;

    if let Some(data) = data {
        return base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map(Some)
            .map_err(LoadDataError::DecodeBase64);
    }

    file.map(|path| std::fs::read(path).map_err(|err| LoadDataError::ReadFile(err, path.clone())))
        .transpose()
}
