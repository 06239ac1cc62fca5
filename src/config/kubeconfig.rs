use std::path::{Path, PathBuf};

use rustls::RootCertStore;
use serde::Deserialize;

use super::tls;
use super::{Auth, Config, LoadDataError, RefreshableToken, load_base64_or_file};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read kube config
    #[error("failed to read '{1:?}': {0}")]
    ReadFile(#[source] std::io::Error, PathBuf),
    /// Failed to parse kube config YAML
    #[error("failed to parse kube config YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
    /// Failed to determine current context
    #[error("failed to determine current context")]
    CurrentContextNotSet,
    /// Failed to load current context
    #[error("failed to load current context: {0}")]
    LoadContext(String),
    /// Failed to load the cluster of context
    #[error("failed to load the cluster of context: {0}")]
    LoadClusterOfContext(String),
    /// Failed to find named user
    #[error("failed to find named user: {0}")]
    FindUser(String),
    /// Cluster url is missing on selected cluster
    #[error("cluster url is missing on selected cluster")]
    MissingClusterUrl,
    /// Failed to parse cluster uri
    #[error("failed to parse cluster url: {0}")]
    ParseClusterUri(#[source] http::uri::InvalidUri),
    /// Failed to load client certificate or key
    #[error("failed to load client identity: {0}")]
    LoadClientIdentity(#[source] LoadDataError),
    /// Only one of client certificate and client key is set
    #[error("client certificate and client key must be set together")]
    IncompleteClientIdentity,
    /// Failed to load certificate authority
    #[error("failed to load certificate authority: {0}")]
    LoadCertificateAuthority(#[source] LoadDataError),
    #[error("build tls config failed, {0}")]
    Tls(#[from] tls::Error),
}

/// Information that describes identity of a user.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AuthInfo {
    username: Option<String>,
    password: Option<String>,

    token: Option<String>,
    #[serde(rename = "tokenFile")]
    token_file: Option<PathBuf>,

    client_certificate: Option<PathBuf>,
    client_certificate_data: Option<String>,

    client_key: Option<PathBuf>,
    client_key_data: Option<String>,
}

#[derive(Deserialize)]
struct NamedAuthInfo {
    name: String,
    user: Option<AuthInfo>,
}

/// How to reach a cluster.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    /// The address of the kubernetes cluster (https://hostname:port)
    server: Option<String>,

    /// Skips the validity check for the server's certificate. This will make
    /// your HTTPS connections insecure.
    #[serde(default)]
    insecure_skip_tls_verify: bool,

    certificate_authority: Option<PathBuf>,
    certificate_authority_data: Option<String>,
}

#[derive(Deserialize)]
struct NamedCluster {
    name: String,
    cluster: Option<Cluster>,
}

/// A tuple of cluster and user.
#[derive(Clone, Debug, Deserialize)]
struct Context {
    cluster: String,
    user: String,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct NamedContext {
    name: String,
    context: Option<Context>,
}

/// The subset of `~/.kube/config` needed to build a [`Config`].
///
/// An analogue of the [config type from client-go](https://github.com/kubernetes/client-go/blob/7697067af71046b18e03dbda04e01a5bb17f9809/tools/clientcmd/api/types.go).
#[derive(Deserialize)]
struct KubeConfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,

    #[serde(default)]
    users: Vec<NamedAuthInfo>,

    #[serde(default)]
    contexts: Vec<NamedContext>,

    #[serde(rename = "current-context")]
    current_context: Option<String>,
}

/// The cluster, user and namespace selected by the current context.
struct Selected {
    cluster: Cluster,
    user: AuthInfo,
    namespace: String,
}

impl KubeConfig {
    fn select(self) -> Result<Selected, Error> {
        let context_name = self
            .current_context
            .filter(|name| !name.is_empty())
            .ok_or(Error::CurrentContextNotSet)?;
        let context = self
            .contexts
            .into_iter()
            .find(|named| named.name == context_name)
            .and_then(|named| named.context)
            .ok_or(Error::LoadContext(context_name))?;
        let cluster = self
            .clusters
            .into_iter()
            .find(|named| named.name == context.cluster)
            .and_then(|named| named.cluster)
            .ok_or_else(|| Error::LoadClusterOfContext(context.cluster.clone()))?;
        let user = self
            .users
            .into_iter()
            .find(|named| named.name == context.user)
            .and_then(|named| named.user)
            .ok_or_else(|| Error::FindUser(context.user.clone()))?;

        Ok(Selected {
            cluster,
            user,
            namespace: context
                .namespace
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| "default".to_string()),
        })
    }
}

pub fn load(path: &Path) -> Result<Config, Error> {
    let data = std::fs::read(path).map_err(|err| Error::ReadFile(err, path.into()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    build(&data, base)
}

/// Builds a [`Config`] out of kubeconfig YAML, relative file references are
/// resolved against `base`.
fn build(data: &[u8], base: &Path) -> Result<Config, Error> {
    let kubeconfig = serde_yaml::from_slice::<KubeConfig>(data).map_err(Error::Parse)?;
    let Selected {
        cluster,
        user,
        namespace,
    } = kubeconfig.select()?;

    let cluster_url = cluster
        .server
        .as_deref()
        .ok_or(Error::MissingClusterUrl)?
        .parse::<http::Uri>()
        .map_err(Error::ParseClusterUri)?;

    let resolve = |path: &Option<PathBuf>| path.as_ref().map(|path| base.join(path));

    let roots = match load_base64_or_file(
        cluster.certificate_authority_data.as_ref(),
        resolve(&cluster.certificate_authority).as_ref(),
    )
    .map_err(Error::LoadCertificateAuthority)?
    {
        Some(pem) => tls::root_store(&pem)?,
        // nothing gets verified anyway
        None if cluster.insecure_skip_tls_verify => RootCertStore::empty(),
        None => tls::native_root_store()?,
    };

    let cert = load_base64_or_file(
        user.client_certificate_data.as_ref(),
        resolve(&user.client_certificate).as_ref(),
    )
    .map_err(Error::LoadClientIdentity)?;
    let key = load_base64_or_file(
        user.client_key_data.as_ref(),
        resolve(&user.client_key).as_ref(),
    )
    .map_err(Error::LoadClientIdentity)?;
    let identity = match (cert, key) {
        (Some(cert), Some(mut key)) => {
            key.extend_from_slice(&cert);
            Some(key)
        }
        (None, None) => None,
        _ => return Err(Error::IncompleteClientIdentity),
    };

    let tls = tls::client_config(
        roots,
        identity.as_deref(),
        cluster.insecure_skip_tls_verify,
    )?;

    let auth = if let (Some(username), Some(password)) = (user.username, user.password) {
        Auth::Basic { username, password }
    } else if let Some(path) = resolve(&user.token_file) {
        let token = RefreshableToken::new(&path).map_err(|err| Error::ReadFile(err, path))?;
        Auth::RefreshableToken(token)
    } else if let Some(token) = user.token {
        Auth::Bearer { token }
    } else {
        Auth::None
    };

    Ok(Config {
        cluster_url,
        default_namespace: namespace,
        auth,
        tls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIND: &str = r#"
apiVersion: v1
clusters:
- cluster:
    certificate-authority-data: LS0tLS1CRUdJTiBDRVJ
    server: https://127.0.0.1:34139
  name: kind-kind
contexts:
- context:
    cluster: kind-kind
    user: kind-kind
  name: kind-kind
current-context: kind-kind
kind: Config
preferences: {}
users:
- name: kind-kind
  user:
    client-certificate-data: LS0tLS1CRUdJTiBDRVJUSUZ
    client-key-data: LS0tLS1CRUdJTiBSU0EgUFJJVkFURSB
"#;

    #[test]
    fn deserialize() {
        let config = serde_yaml::from_str::<KubeConfig>(KIND).unwrap();

        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.clusters[0].name, "kind-kind");
        let cluster = config.clusters[0].cluster.as_ref().unwrap();
        assert_eq!(cluster.server.as_deref(), Some("https://127.0.0.1:34139"));
        assert_eq!(
            cluster.certificate_authority_data.as_deref(),
            Some("LS0tLS1CRUdJTiBDRVJ")
        );

        assert_eq!(config.users.len(), 1);
        let user = config.users[0].user.as_ref().unwrap();
        assert_eq!(
            user.client_certificate_data.as_deref(),
            Some("LS0tLS1CRUdJTiBDRVJUSUZ")
        );
        assert_eq!(
            user.client_key_data.as_deref(),
            Some("LS0tLS1CRUdJTiBSU0EgUFJJVkFURSB")
        );

        let selected = config.select().unwrap();
        assert_eq!(selected.namespace, "default");
    }

    #[test]
    fn token_user() {
        let data = r#"
clusters:
- name: prod
  cluster:
    server: https://10.0.0.1:6443/
    insecure-skip-tls-verify: true
contexts:
- name: prod
  context:
    cluster: prod
    user: robot
    namespace: monitoring
current-context: prod
users:
- name: robot
  user:
    token: secret
"#;

        let config = build(data.as_bytes(), Path::new("/")).unwrap();
        assert_eq!(config.endpoint(), "https://10.0.0.1:6443");
        assert_eq!(config.default_namespace, "monitoring");
        assert!(matches!(config.auth, Auth::Bearer { ref token } if token == "secret"));
    }

    #[test]
    fn missing_context() {
        let data = r#"
clusters: []
contexts: []
users: []
current-context: nowhere
"#;
        assert!(matches!(
            build(data.as_bytes(), Path::new("/")),
            Err(Error::LoadContext(name)) if name == "nowhere"
        ));

        let data = "clusters: []\n";
        assert!(matches!(
            build(data.as_bytes(), Path::new("/")),
            Err(Error::CurrentContextNotSet)
        ));
    }
}
