use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use super::tls;
use super::{Auth, Config, RefreshableToken};

const SERVICE_HOSTENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORTENV: &str = "KUBERNETES_SERVICE_PORT";

// Mounted credential files
const SERVICE_TOKENFILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_CERTFILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
const SERVICE_DEFAULT_NS: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Errors from loading in-cluster config
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read the default namespace for the service account
    #[error("failed to read the default namespace: {0}")]
    ReadDefaultNamespace(#[source] std::io::Error),

    /// Failed to read the in-cluster environment variables
    #[error("failed to read an in-cluster environment variable {0}, {1}")]
    ReadEnvironmentVariable(&'static str, #[source] env::VarError),

    /// Failed to read a certificate
    #[error("failed to read the certificate file {0}")]
    ReadCertificate(#[source] std::io::Error),

    /// Failed to parse cluster port value
    #[error("failed to parse cluster port: {0}")]
    ParseClusterPort(#[source] std::num::ParseIntError),

    /// Failed to parse cluster url
    #[error("failed to parse cluster uri: {0}")]
    ParseClusterUri(#[source] http::uri::InvalidUri),

    /// Failed to read token file
    #[error("failed to read token file: '{1:?}': {0}")]
    ReadTokenFile(#[source] std::io::Error, PathBuf),

    #[error("build tls config failed, {0}")]
    Tls(#[from] tls::Error),
}

pub fn load() -> Result<Config, Error> {
    let host = env::var(SERVICE_HOSTENV)
        .map_err(|err| Error::ReadEnvironmentVariable(SERVICE_HOSTENV, err))?;
    let port = env::var(SERVICE_PORTENV)
        .map_err(|err| Error::ReadEnvironmentVariable(SERVICE_PORTENV, err))?
        .parse::<u16>()
        .map_err(Error::ParseClusterPort)?;
    let cluster_url = cluster_url(&host, port)?;

    let default_namespace = std::fs::read_to_string(SERVICE_DEFAULT_NS)
        .map_err(Error::ReadDefaultNamespace)?
        .trim()
        .to_string();

    let ca = std::fs::read(SERVICE_CERTFILE).map_err(Error::ReadCertificate)?;
    let tls = tls::client_config(tls::root_store(&ca)?, None, false)?;

    let token = RefreshableToken::new(SERVICE_TOKENFILE)
        .map_err(|err| Error::ReadTokenFile(err, SERVICE_TOKENFILE.into()))?;

    Ok(Config {
        cluster_url,
        default_namespace,
        auth: Auth::RefreshableToken(token),
        tls,
    })
}

/// Formats the API server address, bracketing IPv6 hosts and leaving out
/// the default https port.
fn cluster_url(host: &str, port: u16) -> Result<http::Uri, Error> {
    let host = match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{ip}]"),
        _ => host.to_string(),
    };

    let uri = if port == 443 {
        format!("https://{host}")
    } else {
        format!("https://{host}:{port}")
    };

    uri.parse().map_err(Error::ParseClusterUri)
}
