use std::time::Duration;

use crate::client::Error;
use crate::registry::{Registry, ResourceIdentity};
use crate::resource::Resource;

/// Controls how the resource version parameter is applied for list calls
///
/// Not specifying a `VersionMatch` strategy will give you different semantics
/// depending on what `resource_version`, `limit`, `continue_token` you include
/// with the list request.
///
/// See <https://kubernetes.io/docs/reference/using-api/api-concepts/#semantics-for-get-and-list> for details.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionMatch {
    /// Returns data at least as new as the provided resource version.
    ///
    /// A resource version of "0" degenerates into "any version", which may be
    /// served from a stale cache.
    NotOlderThan,

    /// Return data at the exact resource version provided.
    ///
    /// If the provided resource version is unavailable, the server responds with HTTP 410
    /// "Gone". `Exact` cannot be used with resource version "0".
    Exact,
}

impl VersionMatch {
    fn as_str(&self) -> &'static str {
        match self {
            VersionMatch::NotOlderThan => "NotOlderThan",
            VersionMatch::Exact => "Exact",
        }
    }
}

/// Optional modifiers of a request URL.
///
/// Options accumulate, setting one twice keeps the last value. Whatever order
/// they were set in, the query string is always rendered in the same order:
/// `timeoutSeconds`, `resourceVersion`, `labelSelector`, `fieldSelector`,
/// `continue`, `watch`, `limit`, `resourceVersionMatch`, `allowWatchBookmarks`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    /// Appended to the path after the object name, e.g. `status` or `scale`.
    pub subresource: Option<String>,

    /// Server side timeout of the call, sent as whole seconds.
    ///
    /// This limits the duration of the call, regardless of any activity or inactivity.
    pub timeout: Option<Duration>,

    /// An explicit resourceVersion, also the cursor a watch resumes from.
    ///
    /// See <https://kubernetes.io/docs/reference/using-api/api-concepts/#resource-versions> for details.
    pub resource_version: Option<String>,

    /// A selector to restrict the list of returned objects by their labels.
    pub label_selector: Option<String>,

    /// A selector to restrict the list of returned objects by their fields.
    pub field_selector: Option<String>,

    /// Fetch the next page of results.
    ///
    /// After listing results with a limit, a continue token can be used to fetch
    /// another page of results.
    pub continue_token: Option<String>,

    /// Turns the request into a watch.
    pub watch: bool,

    /// Limit the number of results
    ///
    /// If there are more results, the server will respond with a continue token
    /// which can be used to fetch another page of results.
    pub limit: Option<u32>,

    /// Determines how resourceVersion is matched applied to list calls
    pub version_match: Option<VersionMatch>,

    /// Enables watch events with type "BOOKMARK"
    ///
    /// Servers that do not implement bookmarks ignore this flag, and bookmarks
    /// are sent at the server's discretion.
    pub bookmarks: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.resource_version = Some(resource_version.into());
        self
    }

    pub fn label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }

    pub fn field_selector(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = Some(selector.into());
        self
    }

    pub fn continue_token(mut self, token: impl Into<String>) -> Self {
        self.continue_token = Some(token.into());
        self
    }

    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn version_match(mut self, version_match: VersionMatch) -> Self {
        self.version_match = Some(version_match);
        self
    }

    pub fn bookmarks(mut self) -> Self {
        self.bookmarks = true;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        match (non_empty(&self.resource_version), self.version_match) {
            (Some("0"), Some(VersionMatch::Exact)) => Err(Error::Validation(
                "A non-zero resource_version is required when using an Exact match".into(),
            )),
            (None, Some(_)) => Err(Error::Validation(
                "A resource_version is required when using an explicit match".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Renders the query string, without the leading `?`.
    pub(crate) fn query(&self) -> String {
        let mut builder = form_urlencoded::Serializer::new(String::new());

        if let Some(timeout) = self.timeout {
            let secs = timeout.as_secs_f64().round() as u64;
            builder.append_pair("timeoutSeconds", &secs.to_string());
        }
        if let Some(resource_version) = non_empty(&self.resource_version) {
            builder.append_pair("resourceVersion", resource_version);
        }
        if let Some(label_selector) = non_empty(&self.label_selector) {
            builder.append_pair("labelSelector", label_selector);
        }
        if let Some(field_selector) = non_empty(&self.field_selector) {
            builder.append_pair("fieldSelector", field_selector);
        }
        if let Some(continue_token) = non_empty(&self.continue_token) {
            builder.append_pair("continue", continue_token);
        }
        if self.watch {
            builder.append_pair("watch", "true");
        }
        if let Some(limit) = self.limit {
            builder.append_pair("limit", &limit.to_string());
        }
        if let Some(version_match) = self.version_match {
            builder.append_pair("resourceVersionMatch", version_match.as_str());
        }
        if self.bookmarks {
            builder.append_pair("allowWatchBookmarks", "true");
        }

        builder.finish()
    }
}

#[inline]
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Renders the URL of `resource`.
///
/// With `with_name` the URL addresses the object itself, otherwise the
/// collection it belongs to. Fails with [`Error::UnregisteredType`] if `R` is
/// unknown to `registry`.
pub fn resource_url<R: Resource>(
    registry: &Registry,
    endpoint: &str,
    resource: &R,
    with_name: bool,
    options: &RequestOptions,
) -> Result<String, Error> {
    let identity = registry
        .lookup::<R>()
        .ok_or_else(|| Error::UnregisteredType(std::any::type_name::<R>()))?;
    let metadata = resource.metadata();
    let name = with_name.then_some(metadata.name.as_str());

    format_url(endpoint, &identity, &metadata.namespace, name, options)
}

/// Renders `{endpoint}[/api/{version} | /apis/{group}/{version}][/namespaces/{ns}]/{plural}[/{name}][/{subresource}][?{query}]`.
///
/// An empty `namespace` addresses every namespace, and it is ignored for
/// cluster scoped identities. `Some("")` as name fails with [`Error::MissingName`].
pub fn format_url(
    endpoint: &str,
    identity: &ResourceIdentity,
    namespace: &str,
    name: Option<&str>,
    options: &RequestOptions,
) -> Result<String, Error> {
    options.validate()?;

    let mut url = String::with_capacity(endpoint.len() + 64);
    url.push_str(endpoint);

    if identity.group.is_empty() {
        url.push_str("/api/");
    } else {
        url.push_str("/apis/");
        url.push_str(&identity.group);
        url.push('/');
    }
    url.push_str(&identity.version);

    if identity.namespaced && !namespace.is_empty() {
        url.push_str("/namespaces/");
        url.push_str(namespace);
    }

    url.push('/');
    url.push_str(&identity.plural);

    if let Some(name) = name {
        if name.is_empty() {
            return Err(Error::MissingName);
        }

        url.push('/');
        url.push_str(name);
    }

    if let Some(subresource) = non_empty(&options.subresource) {
        url.push('/');
        url.push_str(subresource);
    }

    let query = options.query();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::resource::ObjectMeta;

    #[derive(Default, Deserialize, Serialize)]
    struct Pod {
        metadata: ObjectMeta,
    }

    #[derive(Default, Deserialize, Serialize)]
    struct Deployment {
        metadata: ObjectMeta,
    }

    #[derive(Default, Deserialize, Serialize)]
    struct ClusterRole {
        metadata: ObjectMeta,
    }

    #[derive(Default, Deserialize, Serialize)]
    struct Unknown {
        metadata: ObjectMeta,
    }

    crate::impl_resource!(Pod, Deployment, ClusterRole, Unknown);

    fn registry() -> Registry {
        let registry = Registry::new();
        registry.register::<Pod>("", "v1", "pods", true).unwrap();
        registry
            .register::<Deployment>("apps", "v1beta2", "deployments", true)
            .unwrap();
        registry
            .register::<ClusterRole>("rbac.authorization.k8s.io", "v1", "clusterroles", false)
            .unwrap();
        registry
    }

    fn pod() -> Pod {
        Pod {
            metadata: ObjectMeta::named("my-namespace", "my-pod"),
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            metadata: ObjectMeta::named("my-namespace", "my-deployment"),
        }
    }

    const ENDPOINT: &str = "https://example.com";

    #[test]
    fn resource_urls() {
        let registry = registry();

        for (name, got, want) in [
            (
                "pod",
                resource_url(&registry, ENDPOINT, &pod(), false, &RequestOptions::new()),
                "https://example.com/api/v1/namespaces/my-namespace/pods",
            ),
            (
                "deployment",
                resource_url(&registry, ENDPOINT, &deployment(), false, &RequestOptions::new()),
                "https://example.com/apis/apps/v1beta2/namespaces/my-namespace/deployments",
            ),
            (
                "deployment-with-name",
                resource_url(&registry, ENDPOINT, &deployment(), true, &RequestOptions::new()),
                "https://example.com/apis/apps/v1beta2/namespaces/my-namespace/deployments/my-deployment",
            ),
            (
                "deployment-with-subresource",
                resource_url(
                    &registry,
                    ENDPOINT,
                    &deployment(),
                    true,
                    &RequestOptions::new().subresource("status"),
                ),
                "https://example.com/apis/apps/v1beta2/namespaces/my-namespace/deployments/my-deployment/status",
            ),
            (
                "pod-with-timeout",
                resource_url(
                    &registry,
                    ENDPOINT,
                    &pod(),
                    false,
                    &RequestOptions::new().timeout(Duration::from_secs(60)),
                ),
                "https://example.com/api/v1/namespaces/my-namespace/pods?timeoutSeconds=60",
            ),
            (
                "pod-with-resource-version",
                resource_url(
                    &registry,
                    ENDPOINT,
                    &pod(),
                    false,
                    &RequestOptions::new().resource_version("foo"),
                ),
                "https://example.com/api/v1/namespaces/my-namespace/pods?resourceVersion=foo",
            ),
        ] {
            assert_eq!(got.unwrap(), want, "{name}");
        }
    }

    #[test]
    fn deterministic() {
        let registry = registry();
        let options = RequestOptions::new()
            .label_selector("app=web")
            .timeout(Duration::from_secs(30))
            .watch();

        let first = resource_url(&registry, ENDPOINT, &pod(), false, &options).unwrap();
        let second = resource_url(&registry, ENDPOINT, &pod(), false, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_namespace() {
        let registry = registry();
        let pod = Pod {
            metadata: ObjectMeta::named("", "my-pod"),
        };

        assert_eq!(
            resource_url(&registry, ENDPOINT, &pod, false, &RequestOptions::new()).unwrap(),
            "https://example.com/api/v1/pods"
        );
    }

    #[test]
    fn cluster_scoped_ignores_namespace() {
        let registry = registry();
        let role = ClusterRole {
            metadata: ObjectMeta::named("my-namespace", "admin"),
        };

        assert_eq!(
            resource_url(&registry, ENDPOINT, &role, true, &RequestOptions::new()).unwrap(),
            "https://example.com/apis/rbac.authorization.k8s.io/v1/clusterroles/admin"
        );
    }

    #[test]
    fn missing_name() {
        let registry = registry();
        let pod = Pod {
            metadata: ObjectMeta::named("my-namespace", ""),
        };

        let err = resource_url(&registry, ENDPOINT, &pod, true, &RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingName));

        // the collection URL doesn't need one
        assert!(resource_url(&registry, ENDPOINT, &pod, false, &RequestOptions::new()).is_ok());
    }

    #[test]
    fn unregistered() {
        let err = resource_url(
            &registry(),
            ENDPOINT,
            &Unknown::default(),
            false,
            &RequestOptions::new(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnregisteredType(name) if name.ends_with("Unknown")));
    }

    #[test]
    fn canonical_query_order() {
        let want = "timeoutSeconds=10&resourceVersion=42&labelSelector=app%3Dweb&fieldSelector=spec.nodeName%3Dnode-1&continue=token&watch=true&limit=5&resourceVersionMatch=NotOlderThan&allowWatchBookmarks=true";

        let forward = RequestOptions::new()
            .timeout(Duration::from_secs(10))
            .resource_version("42")
            .label_selector("app=web")
            .field_selector("spec.nodeName=node-1")
            .continue_token("token")
            .watch()
            .limit(5)
            .version_match(VersionMatch::NotOlderThan)
            .bookmarks();
        let backward = RequestOptions::new()
            .bookmarks()
            .version_match(VersionMatch::NotOlderThan)
            .limit(5)
            .watch()
            .continue_token("token")
            .field_selector("spec.nodeName=node-1")
            .label_selector("app=web")
            .resource_version("42")
            .timeout(Duration::from_secs(10));

        assert_eq!(forward.query(), want);
        assert_eq!(backward.query(), want);
    }

    #[test]
    fn empty_values_are_omitted() {
        let options = RequestOptions::new()
            .resource_version("")
            .label_selector("")
            .subresource("");

        assert_eq!(options.query(), "");
        assert_eq!(
            resource_url(&registry(), ENDPOINT, &pod(), true, &options).unwrap(),
            "https://example.com/api/v1/namespaces/my-namespace/pods/my-pod"
        );
    }

    #[test]
    fn timeout_rounding() {
        for (timeout, want) in [
            (Duration::from_millis(1499), "timeoutSeconds=1"),
            (Duration::from_millis(1500), "timeoutSeconds=2"),
            (Duration::from_secs(290), "timeoutSeconds=290"),
        ] {
            assert_eq!(RequestOptions::new().timeout(timeout).query(), want);
        }
    }

    #[test]
    fn last_value_wins() {
        let options = RequestOptions::new()
            .resource_version("1")
            .resource_version("2");

        assert_eq!(options.query(), "resourceVersion=2");
    }

    #[test]
    fn version_match_validation() {
        let identity = ResourceIdentity::new("", "v1", "pods", true);

        let options = RequestOptions::new().version_match(VersionMatch::Exact);
        assert!(matches!(
            format_url("", &identity, "", None, &options),
            Err(Error::Validation(_))
        ));

        let options = options.resource_version("0");
        assert!(matches!(
            format_url("", &identity, "", None, &options),
            Err(Error::Validation(_))
        ));

        let options = options.resource_version("10");
        assert_eq!(
            format_url("", &identity, "", None, &options).unwrap(),
            "/api/v1/pods?resourceVersion=10&resourceVersionMatch=Exact"
        );
    }
}
