mod api_service;
mod cluster_role;
mod config_map;
mod deployment;
mod endpoints;
mod ingress;
mod metadata;
mod namespace;
mod pod;
mod token_review;

pub use api_service::{
    APIService, APIServiceCondition, APIServiceSpec, APIServiceStatus, ServiceReference,
};
pub use cluster_role::{AggregationRule, ClusterRole, PolicyRule};
pub use config_map::ConfigMap;
pub use deployment::{
    Deployment, DeploymentSpec, DeploymentStatus, LabelSelector, PodTemplateSpec,
};
pub use endpoints::{EndpointAddress, EndpointPort, EndpointSubset, Endpoints};
pub use ingress::{
    HttpIngressPath, HttpIngressRuleValue, Ingress, IngressRule, IngressSpec, IngressTLS,
};
pub use metadata::{ListMeta, ObjectMeta, OwnerReference};
pub use namespace::{Namespace, NamespaceSpec, NamespaceStatus};
pub use pod::{Container, ContainerPort, Pod, PodSpec, PodStatus};
pub use token_review::{TokenReview, TokenReviewSpec, TokenReviewStatus, UserInfo};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::registry::{Registry, RegistryError};

/// An accessor trait for a kubernetes Resource.
///
/// Every typed object carries an [`ObjectMeta`], the URL builder and the
/// watcher only ever look at a resource through these accessors. Where the
/// resource lives in the API is not part of the type, it is recorded in a
/// [`Registry`].
pub trait Resource: Serialize + DeserializeOwned + Send + 'static {
    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

/// The list counterpart of a [`Resource`], e.g. `PodList`.
pub trait ResourceList: DeserializeOwned + Send + 'static {
    fn list_metadata(&self) -> &ListMeta;
}

/// A generic Kubernetes object list
///
/// This is used instead of a full struct for `DeploymentList`, `PodList`, etc.
/// Kubernetes' API always exposes list structs in this manner, so one generic
/// type covers every registered resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ObjectList<T> {
    /// ListMeta - only really used for its `resourceVersion` and `continue`
    #[serde(default)]
    pub metadata: ListMeta,

    /// These items we are actually interested in. Servers send `null` for
    /// empty collections.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> ResourceList for ObjectList<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn list_metadata(&self) -> &ListMeta {
        &self.metadata
    }
}

impl<T> IntoIterator for ObjectList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Implements [`Resource`] for a struct with a `metadata: ObjectMeta` field.
#[macro_export]
macro_rules! impl_resource {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Resource for $ty {
                fn metadata(&self) -> &$crate::ObjectMeta {
                    &self.metadata
                }

                fn metadata_mut(&mut self) -> &mut $crate::ObjectMeta {
                    &mut self.metadata
                }
            }
        )+
    };
}

/// Registers `R` and `ObjectList<R>` under the same coordinates.
pub fn register_with_list<R: Resource>(
    registry: &Registry,
    group: &str,
    version: &str,
    plural: &str,
    namespaced: bool,
) -> Result<(), RegistryError> {
    registry.register::<R>(group, version, plural, namespaced)?;
    registry.register_list::<ObjectList<R>>(group, version, plural, namespaced)
}

/// Registers every resource type shipped with this crate.
pub fn register_builtin(registry: &Registry) -> Result<(), RegistryError> {
    pod::register(registry)?;
    config_map::register(registry)?;
    namespace::register(registry)?;
    endpoints::register(registry)?;
    deployment::register(registry)?;
    ingress::register(registry)?;
    cluster_role::register(registry)?;
    token_review::register(registry)?;
    api_service::register(registry)
}
