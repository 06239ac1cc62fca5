use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NamespaceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NamespaceStatus {
    /// Phase is the current lifecycle phase of the namespace, `Active` or
    /// `Terminating`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// Namespace provides a scope for Names. Namespaces themselves are cluster
/// scoped.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Namespace {
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<NamespaceSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NamespaceStatus>,
}

crate::impl_resource!(Namespace);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<Namespace>(registry, "", "v1", "namespaces", false)
}
