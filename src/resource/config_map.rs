use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

/// ConfigMap holds configuration data for pods to consume.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#configmap-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ConfigMap {
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    /// Base64 encoded values, kept encoded.
    #[serde(
        default,
        rename = "binaryData",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub binary_data: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
}

crate::impl_resource!(ConfigMap);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<ConfigMap>(registry, "", "v1", "configmaps", true)
}
