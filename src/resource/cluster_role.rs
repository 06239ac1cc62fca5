use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

/// PolicyRule holds information that describes a policy rule, but does not
/// contain information about who the rule applies to or which namespace the
/// rule applies to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PolicyRule {
    pub verbs: Vec<String>,

    #[serde(default, rename = "apiGroups", skip_serializing_if = "Vec::is_empty")]
    pub api_groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    #[serde(
        default,
        rename = "resourceNames",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub resource_names: Vec<String>,

    #[serde(
        default,
        rename = "nonResourceURLs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub non_resource_urls: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AggregationRule {
    #[serde(rename = "clusterRoleSelectors", default)]
    pub cluster_role_selectors: Vec<BTreeMap<String, serde_json::Value>>,
}

/// ClusterRole is a cluster level, logical grouping of PolicyRules that can
/// be referenced as a unit by a RoleBinding or ClusterRoleBinding.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClusterRole {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,

    #[serde(
        default,
        rename = "aggregationRule",
        skip_serializing_if = "Option::is_none"
    )]
    pub aggregation_rule: Option<AggregationRule>,
}

crate::impl_resource!(ClusterRole);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<ClusterRole>(
        registry,
        "rbac.authorization.k8s.io",
        "v1",
        "clusterroles",
        false,
    )
}
