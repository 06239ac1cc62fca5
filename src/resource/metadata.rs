use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// OwnerReference contains enough information to let you identify an owning
/// object. An owning object must be in the same namespace as the dependent,
/// or be cluster-scoped, so there is no namespace field.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OwnerReference {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    pub kind: String,

    pub name: String,

    pub uid: String,

    /// If true, this reference points to the managing controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
}

/// ObjectMeta is metadata that all persisted resources must have, which
/// includes all objects users must create.
///
/// Empty strings and maps are treated as "not set", they are skipped when
/// the object is encoded so the server can fill them in.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#objectmeta-v1-meta
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ObjectMeta {
    /// Name must be unique within a namespace. Is required when creating
    /// resources, although some resources may allow a client to request the
    /// generation of an appropriate name automatically.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// An optional prefix, used by the server, to generate a unique name ONLY
    /// IF the Name field has not been provided.
    #[serde(
        default,
        rename = "generateName",
        skip_serializing_if = "String::is_empty"
    )]
    pub generate_name: String,

    /// Namespace defines the space within which each name must be unique. An
    /// empty namespace is equivalent to the "default" namespace for namespaced
    /// resources, and it is ignored for cluster scoped ones.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// UID is the unique in time and space value for this object.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    /// An opaque value that represents the internal version of this object
    /// that can be used by clients to determine when objects have changed.
    /// It is used for optimistic concurrency, change detection, and the watch
    /// operation on a resource or set of resources.
    #[serde(
        default,
        rename = "resourceVersion",
        skip_serializing_if = "String::is_empty"
    )]
    pub resource_version: String,

    /// A sequence number representing a specific generation of the desired state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,

    #[serde(
        default,
        rename = "creationTimestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_timestamp: Option<String>,

    #[serde(
        default,
        rename = "deletionTimestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub deletion_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(
        default,
        rename = "ownerReferences",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub owner_references: Vec<OwnerReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

impl ObjectMeta {
    /// Shorthand for metadata which only carries a namespace and a name.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ObjectMeta {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// ListMeta describes metadata that synthetic resources must have, including
/// lists and various status objects.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ListMeta {
    /// String that identifies the server's internal version of this object,
    /// it can be used to start a watch right after the list.
    #[serde(
        default,
        rename = "resourceVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_version: Option<String>,

    /// Set if the user set a limit on the number of items returned, and
    /// indicates that the server has more data available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#continue: Option<String>,

    /// The number of subsequent items in the list which are not included in
    /// this list response.
    #[serde(
        default,
        rename = "remainingItemCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub remaining_item_count: Option<i64>,
}
