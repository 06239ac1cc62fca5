use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ObjectMeta;
use crate::registry::{Registry, RegistryError};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TokenReviewSpec {
    /// Token is the opaque bearer token.
    pub token: String,

    /// A list of identifiers that the resource server presented with the
    /// token identifies as.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
}

/// UserInfo holds the information about the user needed to implement the
/// user.Info interface.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TokenReviewStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: UserInfo,
    #[serde(default)]
    pub audiences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// TokenReview attempts to authenticate a token to a known user. Only
/// `create` is served for it, the response carries the status.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TokenReview {
    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: TokenReviewSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TokenReviewStatus>,
}

crate::impl_resource!(TokenReview);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    registry.register::<TokenReview>("authentication.k8s.io", "v1", "tokenreviews", false)
}
