use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

/// EndpointAddress is a single IP address of an endpoint.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#endpointaddress-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EndpointAddress {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    pub ip: String,
    #[serde(default, rename = "nodeName", skip_serializing_if = "String::is_empty")]
    pub node_name: String,
}

/// EndpointPort is a tuple that describes a single port.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#endpointport-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EndpointPort {
    #[serde(
        default,
        rename = "appProtocol",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_protocol: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub port: u16,
    #[serde(default)]
    pub protocol: String,
}

/// EndpointSubset is a group of addresses with a common set of ports.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#endpointsubset-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EndpointSubset {
    #[serde(default)]
    pub addresses: Vec<EndpointAddress>,
    #[serde(
        default,
        rename = "notReadyAddresses",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub not_ready_addresses: Vec<EndpointAddress>,
    #[serde(default)]
    pub ports: Vec<EndpointPort>,
}

/// Endpoints is a collection of endpoints that implement the actual service.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#endpoints-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Endpoints {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub subsets: Vec<EndpointSubset>,
}

crate::impl_resource!(Endpoints);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<Endpoints>(registry, "", "v1", "endpoints", true)
}
