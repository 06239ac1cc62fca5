use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

/// ServiceReference holds a reference to Service.legacy.k8s.io
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ServiceReference {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

/// APIServiceSpec contains information for locating and communicating with a
/// server. Only https is supported, though you are able to disable
/// certificate verification.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct APIServiceSpec {
    /// A reference to the service for this API server, `None` means the API
    /// is handled locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceReference>,

    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub version: String,

    #[serde(
        default,
        rename = "insecureSkipTLSVerify",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub insecure_skip_tls_verify: bool,

    #[serde(rename = "groupPriorityMinimum")]
    pub group_priority_minimum: i32,

    #[serde(rename = "versionPriority")]
    pub version_priority: i32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct APIServiceCondition {
    #[serde(rename = "type")]
    pub typ: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct APIServiceStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<APIServiceCondition>,
}

/// APIService represents a server for a particular GroupVersion.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct APIService {
    pub metadata: ObjectMeta,

    pub spec: APIServiceSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<APIServiceStatus>,
}

crate::impl_resource!(APIService);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<APIService>(
        registry,
        "apiregistration.k8s.io",
        "v1",
        "apiservices",
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize() {
        let input = r#"{
            "metadata": {"name": "v1beta1.metrics.k8s.io", "resourceVersion": "812"},
            "spec": {
                "service": {"namespace": "kube-system", "name": "metrics-server", "port": 443},
                "group": "metrics.k8s.io",
                "version": "v1beta1",
                "insecureSkipTLSVerify": true,
                "groupPriorityMinimum": 100,
                "versionPriority": 100
            },
            "status": {
                "conditions": [{"type": "Available", "status": "True", "reason": "Passed"}]
            }
        }"#;

        let service = serde_json::from_str::<APIService>(input).unwrap();
        assert!(service.spec.insecure_skip_tls_verify);
        assert_eq!(service.spec.service.unwrap().name, "metrics-server");
        assert_eq!(service.status.unwrap().conditions[0].typ, "Available");
    }
}
