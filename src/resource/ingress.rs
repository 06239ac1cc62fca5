use serde::{Deserialize, Serialize};

use super::{ObjectMeta, register_with_list};
use crate::registry::{Registry, RegistryError};

/// IngressTLS describes the transport layer security associated with an ingress.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#ingresstls-v1-networking-k8s-io
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IngressTLS {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(
        default,
        rename = "secretName",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_name: Option<String>,
}

/// HTTPIngressPath associates a path with a backend.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct HttpIngressPath {
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "pathType", skip_serializing_if = "Option::is_none")]
    pub path_type: Option<String>,
}

/// HTTPIngressRuleValue is a list of http selectors pointing to backends.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct HttpIngressRuleValue {
    pub paths: Vec<HttpIngressPath>,
}

/// IngressRule represents the rules mapping the paths under a specified host
/// to the related backend services.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IngressRule {
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpIngressRuleValue>,
}

/// IngressSpec describes the Ingress the user wishes to exist.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct IngressSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<IngressTLS>,
    #[serde(default)]
    pub rules: Vec<IngressRule>,
    #[serde(
        default,
        rename = "ingressClassName",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingress_class_name: Option<String>,
}

/// Ingress is a collection of rules that allow inbound connections to reach
/// the endpoints defined by a backend.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#ingress-v1-networking-k8s-io
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Ingress {
    /// Standard object's metadata.
    ///
    /// More info: https://git.k8s.io/community/contributors/devel/sig-architecture/api-conventions.md#metadata
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: IngressSpec,
}

crate::impl_resource!(Ingress);

pub(super) fn register(registry: &Registry) -> Result<(), RegistryError> {
    register_with_list::<Ingress>(registry, "networking.k8s.io", "v1", "ingresses", true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ObjectList;
    use crate::url::{RequestOptions, resource_url};

    #[test]
    fn deserialize() {
        let data = r#"
{
  "kind": "IngressList",
  "apiVersion": "networking.k8s.io/v1",
  "metadata": {
    "resourceVersion": "351452"
  },
  "items": [
    {
      "metadata": {
        "name": "test-ingress",
        "namespace": "default",
        "uid": "6d3f38f9-de89-4bc9-b273-c8faf74e8a27",
        "resourceVersion": "351445",
        "generation": 1,
        "creationTimestamp": "2020-04-13T16:43:52Z"
      },
      "spec": {
        "rules": [
          {
            "host": "foobar",
            "http": {"paths": [{"path": "/", "pathType": "Prefix"}]}
          }
        ],
        "ingressClassName": "foo-class"
      },
      "status": {
        "loadBalancer": {
          "ingress": [
            {
              "ip": "172.17.0.2"
            }
          ]
        }
      }
    }
  ]
}"#;

        let list = serde_json::from_str::<ObjectList<Ingress>>(data).unwrap();
        let spec = &list.items[0].spec;
        assert_eq!(spec.ingress_class_name.as_deref(), Some("foo-class"));
        assert_eq!(spec.rules[0].http.as_ref().unwrap().paths[0].path, "/");
    }

    #[test]
    fn url() {
        let registry = Registry::new();
        register(&registry).unwrap();

        let options = RequestOptions::default();
        let mut ingress = Ingress::default();
        assert_eq!(
            resource_url(&registry, "", &ingress, false, &options).unwrap(),
            "/apis/networking.k8s.io/v1/ingresses"
        );

        ingress.metadata.namespace = "foo".into();
        assert_eq!(
            resource_url(&registry, "", &ingress, false, &options).unwrap(),
            "/apis/networking.k8s.io/v1/namespaces/foo/ingresses"
        );
    }
}
