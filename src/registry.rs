use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::resource::{Resource, ResourceList};

/// The API coordinates of a resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    /// The group of the resource, or the empty string for the core group.
    pub group: String,

    /// The version of the resource, e.g. `v1`.
    pub version: String,

    /// The plural of this resource, which is used to construct URLs.
    pub plural: String,

    /// Whether the resource lives in a namespace.
    pub namespaced: bool,
}

impl ResourceIdentity {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        plural: impl Into<String>,
        namespaced: bool,
    ) -> Self {
        ResourceIdentity {
            group: group.into(),
            version: version.into(),
            plural: plural.into(),
            namespaced,
        }
    }

    /// The `apiVersion` field value of objects of this identity, e.g.
    /// `v1` or `apps/v1`.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl Display for ResourceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, Resource={}", self.api_version(), self.plural)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A single object, e.g. `Pod`
    Object,
    /// A collection, e.g. `ObjectList<Pod>`
    List,
}

/// What the registry knows about one Rust type.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryEntry {
    pub identity: ResourceIdentity,
    pub kind: EntryKind,
    pub type_name: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{type_name} is already registered as {existing}, refusing to register it as {requested}")]
    Conflict {
        type_name: &'static str,
        existing: ResourceIdentity,
        requested: ResourceIdentity,
    },
}

/// A table from Rust types to the coordinates of the resource they represent.
///
/// A registry is filled once while the process starts, usually through
/// [`register_builtin`](crate::resource::register_builtin) plus the
/// registration functions of any custom resource, and is then shared with
/// every [`Client`](crate::Client). Lookups take a read lock only, writers
/// are serialized.
///
/// Registering a type again with the same coordinates is a no-op, registering
/// it with different coordinates is rejected.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, RegistryEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the coordinates of a single object type.
    pub fn register<R: Resource>(
        &self,
        group: &str,
        version: &str,
        plural: &str,
        namespaced: bool,
    ) -> Result<(), RegistryError> {
        self.insert::<R>(
            ResourceIdentity::new(group, version, plural, namespaced),
            EntryKind::Object,
        )
    }

    /// Records the coordinates of a list type, e.g. `ObjectList<Pod>`.
    pub fn register_list<L: ResourceList>(
        &self,
        group: &str,
        version: &str,
        plural: &str,
        namespaced: bool,
    ) -> Result<(), RegistryError> {
        self.insert::<L>(
            ResourceIdentity::new(group, version, plural, namespaced),
            EntryKind::List,
        )
    }

    fn insert<T: 'static>(
        &self,
        identity: ResourceIdentity,
        kind: EntryKind,
    ) -> Result<(), RegistryError> {
        let type_name = type_name::<T>();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(&TypeId::of::<T>()) {
            if existing.identity == identity && existing.kind == kind {
                return Ok(());
            }

            return Err(RegistryError::Conflict {
                type_name,
                existing: existing.identity.clone(),
                requested: identity,
            });
        }

        trace!(message = "register resource", type_name, %identity);

        entries.insert(
            TypeId::of::<T>(),
            RegistryEntry {
                identity,
                kind,
                type_name,
            },
        );

        Ok(())
    }

    /// Resolves `T` to its coordinates, `None` if `T` was never registered.
    pub fn lookup<T: 'static>(&self) -> Option<ResourceIdentity> {
        self.entry::<T>().map(|entry| entry.identity)
    }

    pub fn entry<T: 'static>(&self) -> Option<RegistryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::resource::{ObjectList, ObjectMeta};

    #[derive(Default, Deserialize, Serialize)]
    struct Widget {
        metadata: ObjectMeta,
    }

    #[derive(Default, Deserialize, Serialize)]
    struct Gadget {
        metadata: ObjectMeta,
    }

    crate::impl_resource!(Widget, Gadget);

    #[test]
    fn unregistered() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.lookup::<Widget>(), None);
    }

    #[test]
    fn object_and_list() {
        let registry = Registry::new();
        registry
            .register::<Widget>("example.com", "v1", "widgets", true)
            .unwrap();
        registry
            .register_list::<ObjectList<Widget>>("example.com", "v1", "widgets", true)
            .unwrap();

        let entry = registry.entry::<Widget>().unwrap();
        assert_eq!(entry.kind, EntryKind::Object);
        assert_eq!(
            entry.identity,
            ResourceIdentity::new("example.com", "v1", "widgets", true)
        );
        assert_eq!(entry.identity.to_string(), "example.com/v1, Resource=widgets");

        let entry = registry.entry::<ObjectList<Widget>>().unwrap();
        assert_eq!(entry.kind, EntryKind::List);
        assert_eq!(registry.len(), 2);

        // lists of other types stay unknown
        assert_eq!(registry.lookup::<ObjectList<Gadget>>(), None);
    }

    #[test]
    fn re_register() {
        let registry = Registry::new();
        registry.register::<Widget>("", "v1", "widgets", true).unwrap();
        registry.register::<Widget>("", "v1", "widgets", true).unwrap();
        assert_eq!(registry.len(), 1);

        let err = registry
            .register::<Widget>("", "v2", "widgets", true)
            .unwrap_err();
        let RegistryError::Conflict {
            existing,
            requested,
            ..
        } = err;
        assert_eq!(existing.version, "v1");
        assert_eq!(requested.version, "v2");

        // the first registration is kept
        assert_eq!(registry.lookup::<Widget>().unwrap().version, "v1");
    }

    #[test]
    fn concurrent_register() {
        let registry = Arc::new(Registry::new());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    registry.register::<Widget>("", "v1", "widgets", true).unwrap();
                    registry
                        .register::<Gadget>("example.com", "v1", "gadgets", false)
                        .unwrap();
                });
            }
        });

        assert_eq!(registry.len(), 2);
        assert!(!registry.lookup::<Gadget>().unwrap().namespaced);
    }
}
