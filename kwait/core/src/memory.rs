//! In-process cluster backed by plain maps.
//!
//! Implements both [`SchemaDiscovery`] and [`ResourceClient`] so conditions can
//! be evaluated without a live API server.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use crate::resource::{ClientError, Instance, ResourceClient, ResourceType, SchemaDiscovery};

type ObjectKey = (String, Option<String>, String);

#[derive(Default)]
struct State {
    types: BTreeMap<String, ResourceType>,
    objects: BTreeMap<ObjectKey, Instance>,
}

#[derive(Default)]
pub struct MemoryCluster {
    state: Mutex<State>,
}

impl MemoryCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster that knows the common built-in kinds.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let cluster = Self::new();
        for (group, kind, plural, namespaced) in [
            ("", "Namespace", "namespaces", false),
            ("", "Node", "nodes", false),
            ("", "Pod", "pods", true),
            ("", "Service", "services", true),
            ("", "ConfigMap", "configmaps", true),
            ("", "Secret", "secrets", true),
            ("apps", "DaemonSet", "daemonsets", true),
            ("apps", "Deployment", "deployments", true),
            ("apps", "ReplicaSet", "replicasets", true),
            ("apps", "StatefulSet", "statefulsets", true),
            ("batch", "Job", "jobs", true),
        ] {
            cluster.register(ResourceType::new(group, "v1", kind, plural, namespaced));
        }
        cluster
    }

    pub fn register(&self, resource: ResourceType) {
        self.lock().types.insert(resource.plural.clone(), resource);
    }

    /// Stores `instance` under `resource`, replacing any previous object
    /// with the same namespace and name.
    pub fn insert(&self, resource: &ResourceType, instance: Instance) {
        let key = (
            resource.plural.clone(),
            instance.namespace.clone(),
            instance.name.clone(),
        );
        self.lock().objects.insert(key, instance);
    }

    pub fn remove(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<Instance> {
        let key = (
            resource.plural.clone(),
            namespace.map(ToOwned::to_owned),
            name.to_owned(),
        );
        self.lock().objects.remove(&key)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is plain data, so a poisoned lock is still consistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SchemaDiscovery for MemoryCluster {
    fn lookup(&self, resource: &str) -> Option<ResourceType> {
        let state = self.lock();
        state.types.get(resource).cloned().or_else(|| {
            state
                .types
                .values()
                .find(|known| known.kind.eq_ignore_ascii_case(resource))
                .cloned()
        })
    }
}

#[async_trait::async_trait]
impl ResourceClient for MemoryCluster {
    async fn get(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Instance, ClientError> {
        let key = (
            resource.plural.clone(),
            namespace.map(ToOwned::to_owned),
            name.to_owned(),
        );
        self.lock()
            .objects
            .get(&key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("{resource} {name:?}"),
            })
    }

    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Instance>, ClientError> {
        let state = self.lock();
        if !state.types.contains_key(&resource.plural) {
            return Err(ClientError::NotFound {
                resource: resource.plural.clone(),
            });
        }

        let limit = limit.map_or(usize::MAX, |limit| limit as usize);
        Ok(state
            .objects
            .iter()
            .filter(|((plural, ns, _), _)| {
                *plural == resource.plural
                    && namespace.is_none_or(|namespace| ns.as_deref() == Some(namespace))
            })
            .map(|(_, instance)| instance.clone())
            .take(limit)
            .collect())
    }
}
