use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::resource::{ResourceType, SchemaDiscovery};

/// Built-in short and singular forms, keyed by canonical resource name.
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("namespaces", &["ns", "namespace"]),
    ("pods", &["po", "pod"]),
    ("daemonsets", &["ds", "daemonset"]),
    ("statefulsets", &["sts", "statefulset"]),
    ("deployments", &["deploy", "deployment"]),
    ("replicasets", &["rs", "replicaset"]),
    ("replicationcontrollers", &["rc", "replicationcontroller"]),
    ("services", &["svc", "service"]),
    ("endpoints", &["ep"]),
    ("nodes", &["no", "node"]),
    ("configmaps", &["cm", "configmap"]),
    ("secrets", &["secret"]),
    ("serviceaccounts", &["sa", "serviceaccount"]),
    ("jobs", &["job"]),
    ("cronjobs", &["cj", "cronjob"]),
    ("persistentvolumes", &["pv", "persistentvolume"]),
    ("persistentvolumeclaims", &["pvc", "persistentvolumeclaim"]),
    ("ingresses", &["ing", "ingress"]),
    ("poddisruptionbudgets", &["pdb", "poddisruptionbudget"]),
    ("horizontalpodautoscalers", &["hpa", "horizontalpodautoscaler"]),
    ("storageclasses", &["sc", "storageclass"]),
    (
        "customresourcedefinitions",
        &["crd", "crds", "customresourcedefinition"],
    ),
];

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resource kind must not be empty")]
    EmptyKind,
    #[error("the server does not know a resource named {resource:?}")]
    Unknown { resource: String },
}

/// Maps user supplied kind aliases to resource types known to the cluster.
#[derive(Clone)]
pub struct ResourceResolver {
    discovery: Arc<dyn SchemaDiscovery>,
    aliases: HashMap<String, String>,
}

impl ResourceResolver {
    /// Resolver with the built-in alias table.
    pub fn new(discovery: Arc<dyn SchemaDiscovery>) -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .flat_map(|(canonical, aliases)| {
                aliases
                    .iter()
                    .map(move |alias| ((*alias).to_owned(), (*canonical).to_owned()))
            })
            .collect();

        Self { discovery, aliases }
    }

    /// Registers an additional alias; later registrations win.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, resource: &str) -> Self {
        self.aliases.insert(alias.to_lowercase(), resource.to_lowercase());
        self
    }

    /// Canonical resource name for `alias`; unknown names pass through.
    #[must_use]
    pub fn canonical_name(&self, alias: &str) -> String {
        let alias = alias.trim().to_lowercase();
        self.aliases.get(&alias).cloned().unwrap_or(alias)
    }

    pub fn resolve(&self, kind: &str) -> Result<ResourceType, ResolveError> {
        let resource = self.canonical_name(kind);
        if resource.is_empty() {
            return Err(ResolveError::EmptyKind);
        }

        let resolved = self
            .discovery
            .lookup(&resource)
            .ok_or_else(|| ResolveError::Unknown {
                resource: resource.clone(),
            })?;

        debug!(
            kind,
            resource = %resource,
            api_version = %resolved.api_version(),
            namespaced = resolved.namespaced,
            "resolved resource kind"
        );

        Ok(resolved)
    }
}
