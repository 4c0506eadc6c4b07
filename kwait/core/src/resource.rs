use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Resolved, queryable resource kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// REST resource name, e.g. `deployments`.
    pub plural: String,
    pub namespaced: bool,
}

impl ResourceType {
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
        namespaced: bool,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
            namespaced,
        }
    }

    #[must_use]
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)
    }
}

/// Entry of an object's `status.conditions` list.
///
/// Missing or null fields decode as empty strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct StatusCondition {
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub type_: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
struct ObjectStatus {
    #[serde(default)]
    conditions: Vec<StatusCondition>,
}

/// A single object fetched from the cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub name: String,
    pub namespace: Option<String>,
    /// Raw `status` stanza, if the object carries one.
    pub status: Option<Value>,
}

impl Instance {
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(ToOwned::to_owned),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Value) -> Self {
        self.status = Some(status);
        self
    }

    /// Decodes `status.conditions`. A missing status yields no conditions.
    pub fn status_conditions(&self) -> Result<Vec<StatusCondition>, serde_json::Error> {
        match &self.status {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(status) => {
                ObjectStatus::deserialize(status).map(|decoded| decoded.conditions)
            }
        }
    }
}

/// Failures reported by a [`ResourceClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{resource} not found")]
    NotFound { resource: String },
    #[error("failed to query {resource}: {source}")]
    Query {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ClientError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read-only access to cluster objects.
#[async_trait::async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Instance, ClientError>;

    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Instance>, ClientError>;
}

/// Snapshot of the cluster's API schema.
pub trait SchemaDiscovery: Send + Sync {
    /// Looks up a resource by its canonical (lower-case) name.
    fn lookup(&self, resource: &str) -> Option<ResourceType>;
}
