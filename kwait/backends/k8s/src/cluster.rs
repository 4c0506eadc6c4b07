use std::path::{Path, PathBuf};

use kube::{
    Client, Config,
    config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError},
    discovery::{ApiCapabilities, ApiResource},
};
use kwait_core::{ClientError, Instance, ResourceClient, ResourceType, SchemaDiscovery};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    discovery::{discover_resources, find_resource},
    objects::{get_instance, list_instances},
};

/// Failures while connecting to the cluster and reading its API schema.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to read kubeconfig {path}: {source}")]
    ReadKubeconfig {
        path: PathBuf,
        #[source]
        source: KubeconfigError,
    },
    #[error("failed to load kubeconfig {path}: {source}")]
    LoadKubeconfig {
        path: PathBuf,
        #[source]
        source: KubeconfigError,
    },
    #[error("failed to infer cluster configuration: {source}")]
    Infer {
        #[source]
        source: InferConfigError,
    },
    #[error("failed to create Kubernetes client: {source}")]
    Client {
        #[source]
        source: kube::Error,
    },
    #[error("failed to discover API resources: {source}")]
    Discovery {
        #[source]
        source: kube::Error,
    },
}

/// Live cluster connection plus the API schema discovered at connect time.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    resources: Vec<(ApiResource, ApiCapabilities)>,
}

impl KubeCluster {
    /// Connects using `kubeconfig`, or the inferred configuration
    /// (`KUBECONFIG`, `~/.kube/config`, in-cluster) when `None`.
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self, ConnectError> {
        let config = load_config(kubeconfig).await?;
        info!(cluster_url = %config.cluster_url, "connecting to cluster");

        let client = Client::try_from(config).map_err(|source| ConnectError::Client { source })?;

        debug!("running API discovery");
        let resources = discover_resources(&client)
            .await
            .map_err(|source| ConnectError::Discovery { source })?;
        debug!(resources = resources.len(), "API discovery finished");

        Ok(Self { client, resources })
    }
}

async fn load_config(kubeconfig: Option<&Path>) -> Result<Config, ConnectError> {
    let Some(path) = kubeconfig else {
        return Config::infer()
            .await
            .map_err(|source| ConnectError::Infer { source });
    };

    let kubeconfig = Kubeconfig::read_from(path).map_err(|source| ConnectError::ReadKubeconfig {
        path: path.to_owned(),
        source,
    })?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|source| ConnectError::LoadKubeconfig {
            path: path.to_owned(),
            source,
        })
}

impl SchemaDiscovery for KubeCluster {
    fn lookup(&self, resource: &str) -> Option<ResourceType> {
        find_resource(&self.resources, resource)
    }
}

#[async_trait::async_trait]
impl ResourceClient for KubeCluster {
    async fn get(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Instance, ClientError> {
        get_instance(&self.client, resource, namespace, name).await
    }

    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Instance>, ClientError> {
        list_instances(&self.client, resource, namespace, limit).await
    }
}
