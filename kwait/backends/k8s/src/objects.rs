use kube::{
    Api, Client, Error as KubeError, ResourceExt as _,
    api::{DynamicObject, ListParams},
    core::ErrorResponse,
};
use kwait_core::{ClientError, Instance, ResourceType};
use tracing::debug;

use crate::discovery::to_api_resource;

/// Dynamic API handle for `resource`, scoped to `namespace` when given.
pub(crate) fn dynamic_api(
    client: &Client,
    resource: &ResourceType,
    namespace: Option<&str>,
) -> Api<DynamicObject> {
    let ar = to_api_resource(resource);
    match namespace {
        Some(namespace) if resource.namespaced => {
            Api::namespaced_with(client.clone(), namespace, &ar)
        }
        _ => Api::all_with(client.clone(), &ar),
    }
}

pub(crate) async fn get_instance(
    client: &Client,
    resource: &ResourceType,
    namespace: Option<&str>,
    name: &str,
) -> Result<Instance, ClientError> {
    debug!(resource = %resource.plural, namespace, name, "getting object");
    dynamic_api(client, resource, namespace)
        .get(name)
        .await
        .map(instance_from_object)
        .map_err(|err| map_kube_error(describe_target(resource, namespace, Some(name)), err))
}

pub(crate) async fn list_instances(
    client: &Client,
    resource: &ResourceType,
    namespace: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<Instance>, ClientError> {
    debug!(resource = %resource.plural, namespace, ?limit, "listing objects");
    let params = match limit {
        Some(limit) => ListParams::default().limit(limit),
        None => ListParams::default(),
    };

    dynamic_api(client, resource, namespace)
        .list(&params)
        .await
        .map(|list| list.items.into_iter().map(instance_from_object).collect())
        .map_err(|err| map_kube_error(describe_target(resource, namespace, None), err))
}

pub(crate) fn instance_from_object(object: DynamicObject) -> Instance {
    Instance {
        name: object.name_any(),
        namespace: object.namespace(),
        status: object.data.get("status").cloned(),
    }
}

/// 404 answers become [`ClientError::NotFound`]; everything else is a
/// query failure.
pub(crate) fn map_kube_error(target: String, err: KubeError) -> ClientError {
    match err {
        KubeError::Api(ErrorResponse { code: 404, .. }) => {
            ClientError::NotFound { resource: target }
        }
        other => ClientError::Query {
            resource: target,
            source: other.into(),
        },
    }
}

fn describe_target(resource: &ResourceType, namespace: Option<&str>, name: Option<&str>) -> String {
    match (namespace, name) {
        (Some(namespace), Some(name)) => format!("{resource} {namespace}/{name}"),
        (None, Some(name)) => format!("{resource} {name}"),
        (Some(namespace), None) => format!("{} in namespace {namespace}", resource.plural),
        (None, None) => resource.plural.clone(),
    }
}
