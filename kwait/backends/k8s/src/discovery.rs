use std::fmt::Display;

use kube::{
    Client,
    discovery::{self, ApiCapabilities, ApiGroup, ApiResource, Scope},
};
use kwait_core::ResourceType;
use tracing::{debug, warn};

type Resources = Vec<(ApiResource, ApiCapabilities)>;

/// Queries every API group, core group first, then alphabetical.
///
/// The core group must answer. Other groups that fail (an aggregated API
/// that is down, for instance) are left out of the result.
pub(crate) async fn discover_resources(client: &Client) -> Result<Resources, kube::Error> {
    let mut names: Vec<String> = client
        .list_api_groups()
        .await?
        .groups
        .into_iter()
        .map(|group| group.name)
        .collect();
    names.sort();

    let core = discovery::group(client, ApiGroup::CORE_GROUP)
        .await?
        .recommended_resources();

    let mut groups = Vec::with_capacity(names.len());
    for name in names {
        debug!(group = %name, "querying API group");
        let resources = discovery::group(client, &name)
            .await
            .map(|group| group.recommended_resources());
        groups.push((name, resources));
    }

    Ok(core.into_iter().chain(available_resources(groups)).collect())
}

/// Flattens per-group answers in order, skipping groups that failed.
pub(crate) fn available_resources<E: Display>(
    groups: impl IntoIterator<Item = (String, Result<Resources, E>)>,
) -> Resources {
    groups
        .into_iter()
        .flat_map(|(group, resources)| {
            resources.unwrap_or_else(|err| {
                warn!(group = %group, error = %err, "skipping unavailable API group");
                Vec::new()
            })
        })
        .collect()
}

/// Finds `name` among `resources`.
///
/// `name` is a plural resource name or a lower-cased kind, optionally
/// qualified with its group (`deployments.apps`, `widget.example.com`). The
/// first match wins.
pub(crate) fn find_resource(
    resources: &[(ApiResource, ApiCapabilities)],
    name: &str,
) -> Option<ResourceType> {
    let (resource, group) = match name.split_once('.') {
        Some((resource, group)) => (resource, Some(group)),
        None => (name, None),
    };

    resources
        .iter()
        .find(|(ar, _)| {
            group.is_none_or(|group| ar.group == group)
                && (ar.plural == resource || ar.kind.eq_ignore_ascii_case(resource))
        })
        .map(|(ar, caps)| to_resource_type(ar, caps))
}

pub(crate) fn to_resource_type(ar: &ApiResource, caps: &ApiCapabilities) -> ResourceType {
    ResourceType::new(
        ar.group.clone(),
        ar.version.clone(),
        ar.kind.clone(),
        ar.plural.clone(),
        matches!(caps.scope, Scope::Namespaced),
    )
}

pub(crate) fn to_api_resource(resource: &ResourceType) -> ApiResource {
    ApiResource {
        group: resource.group.clone(),
        version: resource.version.clone(),
        api_version: resource.api_version(),
        kind: resource.kind.clone(),
        plural: resource.plural.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn api_resource(
        group: &str,
        kind: &str,
        plural: &str,
        scope: Scope,
    ) -> (ApiResource, ApiCapabilities) {
        let version = "v1";
        let api_version = if group.is_empty() {
            version.to_owned()
        } else {
            format!("{group}/{version}")
        };
        let ar = ApiResource {
            group: group.to_owned(),
            version: version.to_owned(),
            api_version,
            kind: kind.to_owned(),
            plural: plural.to_owned(),
        };
        let caps = ApiCapabilities {
            scope,
            subresources: Vec::new(),
            operations: vec!["get".to_owned(), "list".to_owned()],
        };
        (ar, caps)
    }

    fn resources() -> Vec<(ApiResource, ApiCapabilities)> {
        vec![
            api_resource("", "Namespace", "namespaces", Scope::Cluster),
            api_resource("", "Pod", "pods", Scope::Namespaced),
            api_resource("apps", "Deployment", "deployments", Scope::Namespaced),
            api_resource("example.com", "Deployment", "deployments", Scope::Cluster),
        ]
    }

    #[test]
    fn matches_plural_and_kind() {
        let resources = resources();

        let by_plural = find_resource(&resources, "namespaces").unwrap();
        let by_kind = find_resource(&resources, "namespace").unwrap();
        assert_eq!(by_plural, by_kind);
        assert_eq!(by_plural.kind, "Namespace");
        assert!(!by_plural.namespaced);
        assert!(find_resource(&resources, "pods").unwrap().namespaced);
    }

    #[test]
    fn first_group_wins_unless_qualified() {
        let resources = resources();

        assert_eq!(find_resource(&resources, "deployments").unwrap().group, "apps");
        let custom = find_resource(&resources, "deployments.example.com").unwrap();
        assert_eq!(custom.group, "example.com");
        assert!(!custom.namespaced);
        assert!(find_resource(&resources, "deployments.batch").is_none());
    }

    #[test]
    fn failed_groups_are_skipped() {
        let unavailable = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_owned(),
            message: "the server is currently unable to handle the request".to_owned(),
            reason: "ServiceUnavailable".to_owned(),
            code: 503,
        });
        let groups = vec![
            (
                "apps".to_owned(),
                Ok(vec![api_resource("apps", "Deployment", "deployments", Scope::Namespaced)]),
            ),
            ("metrics.k8s.io".to_owned(), Err(unavailable)),
            (
                "batch".to_owned(),
                Ok(vec![api_resource("batch", "Job", "jobs", Scope::Namespaced)]),
            ),
        ];

        let resources = available_resources(groups);
        let plurals: Vec<_> = resources.iter().map(|(ar, _)| ar.plural.as_str()).collect();
        assert_eq!(plurals, ["deployments", "jobs"]);
        assert!(find_resource(&resources, "jobs").is_some());
    }

    #[test]
    fn unknown_names_do_not_match() {
        assert!(find_resource(&resources(), "widgets").is_none());
    }

    #[test]
    fn api_resource_round_trips_group_version() {
        let (ar, caps) = api_resource("apps", "Deployment", "deployments", Scope::Namespaced);
        let back = to_api_resource(&to_resource_type(&ar, &caps));
        assert_eq!(back.api_version, "apps/v1");
        assert_eq!(back.plural, "deployments");
    }
}
