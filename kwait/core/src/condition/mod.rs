use std::fmt;

mod exists;
mod gone;
mod ready;

pub use exists::Exists;
pub use gone::Gone;
pub use ready::{Ready, is_ready};

use crate::{
    resource::{ClientError, Instance, ResourceClient, ResourceType},
    target::{ConditionKind, TargetSpec},
};

/// A predicate about cluster state that can be re-evaluated at will.
///
/// `check` is a single read-only query. "Not found" answers are folded into
/// the returned boolean by each implementation, so an `Err` always means the
/// query itself failed.
#[async_trait::async_trait]
pub trait Condition: fmt::Debug + Send + Sync {
    fn describe(&self) -> String;

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool, ClientError>;
}

/// Builds the condition variant named by `target.condition`.
#[must_use]
pub fn build(resource: ResourceType, target: TargetSpec) -> Box<dyn Condition> {
    let condition = target.condition;
    let subject = Subject { resource, target };

    match condition {
        ConditionKind::Exists => Box::new(Exists::new(subject)),
        ConditionKind::Gone => Box::new(Gone::new(subject)),
        ConditionKind::Ready => Box::new(Ready::new(subject)),
    }
}

/// Resource and target shared by every condition variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub resource: ResourceType,
    pub target: TargetSpec,
}

/// The four ways a subject can be phrased in a description.
pub(crate) enum Phrase<'a> {
    Named { namespace: &'a str, name: &'a str },
    NamedClusterWide { name: &'a str },
    Any { namespace: &'a str },
    AnyClusterWide,
}

impl Subject {
    pub(crate) fn phrase(&self) -> Phrase<'_> {
        let name = self.target.name.as_str();
        match (self.target.namespace.as_deref(), self.target.is_wildcard()) {
            (Some(namespace), false) => Phrase::Named { namespace, name },
            (None, false) => Phrase::NamedClusterWide { name },
            (Some(namespace), true) => Phrase::Any { namespace },
            (None, true) => Phrase::AnyClusterWide,
        }
    }

    pub(crate) async fn get(&self, client: &dyn ResourceClient) -> Result<Instance, ClientError> {
        client
            .get(
                &self.resource,
                self.target.namespace.as_deref(),
                &self.target.name,
            )
            .await
    }

    pub(crate) async fn list(
        &self,
        client: &dyn ResourceClient,
        limit: Option<u32>,
    ) -> Result<Vec<Instance>, ClientError> {
        client
            .list(&self.resource, self.target.namespace.as_deref(), limit)
            .await
    }
}
