use tracing::debug;

use super::{Condition, Phrase, Subject};
use crate::resource::{ClientError, Instance, ResourceClient, StatusCondition};

/// Satisfied once the target (or, for `*`, every instance) reports ready.
#[derive(Clone, Debug)]
pub struct Ready {
    subject: Subject,
}

impl Ready {
    #[must_use]
    pub const fn new(subject: Subject) -> Self {
        Self { subject }
    }
}

#[async_trait::async_trait]
impl Condition for Ready {
    fn describe(&self) -> String {
        let kind = &self.subject.resource;
        match self.subject.phrase() {
            Phrase::Named { namespace, name } => {
                format!("The {kind} \"{namespace}/{name}\" must be ready.")
            }
            Phrase::NamedClusterWide { name } => format!("The {kind} {name:?} must be ready."),
            Phrase::Any { namespace } => {
                format!("All {kind} resources in the {namespace:?} namespace must be ready.")
            }
            Phrase::AnyClusterWide => format!("All {kind} resources in the cluster must be ready."),
        }
    }

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool, ClientError> {
        if self.subject.target.is_wildcard() {
            return match self.subject.list(client, None).await {
                Ok(items) => Ok(items.iter().all(is_ready)),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            };
        }

        match self.subject.get(client).await {
            Ok(instance) => Ok(is_ready(&instance)),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Readiness as reported by the object's status conditions.
///
/// A `Ready` condition decides first; kinds such as `Deployment` only
/// report `Available`, which is consulted next. Undecodable status counts as
/// not ready.
#[must_use]
pub fn is_ready(instance: &Instance) -> bool {
    let conditions = match instance.status_conditions() {
        Ok(conditions) => conditions,
        Err(err) => {
            debug!(name = %instance.name, error = %err, "ignoring undecodable status");
            return false;
        }
    };

    has_condition(&conditions, "Ready", "true") || has_condition(&conditions, "Available", "true")
}

/// Only the first condition of the given type is considered.
fn has_condition(conditions: &[StatusCondition], type_: &str, status: &str) -> bool {
    conditions
        .iter()
        .find(|condition| condition.type_.eq_ignore_ascii_case(type_))
        .is_some_and(|condition| condition.status.eq_ignore_ascii_case(status))
}
