use super::{Condition, Phrase, Subject};
use crate::{
    constants::PRESENCE_LIST_LIMIT,
    resource::{ClientError, ResourceClient},
};

/// Satisfied once the target (or, for `*`, any instance) exists.
#[derive(Clone, Debug)]
pub struct Exists {
    subject: Subject,
}

impl Exists {
    #[must_use]
    pub const fn new(subject: Subject) -> Self {
        Self { subject }
    }
}

#[async_trait::async_trait]
impl Condition for Exists {
    fn describe(&self) -> String {
        let kind = &self.subject.resource;
        match self.subject.phrase() {
            Phrase::Named { namespace, name } => {
                format!("The {kind} \"{namespace}/{name}\" must exist.")
            }
            Phrase::NamedClusterWide { name } => {
                format!("The {kind} {name:?} must exist in the cluster.")
            }
            Phrase::Any { namespace } => {
                format!("Any {kind} resource must exist in the {namespace:?} namespace.")
            }
            Phrase::AnyClusterWide => format!("Any {kind} resource must exist in the cluster."),
        }
    }

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool, ClientError> {
        if self.subject.target.is_wildcard() {
            return match self.subject.list(client, Some(PRESENCE_LIST_LIMIT)).await {
                Ok(items) => Ok(!items.is_empty()),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            };
        }

        match self.subject.get(client).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
