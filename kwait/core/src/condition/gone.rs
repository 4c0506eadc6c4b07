use super::{Condition, Phrase, Subject};
use crate::{
    constants::PRESENCE_LIST_LIMIT,
    resource::{ClientError, ResourceClient},
};

/// Satisfied once the target (or, for `*`, every instance) is absent.
#[derive(Clone, Debug)]
pub struct Gone {
    subject: Subject,
}

impl Gone {
    #[must_use]
    pub const fn new(subject: Subject) -> Self {
        Self { subject }
    }
}

#[async_trait::async_trait]
impl Condition for Gone {
    fn describe(&self) -> String {
        let kind = &self.subject.resource;
        match self.subject.phrase() {
            Phrase::Named { namespace, name } => {
                format!("The {kind} \"{namespace}/{name}\" must be gone.")
            }
            Phrase::NamedClusterWide { name } => format!("The {kind} {name:?} must be gone."),
            Phrase::Any { namespace } => {
                format!("No {kind} resource must exist in the {namespace:?} namespace.")
            }
            Phrase::AnyClusterWide => {
                format!("No {kind} resource must exist anymore in the cluster.")
            }
        }
    }

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool, ClientError> {
        if self.subject.target.is_wildcard() {
            // A kind the server no longer serves has no instances left.
            return match self.subject.list(client, Some(PRESENCE_LIST_LIMIT)).await {
                Ok(items) => Ok(items.is_empty()),
                Err(err) if err.is_not_found() => Ok(true),
                Err(err) => Err(err),
            };
        }

        match self.subject.get(client).await {
            Ok(_) => Ok(false),
            Err(err) if err.is_not_found() => Ok(true),
            Err(err) => Err(err),
        }
    }
}
