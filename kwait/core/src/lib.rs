pub mod condition;
pub mod constants;
pub mod memory;
pub mod resolver;
pub mod resource;
pub mod target;
pub mod waiter;

pub use condition::Condition;
pub use resolver::{ResolveError, ResourceResolver};
pub use resource::{ClientError, Instance, ResourceClient, ResourceType, SchemaDiscovery};
pub use target::{ConditionKind, ParseError, TargetSpec, parse_condition, parse_target};
pub use waiter::{WaitError, WaitOutcome, WaitReport, Waiter};
