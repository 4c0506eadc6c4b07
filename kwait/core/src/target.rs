use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    condition::{self, Condition},
    resolver::{ResolveError, ResourceResolver},
    resource::ResourceType,
};

/// Name that matches every instance of a kind.
pub const WILDCARD: &str = "*";

/// What a target is waited for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConditionKind {
    Exists,
    Gone,
    #[default]
    Ready,
}

impl ConditionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Gone => "gone",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown condition {0:?} given")]
pub struct UnknownCondition(pub String);

impl FromStr for ConditionKind {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exist" | "exists" => Ok(Self::Exists),
            "removed" | "gone" => Ok(Self::Gone),
            "ready" => Ok(Self::Ready),
            _ => Err(UnknownCondition(s.to_owned())),
        }
    }
}

/// One parsed command line target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetSpec {
    /// Kind as typed by the user, lower-cased.
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
    pub condition: ConditionKind,
}

impl TargetSpec {
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "must be in `kind/name[/condition=ready]` (for cluster-scoped resources) or `kind/namespace/name[/condition=ready]` format"
    )]
    TooFewSegments,
    #[error("invalid kind {kind:?}: {source}")]
    Resolve {
        kind: String,
        #[source]
        source: ResolveError,
    },
    #[error(
        "{kind:?} is a namespaced resource, so a namespace must be given: `{kind}/namespace/name[/condition=ready]`"
    )]
    MissingNamespace { kind: String },
    #[error("too many segments for {kind:?}, expected `{expected}`")]
    TooManySegments { kind: String, expected: String },
    #[error("no resource name given")]
    EmptyName,
    #[error(transparent)]
    UnknownCondition(#[from] UnknownCondition),
}

/// Splits `input` into a target and resolves its kind.
///
/// Namespaced kinds take `kind/namespace/name[/condition]`, cluster-scoped
/// kinds take `kind/name[/condition]`; there is no way to pass a namespace
/// for the latter.
pub fn parse_target(
    input: &str,
    resolver: &ResourceResolver,
) -> Result<(ResourceType, TargetSpec), ParseError> {
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() < 2 {
        return Err(ParseError::TooFewSegments);
    }

    let kind = parts[0].trim().to_lowercase();
    let resource = resolver
        .resolve(&kind)
        .map_err(|source| ParseError::Resolve {
            kind: kind.clone(),
            source,
        })?;

    let (namespace, name, condition) = if resource.namespaced {
        let (namespace, name, condition) = match parts[1..] {
            [_] => return Err(ParseError::MissingNamespace { kind }),
            [namespace, name] => (namespace, name, None),
            [namespace, name, condition] => (namespace, name, Some(condition)),
            _ => {
                return Err(ParseError::TooManySegments {
                    expected: format!("{kind}/namespace/name[/condition=ready]"),
                    kind,
                });
            }
        };

        let namespace = namespace.trim();
        if namespace.is_empty() {
            return Err(ParseError::MissingNamespace { kind });
        }
        (Some(namespace), name, condition)
    } else {
        match parts[1..] {
            [name] => (None, name, None),
            [name, condition] => (None, name, Some(condition)),
            _ => {
                return Err(ParseError::TooManySegments {
                    expected: format!("{kind}/name[/condition=ready]"),
                    kind,
                });
            }
        }
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }

    let condition = match condition {
        Some(condition) => condition.parse()?,
        None => ConditionKind::default(),
    };

    let target = TargetSpec {
        kind,
        namespace: namespace.map(ToOwned::to_owned),
        name: name.to_owned(),
        condition,
    };

    Ok((resource, target))
}

/// Parses `input` and builds the condition it names.
pub fn parse_condition(
    input: &str,
    resolver: &ResourceResolver,
) -> Result<Box<dyn Condition>, ParseError> {
    let (resource, target) = parse_target(input, resolver)?;
    Ok(condition::build(resource, target))
}
