//! Domain-level errors (no I/O concerns)

use thiserror::Error;

use crate::domain::host::NodeId;
use crate::domain::value::PropertyType;

/// Errors raised by a host component model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown component kind: {0}")]
    UnknownKind(String),

    #[error("stale or foreign node handle: {0}")]
    StaleNode(NodeId),

    #[error("{parent} does not accept children")]
    RejectsChildren { parent: String },

    #[error("{parent} accepts at most {max} children")]
    CapacityExceeded { parent: String, max: usize },

    #[error("{parent} only accepts {allowed:?}, not {child}")]
    ChildKindNotAllowed {
        parent: String,
        child: String,
        allowed: Vec<String>,
    },

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: String, child: String },
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised while building a component tree.
///
/// Every variant carries the declaration path of the offending node so the
/// failing declaration can be located.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unsupported attribute '{attribute}' for {kind} at {path}")]
    UnsupportedAttribute {
        kind: String,
        attribute: String,
        path: String,
    },

    #[error("no capability '{capability}' on {kind} at {path}")]
    NoSuchCapability {
        kind: String,
        capability: String,
        path: String,
    },

    #[error("cannot attach {child} to {parent} at {path}: {source}")]
    Attachment {
        parent: String,
        child: String,
        path: String,
        #[source]
        source: HostError,
    },

    #[error("invalid value for '{attribute}' on {kind} at {path}: expected {expected}, got {found}")]
    InvalidValue {
        kind: String,
        attribute: String,
        expected: PropertyType,
        found: String,
        path: String,
    },

    #[error("unknown component kind '{kind}' at {path}")]
    UnknownKind { kind: String, path: String },

    #[error("host failure at {path}: {source}")]
    Host {
        path: String,
        #[source]
        source: HostError,
    },
}

impl BuildError {
    /// Declaration path of the node the error refers to.
    pub fn path(&self) -> &str {
        match self {
            BuildError::UnsupportedAttribute { path, .. }
            | BuildError::NoSuchCapability { path, .. }
            | BuildError::Attachment { path, .. }
            | BuildError::InvalidValue { path, .. }
            | BuildError::UnknownKind { path, .. }
            | BuildError::Host { path, .. } => path,
        }
    }
}

/// Result type for tree building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors in a component catalog definition.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid name '{name}' in {context}: expected lowercase snake_case")]
    InvalidName { name: String, context: String },

    #[error("kind '{kind}' uses undefined capability set '{set}'")]
    UndefinedCapabilitySet { kind: String, set: String },

    #[error("kind '{kind}' restricts children to undefined kind '{child}'")]
    UndefinedChildKind { kind: String, child: String },

    #[error("cannot parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}
