//! Per-nesting-level builder state handed to configuration blocks.

use std::fmt;
use std::sync::Arc;

use crate::domain::builder::{ParentLink, TreeBuilder};
use crate::domain::capability::CapabilityTable;
use crate::domain::error::{BuildError, BuildResult};
use crate::domain::host::{Host, NodeId};
use crate::domain::value::{AttrValue, Attributes};

/// Which component a declaration configures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Instantiate a new component of this kind
    Kind(String),
    /// Reuse a component the host already owns
    Existing(NodeId),
}

impl From<&str> for Selector {
    fn from(kind: &str) -> Self {
        Selector::Kind(kind.to_string())
    }
}

impl From<String> for Selector {
    fn from(kind: String) -> Self {
        Selector::Kind(kind)
    }
}

impl From<NodeId> for Selector {
    fn from(node: NodeId) -> Self {
        Selector::Existing(node)
    }
}

/// Location of a declaration in the nested call structure, e.g.
/// `/vertical_layout/horizontal_layout[0]/button[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclPath(String);

impl DeclPath {
    pub fn root(kind: &str) -> Self {
        Self(format!("/{kind}"))
    }

    pub fn child(&self, kind: &str, index: usize) -> Self {
        Self(format!("{}/{kind}[{index}]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeclPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receiver of a configuration block.
///
/// Lives for exactly one declaration. It scopes nested declarations to its
/// node and forwards `set`/`get` to the node's capability table.
pub struct BuilderContext<'b, H: Host + ?Sized> {
    builder: &'b TreeBuilder,
    host: &'b mut H,
    node: NodeId,
    parent: Option<NodeId>,
    table: Arc<CapabilityTable>,
    path: DeclPath,
}

impl<'b, H: Host + ?Sized> BuilderContext<'b, H> {
    pub(crate) fn new(
        builder: &'b TreeBuilder,
        host: &'b mut H,
        node: NodeId,
        parent: Option<NodeId>,
        table: Arc<CapabilityTable>,
        path: DeclPath,
    ) -> Self {
        Self {
            builder,
            host,
            node,
            parent,
            table,
            path,
        }
    }

    /// Component configured by this block.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &str {
        self.table.kind()
    }

    pub fn path(&self) -> &DeclPath {
        &self.path
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.table
    }

    /// Read-only view of the host, for inspecting what was built so far.
    pub fn host(&self) -> &H {
        &*self.host
    }

    /// Declare a child without a configuration block.
    pub fn add<S: Into<Selector>>(&mut self, selector: S, attrs: Attributes) -> BuildResult<NodeId> {
        self.add_with(selector, attrs, |_| Ok(()))
    }

    /// Declare a child and configure it with `block`.
    ///
    /// The child is attached to this context's node before `block` runs.
    pub fn add_with<S, F>(&mut self, selector: S, attrs: Attributes, block: F) -> BuildResult<NodeId>
    where
        S: Into<Selector>,
        F: FnOnce(&mut BuilderContext<'_, H>) -> BuildResult<()>,
    {
        let parent = ParentLink {
            node: self.node,
            path: &self.path,
        };
        self.builder
            .create(&mut *self.host, Some(parent), selector.into(), attrs, block)
    }

    /// Set a property on this node through its capability table.
    pub fn set<V: Into<AttrValue>>(&mut self, name: &str, value: V) -> BuildResult<()> {
        let capability = self.table.get(name).ok_or_else(|| BuildError::NoSuchCapability {
            kind: self.table.kind().to_string(),
            capability: name.to_string(),
            path: self.path.to_string(),
        })?;
        let value = capability
            .check(value.into(), self.builder.options().lenient_values)
            .map_err(|found| BuildError::InvalidValue {
                kind: self.table.kind().to_string(),
                attribute: name.to_string(),
                expected: capability.ty().clone(),
                found: format!("{} {}", found.type_name(), found),
                path: self.path.to_string(),
            })?;
        capability
            .apply(&mut *self.host, self.node, value)
            .map_err(|source| BuildError::Host {
                path: self.path.to_string(),
                source,
            })
    }

    /// Read a property of this node through its capability table.
    pub fn get(&self, name: &str) -> BuildResult<Option<AttrValue>> {
        let capability = self.table.get(name).ok_or_else(|| BuildError::NoSuchCapability {
            kind: self.table.kind().to_string(),
            capability: name.to_string(),
            path: self.path.to_string(),
        })?;
        capability
            .read(&*self.host, self.node)
            .map_err(|source| BuildError::Host {
                path: self.path.to_string(),
                source,
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.contains(name)
    }
}

impl<H: Host + ?Sized> fmt::Debug for BuilderContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext")
            .field("node", &self.node)
            .field("parent", &self.parent)
            .field("kind", &self.table.kind())
            .field("path", &self.path)
            .finish()
    }
}
