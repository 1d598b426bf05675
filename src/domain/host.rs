//! Host component model boundary
//!
//! The builder never owns components. It drives whatever host implements
//! this trait: instantiation, property access and parent-child linking.

use std::fmt;

use generational_arena::Index;

use crate::domain::error::HostResult;
use crate::domain::value::AttrValue;

/// Opaque handle to a component owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl NodeId {
    pub(crate) fn from_index(index: Index) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}v{generation}")
    }
}

/// Operations the builder needs from a host component model.
pub trait Host {
    /// Create a detached component of the given kind.
    fn instantiate(&mut self, kind: &str) -> HostResult<NodeId>;

    /// Kind of an existing component.
    fn kind_of(&self, node: NodeId) -> HostResult<&str>;

    /// Store a property value. Values arrive already type-checked.
    fn write_property(&mut self, node: NodeId, name: &str, value: AttrValue) -> HostResult<()>;

    /// Read a property value, `None` when never set.
    fn read_property(&self, node: NodeId, name: &str) -> HostResult<Option<AttrValue>>;

    /// Check whether `parent` would accept one more child of `child_kind`.
    fn accepts_child(&self, parent: NodeId, child_kind: &str) -> HostResult<()>;

    /// Append `child` to the children of `parent`, detaching it from any
    /// previous parent first.
    fn add_child(&mut self, parent: NodeId, child: NodeId) -> HostResult<()>;

    fn parent_of(&self, node: NodeId) -> HostResult<Option<NodeId>>;

    fn children_of(&self, node: NodeId) -> HostResult<&[NodeId]>;
}
