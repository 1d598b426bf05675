//! Arena-backed component model implementing [`Host`].

use std::collections::BTreeMap;
use std::sync::Arc;

use generational_arena::Arena;
use tracing::instrument;

use crate::domain::catalog::{Catalog, Containment};
use crate::domain::declaration::Declaration;
use crate::domain::error::{HostError, HostResult};
use crate::domain::host::{Host, NodeId};
use crate::domain::value::AttrValue;

/// A live component in the arena.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// Catalog kind the component was instantiated from
    pub kind: String,
    /// Properties explicitly set on this component
    pub properties: BTreeMap<String, AttrValue>,
    /// Parent component, None while detached
    pub parent: Option<NodeId>,
    /// Children in attachment order
    pub children: Vec<NodeId>,
}

/// Component tree storage.
///
/// Uses a generational arena so that handles of removed components are
/// detected as stale instead of aliasing new ones. Detached components are
/// tracked as roots in creation order.
#[derive(Debug)]
pub struct ComponentArena {
    arena: Arena<ComponentNode>,
    roots: Vec<NodeId>,
    catalog: Arc<Catalog>,
}

impl Default for ComponentArena {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::standard()))
    }
}

impl ComponentArena {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Detached components, in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.arena.get(id.index())
    }

    fn node(&self, id: NodeId) -> HostResult<&ComponentNode> {
        self.arena.get(id.index()).ok_or(HostError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> HostResult<&mut ComponentNode> {
        self.arena.get_mut(id.index()).ok_or(HostError::StaleNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.index())
    }

    /// Pre-order walk of the subtree rooted at `root`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self, root: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, root)
    }

    /// Number of levels in the subtree, 1 for a lone component, 0 for a
    /// stale handle.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, root: NodeId) -> usize {
        match self.get_node(root) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Components without children, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.iter(root)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Read a built subtree back into a declaration.
    ///
    /// Attributes are exactly the properties set on each component.
    pub fn snapshot(&self, root: NodeId) -> HostResult<Declaration> {
        let node = self.node(root)?;
        let children = node
            .children
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<HostResult<Vec<_>>>()?;
        Ok(Declaration {
            kind: node.kind.clone(),
            attributes: node.properties.clone(),
            children,
        })
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get_node(id).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, child: NodeId) -> HostResult<()> {
        let previous = self.node(child)?.parent;
        match previous {
            Some(old_parent) => self.node_mut(old_parent)?.children.retain(|&c| c != child),
            None => self.roots.retain(|&r| r != child),
        }
        self.node_mut(child)?.parent = None;
        Ok(())
    }
}

impl Host for ComponentArena {
    #[instrument(level = "trace", skip(self))]
    fn instantiate(&mut self, kind: &str) -> HostResult<NodeId> {
        if self.catalog.kind(kind).is_none() {
            return Err(HostError::UnknownKind(kind.to_string()));
        }
        let id = NodeId::from_index(self.arena.insert(ComponentNode {
            kind: kind.to_string(),
            properties: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }));
        self.roots.push(id);
        Ok(id)
    }

    fn kind_of(&self, node: NodeId) -> HostResult<&str> {
        Ok(&self.node(node)?.kind)
    }

    #[instrument(level = "trace", skip(self, value))]
    fn write_property(&mut self, node: NodeId, name: &str, value: AttrValue) -> HostResult<()> {
        self.node_mut(node)?
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    fn read_property(&self, node: NodeId, name: &str) -> HostResult<Option<AttrValue>> {
        Ok(self.node(node)?.properties.get(name).cloned())
    }

    fn accepts_child(&self, parent: NodeId, child_kind: &str) -> HostResult<()> {
        let node = self.node(parent)?;
        let spec = self
            .catalog
            .kind(&node.kind)
            .ok_or_else(|| HostError::UnknownKind(node.kind.clone()))?;

        match &spec.children {
            Containment::None => Err(HostError::RejectsChildren {
                parent: node.kind.clone(),
            }),
            Containment::Any => Ok(()),
            Containment::Max(max) if node.children.len() >= *max => {
                Err(HostError::CapacityExceeded {
                    parent: node.kind.clone(),
                    max: *max,
                })
            }
            Containment::Max(_) => Ok(()),
            Containment::Only(allowed) if !allowed.iter().any(|k| k == child_kind) => {
                Err(HostError::ChildKindNotAllowed {
                    parent: node.kind.clone(),
                    child: child_kind.to_string(),
                    allowed: allowed.clone(),
                })
            }
            Containment::Only(_) => Ok(()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn add_child(&mut self, parent: NodeId, child: NodeId) -> HostResult<()> {
        let child_kind = self.node(child)?.kind.clone();
        let parent_kind = self.node(parent)?.kind.clone();

        if self.is_ancestor_or_self(child, parent) {
            return Err(HostError::Cycle {
                parent: parent_kind,
                child: child_kind,
            });
        }
        // moving within the same parent must not count against capacity
        if self.node(child)?.parent != Some(parent) {
            self.accepts_child(parent, &child_kind)?;
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn parent_of(&self, node: NodeId) -> HostResult<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    fn children_of(&self, node: NodeId) -> HostResult<&[NodeId]> {
        Ok(&self.node(node)?.children)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a ComponentArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a ComponentArena, root: NodeId) -> Self {
        Self {
            arena,
            stack: vec![root],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a ComponentNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // reverse push keeps left-to-right order
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
