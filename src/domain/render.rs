use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{ComponentArena, ComponentNode};
use crate::domain::host::NodeId;

/// Conversion of a built component subtree into a printable `termtree`.
pub trait TreeRender {
    fn to_tree_string(&self, root: NodeId) -> Tree<String>;
}

/// `kind` or `kind {name=value, ...}`.
pub fn node_label(node: &ComponentNode) -> String {
    if node.properties.is_empty() {
        node.kind.clone()
    } else {
        let props = node
            .properties
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .join(", ");
        format!("{} {{{}}}", node.kind, props)
    }
}

impl TreeRender for ComponentArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeId) -> Tree<String> {
        fn build_tree(arena: &ComponentArena, node_id: NodeId, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_id) {
                for &child_id in &node.children {
                    if let Some(child) = arena.get_node(child_id) {
                        let mut child_tree = Tree::new(node_label(child));
                        build_tree(arena, child_id, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.get_node(root) {
            Some(node) => {
                let mut tree = Tree::new(node_label(node));
                build_tree(self, root, &mut tree);
                tree
            }
            None => Tree::new("<stale node>".to_string()),
        }
    }
}
