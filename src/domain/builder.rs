//! Tree builder engine: turns nested declarations into an attached,
//! configured component tree.

use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use crate::domain::capability::{Capability, CapabilityRegistry, CapabilityTable};
use crate::domain::catalog::Catalog;
use crate::domain::context::{BuilderContext, DeclPath, Selector};
use crate::domain::declaration::Declaration;
use crate::domain::error::{BuildError, BuildResult, HostError};
use crate::domain::host::{Host, NodeId};
use crate::domain::value::{AttrValue, Attributes};

/// Knobs that change how declarations are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Parse strings into bools/numbers and accept scalars for strings
    pub lenient_values: bool,
}

/// Parent side of a nested declaration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParentLink<'p> {
    pub node: NodeId,
    pub path: &'p DeclPath,
}

/// Builds component trees on any [`Host`].
///
/// Holds only the capability registry and options; all tree state lives in
/// the host and in the call stack of [`BuilderContext`]s.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    registry: Arc<CapabilityRegistry>,
    options: BuildOptions,
}

impl TreeBuilder {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            options: BuildOptions::default(),
        }
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(Arc::new(CapabilityRegistry::from_catalog(catalog)))
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Declare a root component and configure it with `block`.
    pub fn build<H, S, F>(
        &self,
        host: &mut H,
        selector: S,
        attrs: Attributes,
        block: F,
    ) -> BuildResult<NodeId>
    where
        H: Host + ?Sized,
        S: Into<Selector>,
        F: FnOnce(&mut BuilderContext<'_, H>) -> BuildResult<()>,
    {
        self.create(host, None, selector.into(), attrs, block)
    }

    /// Declare a component under an existing `parent` and configure it.
    pub fn build_into<H, S, F>(
        &self,
        host: &mut H,
        parent: NodeId,
        selector: S,
        attrs: Attributes,
        block: F,
    ) -> BuildResult<NodeId>
    where
        H: Host + ?Sized,
        S: Into<Selector>,
        F: FnOnce(&mut BuilderContext<'_, H>) -> BuildResult<()>,
    {
        let parent_path = DeclPath::root(host.kind_of(parent).map_err(|source| BuildError::Host {
            path: "/".to_string(),
            source,
        })?);
        let link = ParentLink {
            node: parent,
            path: &parent_path,
        };
        self.create(host, Some(link), selector.into(), attrs, block)
    }

    /// Build a data-driven declaration, optionally under `parent`.
    pub fn build_declaration<H: Host + ?Sized>(
        &self,
        host: &mut H,
        parent: Option<NodeId>,
        declaration: &Declaration,
    ) -> BuildResult<NodeId> {
        let block = |ctx: &mut BuilderContext<'_, H>| declare_children(ctx, declaration);
        let attrs = declaration.attributes.clone();
        match parent {
            Some(parent) => self.build_into(host, parent, declaration.kind.as_str(), attrs, block),
            None => self.build(host, declaration.kind.as_str(), attrs, block),
        }
    }

    /// One node-creation step: resolve, check, instantiate, apply, attach,
    /// then run the configuration block.
    pub(crate) fn create<H, F>(
        &self,
        host: &mut H,
        parent: Option<ParentLink<'_>>,
        selector: Selector,
        attrs: Attributes,
        block: F,
    ) -> BuildResult<NodeId>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut BuilderContext<'_, H>) -> BuildResult<()>,
    {
        let (kind, existing) = match selector {
            Selector::Kind(kind) => (kind, None),
            Selector::Existing(node) => {
                let kind = host.kind_of(node).map_err(|source| BuildError::Host {
                    path: parent.map_or_else(|| "/".to_string(), |p| p.path.to_string()),
                    source,
                })?;
                (kind.to_string(), Some(node))
            }
        };

        let already_child = match (parent, existing) {
            (Some(link), Some(node)) => host.parent_of(node).ok().flatten() == Some(link.node),
            _ => false,
        };

        let path = match parent {
            Some(link) => {
                let count = host.children_of(link.node).map_or(0, |children| children.len());
                // a re-declared child moves to the end rather than growing the list
                let index = if already_child { count.saturating_sub(1) } else { count };
                link.path.child(&kind, index)
            }
            None => DeclPath::root(&kind),
        };
        let _span = debug_span!("declare", path = %path).entered();

        let table = self
            .registry
            .table(&kind)
            .cloned()
            .ok_or_else(|| BuildError::UnknownKind {
                kind: kind.clone(),
                path: path.to_string(),
            })?;

        // every attribute is checked before anything is touched
        let checked = self.check_attributes(&table, attrs, &path)?;

        if let Some(link) = parent {
            if let Some(node) = existing {
                if is_ancestor_or_self(&*host, node, link.node) {
                    let source = HostError::Cycle {
                        parent: host.kind_of(link.node).unwrap_or("<stale>").to_string(),
                        child: kind.clone(),
                    };
                    return Err(attachment_error(&*host, link.node, &kind, &path, source));
                }
            }
            if !already_child {
                host.accepts_child(link.node, &kind)
                    .map_err(|source| attachment_error(&*host, link.node, &kind, &path, source))?;
            }
        }

        let node = match existing {
            Some(node) => node,
            None => host.instantiate(&kind).map_err(|source| match source {
                HostError::UnknownKind(kind) => BuildError::UnknownKind {
                    kind,
                    path: path.to_string(),
                },
                source => BuildError::Host {
                    path: path.to_string(),
                    source,
                },
            })?,
        };

        for (capability, value) in checked {
            trace!("{} = {}", capability.name(), value);
            capability
                .apply(&mut *host, node, value)
                .map_err(|source| BuildError::Host {
                    path: path.to_string(),
                    source,
                })?;
        }

        if let Some(link) = parent {
            host.add_child(link.node, node)
                .map_err(|source| attachment_error(&*host, link.node, &kind, &path, source))?;
        }
        debug!("declared {} as {}", kind, node);

        let parent_node = parent.map(|link| link.node);
        let mut ctx = BuilderContext::new(self, host, node, parent_node, table, path);
        block(&mut ctx)?;

        Ok(node)
    }

    fn check_attributes<'t>(
        &self,
        table: &'t CapabilityTable,
        attrs: Attributes,
        path: &DeclPath,
    ) -> BuildResult<Vec<(&'t Capability, AttrValue)>> {
        attrs
            .into_iter()
            .map(|(name, value)| -> BuildResult<(&'t Capability, AttrValue)> {
                let capability =
                    table
                        .get(&name)
                        .ok_or_else(|| BuildError::UnsupportedAttribute {
                            kind: table.kind().to_string(),
                            attribute: name.clone(),
                            path: path.to_string(),
                        })?;
                let value = capability
                    .check(value, self.options.lenient_values)
                    .map_err(|found| BuildError::InvalidValue {
                        kind: table.kind().to_string(),
                        attribute: name.clone(),
                        expected: capability.ty().clone(),
                        found: format!("{} {}", found.type_name(), found),
                        path: path.to_string(),
                    })?;
                Ok((capability, value))
            })
            .collect()
    }
}

fn declare_children<H: Host + ?Sized>(
    ctx: &mut BuilderContext<'_, H>,
    declaration: &Declaration,
) -> BuildResult<()> {
    for child in &declaration.children {
        ctx.add_with(
            child.kind.as_str(),
            child.attributes.clone(),
            |nested: &mut BuilderContext<'_, H>| declare_children(nested, child),
        )?;
    }
    Ok(())
}

/// Whether `ancestor` is `node` or sits above it.
fn is_ancestor_or_self<H: Host + ?Sized>(host: &H, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = host.parent_of(id).ok().flatten();
    }
    false
}

fn attachment_error<H: Host + ?Sized>(
    host: &H,
    parent: NodeId,
    child_kind: &str,
    path: &DeclPath,
    source: HostError,
) -> BuildError {
    BuildError::Attachment {
        parent: host.kind_of(parent).unwrap_or("<stale>").to_string(),
        child: child_kind.to_string(),
        path: path.to_string(),
        source,
    }
}
