//! Capability registry
//!
//! Resolves, once per catalog, which attributes each node kind exposes and
//! with which type. Builder contexts look setters up here instead of
//! dispatching on names at call time.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::catalog::Catalog;
use crate::domain::error::HostResult;
use crate::domain::host::{Host, NodeId};
use crate::domain::value::{AttrValue, PropertyType};

/// A settable/gettable property of one node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    name: String,
    ty: PropertyType,
    /// Capability set that contributed the property, or the kind itself
    origin: String,
}

impl Capability {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &PropertyType {
        &self.ty
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Type-check `value` against this capability.
    pub fn check(&self, value: AttrValue, lenient: bool) -> Result<AttrValue, AttrValue> {
        value.coerce(&self.ty, lenient)
    }

    /// Store an already checked value on `node`.
    pub fn apply<H: Host + ?Sized>(
        &self,
        host: &mut H,
        node: NodeId,
        value: AttrValue,
    ) -> HostResult<()> {
        host.write_property(node, &self.name, value)
    }

    pub fn read<H: Host + ?Sized>(&self, host: &H, node: NodeId) -> HostResult<Option<AttrValue>> {
        host.read_property(node, &self.name)
    }
}

/// All capabilities of one node kind, keyed by attribute name.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    kind: String,
    entries: BTreeMap<String, Capability>,
}

impl CapabilityTable {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Capability tables for every kind of a catalog.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    tables: BTreeMap<String, Arc<CapabilityTable>>,
}

impl CapabilityRegistry {
    /// Flatten the catalog into one table per kind.
    ///
    /// Capability sets are applied in the order the kind lists them, later
    /// sets and then the kind's own properties overriding earlier entries.
    #[instrument(level = "debug", skip_all)]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut tables = BTreeMap::new();

        for (kind, spec) in &catalog.kinds {
            let mut entries = BTreeMap::new();
            let sets = spec.capabilities.iter().filter_map(|set| {
                let props = catalog.capability_sets.get(set);
                if props.is_none() {
                    warn!("{}: undefined capability set {}, skipped", kind, set);
                }
                props.map(|props| (set, props))
            });
            for (set, props) in sets {
                for (name, ty) in props {
                    entries.insert(name.clone(), capability(name, ty, set));
                }
            }
            for (name, ty) in &spec.properties {
                entries.insert(name.clone(), capability(name, ty, kind));
            }

            debug!("{}: {} capabilities", kind, entries.len());
            tables.insert(
                kind.clone(),
                Arc::new(CapabilityTable {
                    kind: kind.clone(),
                    entries,
                }),
            );
        }

        Self { tables }
    }

    pub fn table(&self, kind: &str) -> Option<&Arc<CapabilityTable>> {
        self.tables.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

fn capability(name: &str, ty: &PropertyType, origin: &str) -> Capability {
    Capability {
        name: name.to_string(),
        ty: ty.clone(),
        origin: origin.to_string(),
    }
}
