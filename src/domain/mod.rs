//! Domain layer: component model, capability registry and the tree builder
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod capability;
pub mod catalog;
pub mod context;
pub mod declaration;
pub mod error;
pub mod host;
pub mod render;
pub mod value;

pub use arena::{ComponentArena, ComponentNode};
pub use builder::{BuildOptions, TreeBuilder};
pub use capability::{Capability, CapabilityRegistry, CapabilityTable};
pub use catalog::{Catalog, Containment, KindSpec};
pub use context::{BuilderContext, DeclPath, Selector};
pub use declaration::Declaration;
pub use error::{BuildError, BuildResult, CatalogError, HostError, HostResult};
pub use host::{Host, NodeId};
pub use render::TreeRender;
pub use value::{AttrValue, Attributes, PropertyType};
