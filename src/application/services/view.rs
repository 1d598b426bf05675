//! View service
//!
//! Loads catalogs and declaration files, builds them into a component arena
//! and prepares results for display.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    BuildOptions, Catalog, CatalogError, ComponentArena, Containment, Declaration, Host, HostError,
    NodeId, PropertyType, TreeBuilder, TreeRender,
};
use crate::infrastructure::traits::FileSystem;

/// A successfully built view.
#[derive(Debug)]
pub struct BuiltView {
    pub arena: ComponentArena,
    /// Top of the built tree (the synthetic parent when one was requested)
    pub root: NodeId,
}

impl BuiltView {
    pub fn render(&self) -> Tree<String> {
        self.arena.to_tree_string(self.root)
    }

    /// Read the built tree back as a declaration.
    pub fn snapshot(&self) -> ApplicationResult<Declaration> {
        Ok(self.arena.snapshot(self.root)?)
    }

    pub fn to_json(&self) -> ApplicationResult<String> {
        let snapshot = self.snapshot()?;
        serde_json::to_string_pretty(&snapshot).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize snapshot".to_string(),
            source: Box::new(e),
        })
    }
}

/// Shape of a successfully built declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub components: usize,
    pub leaves: usize,
    pub depth: usize,
}

impl CheckSummary {
    fn of(view: &BuiltView) -> Self {
        Self {
            components: view.arena.iter(view.root).count(),
            leaves: view.arena.leaf_nodes(view.root).len(),
            depth: view.arena.depth(view.root),
        }
    }
}

/// Result of checking one declaration file.
#[derive(Debug)]
pub struct CheckReport {
    pub path: PathBuf,
    pub outcome: Result<CheckSummary, ApplicationError>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One property as seen by a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReport {
    pub name: String,
    pub ty: PropertyType,
    /// Capability set the property comes from, or the kind itself
    pub origin: String,
}

/// Everything a kind supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: String,
    pub capability_sets: Vec<String>,
    pub properties: Vec<PropertyReport>,
    pub children: Containment,
}

/// Service for building declared views.
pub struct ViewService {
    fs: Arc<dyn FileSystem>,
    catalog: Arc<Catalog>,
    builder: TreeBuilder,
}

impl ViewService {
    /// Create a service from settings: the built-in catalog overlaid with
    /// every configured catalog file.
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> ApplicationResult<Self> {
        let mut catalog = Catalog::standard();
        for path in &settings.catalogs {
            let extra = Self::read_catalog(fs.as_ref(), path)?;
            catalog.merge(extra);
            catalog
                .validate()
                .map_err(|source| ApplicationError::Catalog {
                    path: path.clone(),
                    source,
                })?;
            info!("loaded catalog {}", path.display());
        }
        Self::with_catalog(fs, catalog, settings.build_options())
    }

    /// Create a service over an explicit catalog. The catalog is validated
    /// first.
    pub fn with_catalog(
        fs: Arc<dyn FileSystem>,
        catalog: Catalog,
        options: BuildOptions,
    ) -> ApplicationResult<Self> {
        catalog.validate()?;
        let builder = TreeBuilder::from_catalog(&catalog).with_options(options);
        Ok(Self {
            fs,
            catalog: Arc::new(catalog),
            builder,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Parse a catalog file without validating it; references may point
    /// into the catalog it is merged onto.
    fn read_catalog(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Catalog> {
        let content = fs.read_to_string(path).with_path_context("read catalog", path)?;
        toml::from_str(&content).map_err(|e| ApplicationError::Catalog {
            path: path.to_path_buf(),
            source: CatalogError::from(e),
        })
    }

    /// Load a declaration. `.json` files are JSON, everything else TOML.
    #[instrument(level = "debug", skip(self))]
    pub fn load_declaration(&self, path: &Path) -> ApplicationResult<Declaration> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read declaration", path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Declaration::from_json(&content).map_err(|e| e.to_string())
        } else {
            Declaration::from_toml(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ApplicationError::Declaration {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Build a declaration into a fresh arena.
    ///
    /// With `parent_kind`, a bare component of that kind is created first and
    /// the declaration is attached beneath it.
    #[instrument(level = "debug", skip(self, declaration), fields(kind = %declaration.kind))]
    pub fn build(
        &self,
        declaration: &Declaration,
        parent_kind: Option<&str>,
    ) -> ApplicationResult<BuiltView> {
        let mut arena = ComponentArena::new(Arc::clone(&self.catalog));
        let parent = parent_kind.map(|kind| arena.instantiate(kind)).transpose()?;

        let node = self
            .builder
            .build_declaration(&mut arena, parent, declaration)?;
        debug!("built {} components", arena.len());

        Ok(BuiltView {
            arena,
            root: parent.unwrap_or(node),
        })
    }

    pub fn build_file(&self, path: &Path, parent_kind: Option<&str>) -> ApplicationResult<BuiltView> {
        let declaration = self.load_declaration(path)?;
        self.build(&declaration, parent_kind)
    }

    /// Build every file independently and report each outcome.
    pub fn check_files(&self, paths: &[PathBuf]) -> Vec<CheckReport> {
        paths
            .iter()
            .map(|path| {
                let outcome = self.build_file(path, None).map(|view| CheckSummary::of(&view));
                CheckReport {
                    path: path.clone(),
                    outcome,
                }
            })
            .collect()
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.catalog.kind_names().collect()
    }

    /// Describe a kind's resolved capability table.
    pub fn describe_kind(&self, kind: &str) -> ApplicationResult<KindReport> {
        let spec = self
            .catalog
            .kind(kind)
            .ok_or_else(|| HostError::UnknownKind(kind.to_string()))?;
        let table = self
            .builder
            .registry()
            .table(kind)
            .ok_or_else(|| HostError::UnknownKind(kind.to_string()))?;

        Ok(KindReport {
            kind: kind.to_string(),
            capability_sets: spec.capabilities.clone(),
            properties: table
                .iter()
                .map(|cap| PropertyReport {
                    name: cap.name().to_string(),
                    ty: cap.ty().clone(),
                    origin: cap.origin().to_string(),
                })
                .collect(),
            children: spec.children.clone(),
        })
    }
}
