//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/flowtree/flowtree.toml`
//! 3. Environment variables: `FLOWTREE_*` prefix
//! 4. Command-line flags (applied by the CLI)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::BuildOptions;

/// Unified configuration for flowtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Extra catalog files merged over the built-in catalog, in order
    pub catalogs: Vec<PathBuf>,
    /// Coerce string attribute values ("true", "42") to the declared type
    pub lenient_values: bool,
}

/// Raw settings for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub catalogs: Option<Vec<PathBuf>>,
    pub lenient_values: Option<bool>,
}

/// Get the XDG config directory for flowtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "flowtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("flowtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Builder options derived from these settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            lenient_values: self.lenient_values,
        }
    }

    /// Expand `~` and `$VAR` in catalog paths.
    fn expand_paths(&mut self) {
        self.catalogs = self
            .catalogs
            .iter()
            .map(|path| {
                let raw = path.to_string_lossy();
                match shellexpand::full(raw.as_ref()) {
                    Ok(expanded) => PathBuf::from(expanded.as_ref()),
                    Err(_) => path.clone(),
                }
            })
            .collect();
    }

    /// Overlay a raw layer: scalars win if set, catalog lists replace.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            catalogs: overlay
                .catalogs
                .clone()
                .unwrap_or_else(|| self.catalogs.clone()),
            lenient_values: overlay.lenient_values.unwrap_or(self.lenient_values),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `config_file` replaces the global config location when given.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global (or explicitly given) config file
        let path = config_file
            .map(Path::to_path_buf)
            .or_else(global_config_path);
        if let Some(path) = path {
            if path.exists() {
                let raw = load_raw_settings(&path)?;
                current = current.merge_with(&raw);
            } else if config_file.is_some() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply FLOWTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("FLOWTREE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("catalogs")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("catalogs") {
            settings.catalogs = val.into_iter().map(PathBuf::from).collect();
        }
        if let Ok(val) = config.get_bool("lenient_values") {
            settings.lenient_values = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# flowtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/flowtree/flowtree.toml
#   Env:    FLOWTREE_* environment variables (FLOWTREE_CATALOGS is comma separated)
#   Flags:  --catalog, --lenient

# Catalog files merged over the built-in component catalog, in order.
# Kinds and capability sets with the same name replace earlier definitions.
# catalogs = ["~/.config/flowtree/my-components.toml"]

# Accept "true"/"42" strings for bool/int properties
# lenient_values = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
