//! Component catalog: node kinds, their capability sets and containment rules
//!
//! A catalog is plain data. The host uses it to instantiate components and
//! enforce containment; the capability registry flattens it into per-kind
//! setter tables.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::CatalogError;
use crate::domain::value::PropertyType;

/// Which children a kind accepts.
///
/// In catalog files: `"none"`, `"any"`, `{ max = 2 }` or `{ only = ["tab"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    #[default]
    None,
    Any,
    Max(usize),
    Only(Vec<String>),
}

impl fmt::Display for Containment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Containment::None => write!(f, "none"),
            Containment::Any => write!(f, "any"),
            Containment::Max(max) => write!(f, "at most {max}"),
            Containment::Only(kinds) => write!(f, "only {}", kinds.join(", ")),
        }
    }
}

/// Definition of one node kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KindSpec {
    /// Capability sets implemented by the kind, in resolution order
    pub capabilities: Vec<String>,
    /// Kind-specific properties; these override set properties of the same name
    pub properties: BTreeMap<String, PropertyType>,
    pub children: Containment,
}

/// A set of kinds and the named capability sets they draw properties from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub capability_sets: BTreeMap<String, BTreeMap<String, PropertyType>>,
    pub kinds: BTreeMap<String, KindSpec>,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid name pattern"))
}

fn check_name(name: &str, context: &str) -> Result<(), CatalogError> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(CatalogError::InvalidName {
            name: name.to_string(),
            context: context.to_string(),
        })
    }
}

impl Catalog {
    /// Parse and validate a catalog from TOML.
    #[instrument(level = "debug", skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn kind(&self, name: &str) -> Option<&KindSpec> {
        self.kinds.get(name)
    }

    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Overlay `other` onto this catalog. Sets and kinds with the same name
    /// are replaced wholesale.
    #[instrument(level = "debug", skip_all)]
    pub fn merge(&mut self, other: Catalog) {
        for (name, set) in other.capability_sets {
            debug!("capability set: {}", name);
            self.capability_sets.insert(name, set);
        }
        for (name, spec) in other.kinds {
            debug!("kind: {}", name);
            self.kinds.insert(name, spec);
        }
    }

    /// Check names and cross references.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (set_name, props) in &self.capability_sets {
            check_name(set_name, "capability sets")?;
            for prop in props.keys() {
                check_name(prop, set_name)?;
            }
        }
        for (kind_name, spec) in &self.kinds {
            check_name(kind_name, "kinds")?;
            for prop in spec.properties.keys() {
                check_name(prop, kind_name)?;
            }
            for set in &spec.capabilities {
                if !self.capability_sets.contains_key(set) {
                    return Err(CatalogError::UndefinedCapabilitySet {
                        kind: kind_name.clone(),
                        set: set.clone(),
                    });
                }
            }
            if let Containment::Only(allowed) = &spec.children {
                if let Some(child) = allowed.iter().find(|c| !self.kinds.contains_key(*c)) {
                    return Err(CatalogError::UndefinedChildKind {
                        kind: kind_name.clone(),
                        child: child.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Built-in catalog modelled on the Vaadin Flow component set.
    pub fn standard() -> Self {
        let mut catalog = Catalog::default();

        let sets: [(&str, Vec<(&str, PropertyType)>); 12] = [
            ("component", vec![("id", PropertyType::String), ("visible", PropertyType::Bool)]),
            (
                "has_size",
                vec![
                    ("width", PropertyType::String),
                    ("height", PropertyType::String),
                    ("min_width", PropertyType::String),
                    ("max_width", PropertyType::String),
                    ("min_height", PropertyType::String),
                    ("max_height", PropertyType::String),
                ],
            ),
            ("has_style", vec![("class_names", PropertyType::List)]),
            ("has_enabled", vec![("enabled", PropertyType::Bool)]),
            ("has_text", vec![("text", PropertyType::String)]),
            ("has_label", vec![("label", PropertyType::String)]),
            ("has_placeholder", vec![("placeholder", PropertyType::String)]),
            ("has_theme", vec![("theme_variants", PropertyType::List)]),
            (
                "has_validation",
                vec![
                    ("required", PropertyType::Bool),
                    ("invalid", PropertyType::Bool),
                    ("error_message", PropertyType::String),
                ],
            ),
            (
                "focusable",
                vec![("autofocus", PropertyType::Bool), ("tab_index", PropertyType::Int)],
            ),
            (
                "flex_layout",
                vec![
                    ("spacing", PropertyType::Bool),
                    ("padding", PropertyType::Bool),
                    ("margin", PropertyType::Bool),
                    (
                        "align_items",
                        one_of(&["start", "center", "end", "stretch", "baseline"]),
                    ),
                    (
                        "justify_content_mode",
                        one_of(&["start", "center", "end", "between", "around", "evenly"]),
                    ),
                ],
            ),
            (
                "text_input",
                vec![
                    ("value", PropertyType::String),
                    ("clear_button_visible", PropertyType::Bool),
                    ("min_length", PropertyType::Int),
                    ("max_length", PropertyType::Int),
                    ("pattern", PropertyType::String),
                ],
            ),
        ];
        for (name, props) in sets {
            catalog.capability_sets.insert(name.to_string(), to_props(props));
        }

        const LAYOUT: &[&str] = &["component", "has_size", "has_style", "has_enabled", "flex_layout"];
        const TEXT_CONTAINER: &[&str] = &["component", "has_size", "has_style", "has_text"];
        const FIELD: &[&str] = &[
            "component",
            "has_size",
            "has_style",
            "has_enabled",
            "has_label",
            "has_placeholder",
            "has_validation",
            "focusable",
            "has_theme",
        ];
        const TEXT_FIELD: &[&str] = &[
            "component",
            "has_size",
            "has_style",
            "has_enabled",
            "has_label",
            "has_placeholder",
            "has_validation",
            "focusable",
            "has_theme",
            "text_input",
        ];

        let kinds: Vec<(&str, KindSpec)> = vec![
            ("vertical_layout", kind(LAYOUT, vec![], Containment::Any)),
            ("horizontal_layout", kind(LAYOUT, vec![], Containment::Any)),
            (
                "form_layout",
                kind(
                    &["component", "has_size", "has_style", "has_enabled"],
                    vec![("responsive_steps", PropertyType::List)],
                    Containment::Any,
                ),
            ),
            (
                "split_layout",
                kind(
                    &["component", "has_size", "has_style"],
                    vec![
                        ("orientation", one_of(&["horizontal", "vertical"])),
                        ("splitter_position", PropertyType::Float),
                    ],
                    Containment::Max(2),
                ),
            ),
            ("div", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("span", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("h1", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("h2", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("h3", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("paragraph", kind(TEXT_CONTAINER, vec![], Containment::Any)),
            ("label", kind(TEXT_CONTAINER, vec![], Containment::None)),
            (
                "anchor",
                kind(
                    &["component", "has_style", "has_text", "has_enabled"],
                    vec![("href", PropertyType::String), ("target", PropertyType::String)],
                    Containment::Any,
                ),
            ),
            (
                "router_link",
                kind(
                    &["component", "has_style", "has_text"],
                    vec![("route", PropertyType::String)],
                    Containment::None,
                ),
            ),
            (
                "image",
                kind(
                    &["component", "has_size", "has_style"],
                    vec![("src", PropertyType::String), ("alt", PropertyType::String)],
                    Containment::None,
                ),
            ),
            (
                "icon",
                kind(
                    &["component", "has_size", "has_style"],
                    vec![("icon", PropertyType::String), ("color", PropertyType::String)],
                    Containment::None,
                ),
            ),
            (
                "button",
                kind(
                    &[
                        "component",
                        "has_size",
                        "has_style",
                        "has_enabled",
                        "has_text",
                        "has_theme",
                        "focusable",
                    ],
                    vec![
                        ("icon_after_text", PropertyType::Bool),
                        ("disable_on_click", PropertyType::Bool),
                    ],
                    Containment::Only(vec!["icon".to_string()]),
                ),
            ),
            ("text_field", kind(TEXT_FIELD, vec![], Containment::None)),
            ("text_area", kind(TEXT_FIELD, vec![], Containment::None)),
            ("email_field", kind(TEXT_FIELD, vec![], Containment::None)),
            (
                "password_field",
                kind(
                    TEXT_FIELD,
                    vec![("reveal_button_visible", PropertyType::Bool)],
                    Containment::None,
                ),
            ),
            (
                "integer_field",
                kind(
                    FIELD,
                    vec![
                        ("value", PropertyType::Int),
                        ("min", PropertyType::Int),
                        ("max", PropertyType::Int),
                        ("step", PropertyType::Int),
                        ("has_controls", PropertyType::Bool),
                    ],
                    Containment::None,
                ),
            ),
            (
                "number_field",
                kind(
                    FIELD,
                    vec![
                        ("value", PropertyType::Float),
                        ("min", PropertyType::Float),
                        ("max", PropertyType::Float),
                        ("step", PropertyType::Float),
                        ("has_controls", PropertyType::Bool),
                    ],
                    Containment::None,
                ),
            ),
            (
                "checkbox",
                kind(
                    &["component", "has_style", "has_enabled", "has_label", "focusable"],
                    vec![("value", PropertyType::Bool), ("indeterminate", PropertyType::Bool)],
                    Containment::None,
                ),
            ),
            (
                "combo_box",
                kind(
                    FIELD,
                    vec![
                        ("items", PropertyType::List),
                        ("value", PropertyType::String),
                        ("allow_custom_value", PropertyType::Bool),
                        ("clear_button_visible", PropertyType::Bool),
                    ],
                    Containment::None,
                ),
            ),
            (
                "radio_button_group",
                kind(
                    &["component", "has_style", "has_enabled", "has_label"],
                    vec![("items", PropertyType::List), ("value", PropertyType::String)],
                    Containment::None,
                ),
            ),
            (
                "date_picker",
                kind(
                    FIELD,
                    vec![
                        ("value", PropertyType::String),
                        ("min", PropertyType::String),
                        ("max", PropertyType::String),
                        ("clear_button_visible", PropertyType::Bool),
                    ],
                    Containment::None,
                ),
            ),
            (
                "grid",
                kind(
                    &["component", "has_size", "has_style", "has_theme"],
                    vec![
                        ("columns", PropertyType::List),
                        ("page_size", PropertyType::Int),
                        ("all_rows_visible", PropertyType::Bool),
                        ("column_reordering_allowed", PropertyType::Bool),
                        ("selection_mode", one_of(&["single", "multi", "none"])),
                    ],
                    Containment::None,
                ),
            ),
            (
                "dialog",
                kind(
                    &["component", "has_size", "has_style"],
                    vec![
                        ("opened", PropertyType::Bool),
                        ("modal", PropertyType::Bool),
                        ("close_on_esc", PropertyType::Bool),
                        ("close_on_outside_click", PropertyType::Bool),
                        ("draggable", PropertyType::Bool),
                        ("resizable", PropertyType::Bool),
                    ],
                    Containment::Any,
                ),
            ),
            (
                "details",
                kind(
                    &["component", "has_style", "has_enabled"],
                    vec![("summary_text", PropertyType::String), ("opened", PropertyType::Bool)],
                    Containment::Any,
                ),
            ),
            (
                "tabs",
                kind(
                    &["component", "has_size", "has_style", "has_theme"],
                    vec![
                        ("orientation", one_of(&["horizontal", "vertical"])),
                        ("selected_index", PropertyType::Int),
                    ],
                    Containment::Only(vec!["tab".to_string()]),
                ),
            ),
            (
                "tab",
                kind(
                    &["component", "has_style", "has_enabled", "has_label"],
                    vec![("selected", PropertyType::Bool)],
                    Containment::Any,
                ),
            ),
            (
                "notification",
                kind(
                    &["component", "has_text", "has_theme"],
                    vec![
                        ("duration", PropertyType::Int),
                        (
                            "position",
                            one_of(&[
                                "top_stretch",
                                "top_start",
                                "top_center",
                                "top_end",
                                "middle",
                                "bottom_start",
                                "bottom_center",
                                "bottom_end",
                                "bottom_stretch",
                            ]),
                        ),
                    ],
                    Containment::None,
                ),
            ),
            (
                "progress_bar",
                kind(
                    &["component", "has_size", "has_style", "has_theme"],
                    vec![
                        ("value", PropertyType::Float),
                        ("min", PropertyType::Float),
                        ("max", PropertyType::Float),
                        ("indeterminate", PropertyType::Bool),
                    ],
                    Containment::None,
                ),
            ),
        ];
        for (name, spec) in kinds {
            catalog.kinds.insert(name.to_string(), spec);
        }

        catalog
    }
}

fn one_of(values: &[&str]) -> PropertyType {
    PropertyType::OneOf(values.iter().map(|v| v.to_string()).collect())
}

fn to_props(entries: Vec<(&str, PropertyType)>) -> BTreeMap<String, PropertyType> {
    entries
        .into_iter()
        .map(|(name, ty)| (name.to_string(), ty))
        .collect()
}

fn kind(sets: &[&str], properties: Vec<(&str, PropertyType)>, children: Containment) -> KindSpec {
    KindSpec {
        capabilities: sets.iter().map(|s| s.to_string()).collect(),
        properties: to_props(properties),
        children,
    }
}
