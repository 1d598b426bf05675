//! Data-driven declarations: the nested description as a value.
//!
//! ```toml
//! kind = "vertical_layout"
//! attributes = { spacing = true }
//!
//! [[children]]
//! kind = "button"
//! attributes = { text = "Save" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::value::Attributes;

/// One declared component with its attributes and nested declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Declaration>,
}

impl Declaration {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_child(mut self, child: Declaration) -> Self {
        self.children.push(child);
        self
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Number of declarations including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Declaration::node_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Declaration::depth)
            .max()
            .unwrap_or(0)
    }
}
