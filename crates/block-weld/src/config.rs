//! Generator configuration
//!
//! Read from the `[generator]` table of a manifest, or built in code.
//! Unknown keys are rejected so that typos fail the run instead of being
//! silently ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Default Blockly hue for generated blocks
pub const DEFAULT_BLOCK_COLOUR: u32 = 65;

/// Default object the generated Python calls go through
pub const DEFAULT_CALL_NAMESPACE: &str = "self.action_implementer";

/// Default JavaScript namespace holding shared defaults and helpers
pub const DEFAULT_REGISTRY_NAMESPACE: &str = "MCED";

/// Options for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Extra or overriding source type -> check type entries
    pub type_map: BTreeMap<String, String>,
    /// Shadow markup per domain type name
    pub shadow_map: BTreeMap<String, String>,
    /// Extra or overriding zero constructors per domain type name
    pub zero_values: BTreeMap<String, String>,
    /// Palette category name (defaults to the title-cased host name)
    pub category_name: Option<String>,
    /// Palette category colour (defaults to the block colour)
    pub category_colour: Option<String>,
    /// Blockly hue of generated blocks
    pub block_colour: u32,
    /// Block id prefix (defaults to the snake_cased host name)
    pub block_prefix: Option<String>,
    /// Python expression the generated calls are made on
    pub call_namespace: String,
    /// JavaScript namespace of the defaults registry
    pub registry_namespace: String,
    /// Module specifier the block definition module imports from
    pub blocks_import: String,
    /// Module specifier the generator module imports from
    pub generators_import: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            type_map: BTreeMap::new(),
            shadow_map: BTreeMap::new(),
            zero_values: BTreeMap::new(),
            category_name: None,
            category_colour: None,
            block_colour: DEFAULT_BLOCK_COLOUR,
            block_prefix: None,
            call_namespace: DEFAULT_CALL_NAMESPACE.to_string(),
            registry_namespace: DEFAULT_REGISTRY_NAMESPACE.to_string(),
            blocks_import: "../lib/constants.mjs".to_string(),
            generators_import: "../../lib/constants.mjs".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Category colour, falling back to the block colour
    pub fn category_colour(&self) -> String {
        self.category_colour
            .clone()
            .unwrap_or_else(|| self.block_colour.to_string())
    }
}
