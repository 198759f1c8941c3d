//! Generation manifest
//!
//! ```toml
//! [generator]
//! category_colour = "#5CA65C"
//!
//! [[hosts]]
//! name = "MockActions"
//!
//! [[hosts.actions]]
//! method = "move"
//! block = { label = "Move Robot" }
//! params = [{ name = "speed", type = "float", default = 1.5 }]
//! ```

use anyhow::{bail, Context, Result};
use block_weld::{GeneratorConfig, HostActions};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Host action sets and generator options for one run
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Options shared by every host
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Host action sets in generation order
    #[serde(default)]
    pub hosts: Vec<HostActions>,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(text)?;
        if manifest.hosts.is_empty() {
            bail!("manifest declares no [[hosts]]");
        }
        if manifest.hosts.len() > 1 && manifest.generator.category_name.is_some() {
            bail!("generator.category_name would put every host into the same category");
        }
        let mut seen = HashSet::new();
        if let Some(host) = manifest.hosts.iter().find(|h| !seen.insert(h.name.as_str())) {
            bail!("manifest declares host {} more than once", host.name);
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }
}
