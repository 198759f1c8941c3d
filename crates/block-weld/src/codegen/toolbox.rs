//! Toolbox category fragments

use crate::ir::BlockSpec;
use quick_xml::escape::escape;

const INDENT: &str = "  ";

/// A named, coloured palette category listing generated blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFragment {
    /// Category name; the key used when merging
    pub name: String,
    /// Category colour (hue or `#rrggbb`)
    pub colour: String,
    /// Block ids in enumeration order
    pub block_ids: Vec<String>,
}

impl CategoryFragment {
    /// Create a fragment
    pub fn new(name: impl Into<String>, colour: impl Into<String>, block_ids: Vec<String>) -> Self {
        Self {
            name: name.into(),
            colour: colour.into(),
            block_ids,
        }
    }

    /// Create a fragment listing `blocks`
    pub fn from_blocks(name: impl Into<String>, colour: impl Into<String>, blocks: &[BlockSpec]) -> Self {
        let ids = blocks.iter().map(|b| b.block_id.clone()).collect();
        Self::new(name, colour, ids)
    }

    /// Render as XML
    pub fn to_xml(&self) -> String {
        self.to_xml_at(0)
    }

    /// Render as XML for an element nested `depth` levels below the root
    ///
    /// The opening tag is not indented; child lines and the closing tag are.
    pub fn to_xml_at(&self, depth: usize) -> String {
        let mut output = format!(
            "<category name=\"{}\" colour=\"{}\">\n",
            escape(self.name.as_str()),
            escape(self.colour.as_str())
        );
        let child = INDENT.repeat(depth + 1);
        for id in &self.block_ids {
            output.push_str(&format!("{}<block type=\"{}\"></block>\n", child, escape(id.as_str())));
        }
        output.push_str(&INDENT.repeat(depth));
        output.push_str("</category>");
        output
    }
}
