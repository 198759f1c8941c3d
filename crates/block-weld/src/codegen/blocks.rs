//! Blockly block definition generator
//!
//! Generates the `Blockly.Blocks[...]` descriptors and the ES module that
//! registers them.

use crate::codegen::js::{js_string, shadow_expr, value_expr};
use crate::codegen::DefaultsRegistry;
use crate::config::GeneratorConfig;
use crate::ir::BlockSpec;
use heck::ToUpperCamelCase;

/// Generator for Blockly block definitions
pub struct BlockDefinitionGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> BlockDefinitionGenerator<'a> {
    /// Create a new block definition generator
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate the definition of one block
    ///
    /// Records the block's defaults table in `registry`; the table is
    /// registered even when the block has no inputs.
    pub fn generate(&self, block: &BlockSpec, registry: &mut DefaultsRegistry) -> String {
        let ns = &self.config.registry_namespace;
        registry.register_block(&block.block_id);

        let mut output = String::new();
        output.push_str(&format!("    Blockly.Blocks['{}'] = {{\n", block.block_id));
        output.push_str("        init: function() {\n");
        output.push_str(&format!(
            "            this.appendDummyInput().appendField({});\n",
            js_string(&block.label)
        ));

        for param in &block.params {
            let check = param
                .check_type
                .as_deref()
                .map(js_string)
                .unwrap_or_else(|| "null".to_string());
            output.push_str(&format!(
                "            this.appendValueInput(\"{}\")\n",
                param.input_name
            ));
            output.push_str(&format!("                .setCheck({})\n", check));
            output.push_str("                .setAlign(Blockly.ALIGN_RIGHT)\n");
            output.push_str(&format!(
                "                .appendField({});\n",
                js_string(&param.label)
            ));
        }

        // Statement and output connections are mutually exclusive
        match &block.output_type {
            Some(output_type) => {
                output.push_str(&format!(
                    "            this.setOutput(true, {});\n",
                    js_string(output_type)
                ));
            }
            None => {
                output.push_str("            this.setPreviousStatement(true, null);\n");
                output.push_str("            this.setNextStatement(true, null);\n");
            }
        }

        output.push_str(&format!("            this.setColour({});\n", self.config.block_colour));
        output.push_str(&format!(
            "            this.setTooltip({});\n",
            js_string(&format!("An auto-generated block for the {} action.", block.label))
        ));
        output.push_str("            this.setInputsInline(false);\n\n");

        output.push_str(&format!(
            "            {}.Defaults.values['{}'] = {{\n",
            ns, block.block_id
        ));
        for param in &block.params {
            registry.record(&block.block_id, &param.input_name, param.default.clone());
            output.push_str(&format!(
                "                {}: {{ shadow: {}, value: {} }},\n",
                param.input_name,
                shadow_expr(&param.default.shadow, ns),
                value_expr(&param.default.value)
            ));
        }
        output.push_str("            };\n");

        if !block.params.is_empty() {
            output.push('\n');
        }
        for param in &block.params {
            output.push_str(&format!(
                "            {}.BlocklyUtils.configureShadow(this, \"{}\");\n",
                ns, param.input_name
            ));
        }

        output.push_str("        }\n");
        output.push_str("    };\n");
        output
    }

    /// Wrap block definitions in an ES module
    ///
    /// This produces code like:
    /// ```ignore
    /// import { MCED } from "../lib/constants.mjs";
    ///
    /// export function defineMockActionsBlocks(Blockly) {
    ///     Blockly.Blocks['mock_actions_move'] = { ... };
    /// }
    /// ```
    pub fn generate_module(&self, host_name: &str, definitions: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "import {{ {} }} from {};\n\n",
            self.config.registry_namespace,
            js_string(&self.config.blocks_import)
        ));
        output.push_str(&format!(
            "export function define{}Blocks(Blockly) {{\n",
            host_name.to_upper_camel_case()
        ));
        for definition in definitions {
            output.push_str(definition);
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }
}
