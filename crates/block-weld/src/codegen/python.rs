//! Python generator function generator
//!
//! Generates the `pythonGenerator.forBlock[...]` functions that turn a block
//! back into a call on the host implementer. Fallbacks for unconnected
//! inputs are read from the [`DefaultsRegistry`] filled by the block
//! definition generator, never resolved a second time.

use crate::codegen::js::{js_string, local_name, value_expr};
use crate::codegen::DefaultsRegistry;
use crate::config::GeneratorConfig;
use crate::ir::{BlockSpec, DefaultDescriptor};
use heck::ToUpperCamelCase;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while generating call code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// The defaults registry has no entry for an input
    #[error("no default registered for input {slot} of block {block_id}")]
    MissingDefault { block_id: String, slot: String },
}

/// Operator precedence attached to expression results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Atomic value, never parenthesized
    Atomic,
    /// Function call result
    FunctionCall,
}

impl Order {
    /// Name of the precedence constant on the generator
    pub fn js_name(&self) -> &'static str {
        match self {
            Order::Atomic => "ORDER_ATOMIC",
            Order::FunctionCall => "ORDER_FUNCTION_CALL",
        }
    }
}

/// Result of a generator function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    /// Statement code, terminated by a newline
    Statement(String),
    /// Expression code with its precedence
    Expression(String, Order),
}

/// Generator for Python generator functions
pub struct CallCodeGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> CallCodeGenerator<'a> {
    /// Create a new call-code generator
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate the generator function of one block
    pub fn generate(&self, block: &BlockSpec, registry: &DefaultsRegistry) -> Result<String, CodegenError> {
        let mut output = String::new();
        output.push_str(&format!(
            "    pythonGenerator.forBlock['{}'] = function(block, generator) {{\n",
            block.block_id
        ));

        for param in &block.params {
            let default = lookup(registry, block, &param.input_name)?;
            output.push_str(&format!(
                "        const {} = generator.valueToCode(block, '{}', generator.{}) || {};\n",
                local_name(&param.name),
                param.input_name,
                Order::Atomic.js_name(),
                value_expr(&default.value)
            ));
        }

        let args: Vec<String> = block
            .params
            .iter()
            .map(|p| format!("{}=${{{}}}", p.name, local_name(&p.name)))
            .collect();
        let call = format!("{}.{}({})", self.config.call_namespace, block.method, args.join(", "));

        if block.is_expression() {
            output.push_str(&format!("        const code = `{}`;\n", call));
            output.push_str(&format!(
                "        return [code, generator.{}];\n",
                Order::FunctionCall.js_name()
            ));
        } else {
            output.push_str(&format!("        return `{}\\n`;\n", call));
        }

        output.push_str("    };\n");
        Ok(output)
    }

    /// Evaluate a block's generator function for the given input bindings
    ///
    /// `bindings` maps input slot names to the code of connected blocks; a
    /// missing or empty binding falls back to the registered default, just
    /// like the generated JavaScript does.
    pub fn render_call(
        &self,
        block: &BlockSpec,
        registry: &DefaultsRegistry,
        bindings: &BTreeMap<String, String>,
    ) -> Result<CallOutput, CodegenError> {
        let mut args = Vec::with_capacity(block.params.len());
        for param in &block.params {
            let value = match bindings.get(&param.input_name).filter(|code| !code.is_empty()) {
                Some(code) => code.clone(),
                None => lookup(registry, block, &param.input_name)?.value.to_python(),
            };
            args.push(format!("{}={}", param.name, value));
        }

        let call = format!("{}.{}({})", self.config.call_namespace, block.method, args.join(", "));
        Ok(if block.is_expression() {
            CallOutput::Expression(call, Order::FunctionCall)
        } else {
            CallOutput::Statement(format!("{}\n", call))
        })
    }

    /// Wrap generator functions in an ES module
    pub fn generate_module(&self, host_name: &str, functions: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "import {{ {} }} from {};\n\n",
            self.config.registry_namespace,
            js_string(&self.config.generators_import)
        ));
        output.push_str(&format!(
            "export function define{}Generators(pythonGenerator) {{\n",
            host_name.to_upper_camel_case()
        ));
        for function in functions {
            output.push_str(function);
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }
}

fn lookup<'r>(
    registry: &'r DefaultsRegistry,
    block: &BlockSpec,
    slot: &str,
) -> Result<&'r DefaultDescriptor, CodegenError> {
    registry
        .get(&block.block_id, slot)
        .ok_or_else(|| CodegenError::MissingDefault {
            block_id: block.block_id.clone(),
            slot: slot.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::BlockDefinitionGenerator;
    use crate::ir::{
        extract_blocks, ActionDescriptor, ActionType, BlockMeta, HostActions, MethodParam, Resolver,
    };

    fn mock_blocks(config: &GeneratorConfig) -> (Vec<BlockSpec>, DefaultsRegistry) {
        let host = HostActions::new("MockActions")
            .action(
                ActionDescriptor::new("move")
                    .meta(BlockMeta::new("Move Robot"))
                    .param(MethodParam::new("speed").with_type(ActionType::Float).with_default(1.5))
                    .param(MethodParam::new("forward").with_type(ActionType::Bool).with_default(true)),
            )
            .action(
                ActionDescriptor::new("get_position")
                    .meta(BlockMeta::new("Get Position").with_output_type("3DVector"))
                    .param(MethodParam::new("target_id").with_type(ActionType::Int)),
            );
        let blocks = extract_blocks(&host, &Resolver::from_config(config), config).unwrap();
        let mut registry = DefaultsRegistry::new();
        let gen = BlockDefinitionGenerator::new(config);
        for block in &blocks {
            gen.generate(block, &mut registry);
        }
        (blocks, registry)
    }

    #[test]
    fn test_statement_generator() {
        let config = GeneratorConfig::new();
        let (blocks, registry) = mock_blocks(&config);
        let output = CallCodeGenerator::new(&config).generate(&blocks[0], &registry).unwrap();

        assert!(output.contains("pythonGenerator.forBlock['mock_actions_move']"));
        assert!(output.contains(
            "const speed = generator.valueToCode(block, 'SPEED', generator.ORDER_ATOMIC) || 1.5;"
        ));
        assert!(output.contains(
            "const forward = generator.valueToCode(block, 'FORWARD', generator.ORDER_ATOMIC) || \"True\";"
        ));
        assert!(output.contains(
            "return `self.action_implementer.move(speed=${speed}, forward=${forward})\\n`;"
        ));
        assert!(!output.contains("ORDER_FUNCTION_CALL"));
    }

    #[test]
    fn test_expression_generator() {
        let config = GeneratorConfig::new();
        let (blocks, registry) = mock_blocks(&config);
        let output = CallCodeGenerator::new(&config).generate(&blocks[1], &registry).unwrap();

        assert!(output.contains("pythonGenerator.forBlock['mock_actions_get_position']"));
        assert!(output.contains(
            "const target_id = generator.valueToCode(block, 'TARGET_ID', generator.ORDER_ATOMIC) || null;"
        ));
        assert!(output.contains("const code = `self.action_implementer.get_position(target_id=${target_id})`;"));
        assert!(output.contains("return [code, generator.ORDER_FUNCTION_CALL];"));
    }

    #[test]
    fn test_missing_registry_entry_fails() {
        let config = GeneratorConfig::new();
        let (blocks, _) = mock_blocks(&config);
        let err = CallCodeGenerator::new(&config)
            .generate(&blocks[0], &DefaultsRegistry::new())
            .unwrap_err();
        assert_eq!(
            err,
            CodegenError::MissingDefault {
                block_id: "mock_actions_move".to_string(),
                slot: "SPEED".to_string(),
            }
        );
    }

    #[test]
    fn test_render_call_falls_back_per_input() {
        let config = GeneratorConfig::new();
        let (blocks, registry) = mock_blocks(&config);
        let gen = CallCodeGenerator::new(&config);

        let mut bindings = BTreeMap::new();
        bindings.insert("FORWARD".to_string(), "False".to_string());
        assert_eq!(
            gen.render_call(&blocks[0], &registry, &bindings).unwrap(),
            CallOutput::Statement("self.action_implementer.move(speed=1.5, forward=False)\n".to_string())
        );

        bindings.insert("TARGET_ID".to_string(), "7".to_string());
        assert_eq!(
            gen.render_call(&blocks[1], &registry, &bindings).unwrap(),
            CallOutput::Expression(
                "self.action_implementer.get_position(target_id=7)".to_string(),
                Order::FunctionCall
            )
        );
    }

    #[test]
    fn test_custom_namespace() {
        let config = GeneratorConfig {
            call_namespace: "robot".to_string(),
            ..GeneratorConfig::new()
        };
        let (blocks, registry) = mock_blocks(&config);
        let output = CallCodeGenerator::new(&config).generate(&blocks[1], &registry).unwrap();
        assert!(output.contains("`robot.get_position(target_id=${target_id})`"));
    }

    #[test]
    fn test_generate_module() {
        let config = GeneratorConfig::new();
        let module = CallCodeGenerator::new(&config).generate_module("MockActions", &[]);
        assert!(module.starts_with("import { MCED } from \"../../lib/constants.mjs\";"));
        assert!(module.contains("export function defineMockActionsGenerators(pythonGenerator) {"));
    }
}
