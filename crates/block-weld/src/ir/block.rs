//! Block specifications
//!
//! A [`BlockSpec`] is built once per annotated method and then consumed by
//! every emitter, so the block id, slot names and defaults can never drift
//! apart between the block definition, the call code and the toolbox.

use crate::config::GeneratorConfig;
use crate::ir::{param_label, ActionType, DefaultDescriptor, HostActions, Literal, Resolver};
use std::collections::HashSet;
use thiserror::Error;

/// One value input of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name (also the keyword argument name)
    pub name: String,
    /// Declared type
    pub declared_type: Option<ActionType>,
    /// Input slot name (uppercased parameter name)
    pub input_name: String,
    /// Display label
    pub label: String,
    /// Check type; `None` accepts any connection
    pub check_type: Option<String>,
    /// Resolved default
    pub default: DefaultDescriptor,
    /// The method's own default
    pub method_default: Option<Literal>,
}

/// A block derived from one annotated method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    /// Block type id (e.g., "mock_actions_move")
    pub block_id: String,
    /// Method called by the generated code
    pub method: String,
    /// Block label
    pub label: String,
    /// Inputs in signature order
    pub params: Vec<ParamSpec>,
    /// Output check type; `None` for statement blocks
    pub output_type: Option<String>,
}

impl BlockSpec {
    /// Whether the block produces a value
    pub fn is_expression(&self) -> bool {
        self.output_type.is_some()
    }

    /// Whether the block chains with other statements
    pub fn is_statement(&self) -> bool {
        self.output_type.is_none()
    }
}

/// Configuration errors found while deriving block specs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Host name is empty
    #[error("host action set name cannot be empty")]
    EmptyHostName,

    /// Annotated method without a label
    #[error("block annotation on {host}::{method} has no label")]
    MissingLabel { host: String, method: String },

    /// Parameter declared twice
    #[error("duplicate parameter `{param}` in block {block_id}")]
    DuplicateParam { block_id: String, param: String },

    /// Two parameters map to the same input slot
    #[error("parameters of block {block_id} collide on input slot {slot}")]
    DuplicateSlot { block_id: String, slot: String },

    /// Two methods map to the same block id
    #[error("duplicate block id: {0}")]
    DuplicateBlock(String),

    /// Two host action sets share a name within one run
    #[error("duplicate host action set: {0}")]
    DuplicateHost(String),

    /// A name pasted into generated code is not an identifier
    #[error("{kind} `{name}` is not a valid identifier")]
    InvalidIdentifier { kind: &'static str, name: String },

    /// A numeric default is not a finite number
    #[error("default `{value}` of parameter `{param}` in block {block_id} is not a finite number")]
    InvalidDefault {
        block_id: String,
        param: String,
        value: String,
    },
}

/// Whether `name` matches `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), ValidationError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Tracks block ids and host names across every host of one run
#[derive(Debug, Default)]
pub struct RunRegistry {
    hosts: HashSet<String>,
    blocks: HashSet<String>,
}

impl RunRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a host name and the block ids derived from it
    pub fn claim(&mut self, host: &str, blocks: &[BlockSpec]) -> Result<(), ValidationError> {
        if self.hosts.contains(host) {
            return Err(ValidationError::DuplicateHost(host.to_string()));
        }
        if let Some(block) = blocks.iter().find(|b| self.blocks.contains(&b.block_id)) {
            return Err(ValidationError::DuplicateBlock(block.block_id.clone()));
        }
        self.hosts.insert(host.to_string());
        self.blocks.extend(blocks.iter().map(|b| b.block_id.clone()));
        Ok(())
    }
}

/// Derive block specs for every annotated method of `host`
///
/// Methods without a block annotation are skipped. The whole run fails on
/// the first configuration error.
pub fn extract_blocks(
    host: &HostActions,
    resolver: &Resolver,
    config: &GeneratorConfig,
) -> Result<Vec<BlockSpec>, ValidationError> {
    if host.name.trim().is_empty() {
        return Err(ValidationError::EmptyHostName);
    }

    check_identifier("host name", &host.name)?;
    let prefix = config.block_prefix.clone().unwrap_or_else(|| host.slug());
    check_identifier("block prefix", &prefix)?;
    let mut seen_blocks = HashSet::new();
    let mut blocks = Vec::new();

    for (action, meta) in host.annotated() {
        check_identifier("method name", &action.method)?;
        let label = meta
            .label
            .clone()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| ValidationError::MissingLabel {
                host: host.name.clone(),
                method: action.method.clone(),
            })?;

        let block_id = format!("{}_{}", prefix, action.method);
        if !seen_blocks.insert(block_id.clone()) {
            return Err(ValidationError::DuplicateBlock(block_id));
        }

        tracing::info!(block = %block_id, "generating block for {}::{}", host.name, action.method);

        for name in meta.params.keys() {
            if !action.params.iter().any(|p| &p.name == name) {
                tracing::warn!(block = %block_id, "override for unknown parameter `{}` ignored", name);
            }
        }

        let mut seen_params = HashSet::new();
        let mut seen_slots = HashSet::new();
        let mut params = Vec::with_capacity(action.params.len());

        for param in &action.params {
            check_identifier("parameter name", &param.name)?;
            if let Some(Literal::Number(repr)) = &param.default {
                if !repr.parse::<f64>().map_or(false, f64::is_finite) {
                    return Err(ValidationError::InvalidDefault {
                        block_id,
                        param: param.name.clone(),
                        value: repr.clone(),
                    });
                }
            }

            if !seen_params.insert(param.name.as_str()) {
                return Err(ValidationError::DuplicateParam {
                    block_id,
                    param: param.name.clone(),
                });
            }

            let input_name = param.name.to_uppercase();
            if !seen_slots.insert(input_name.clone()) {
                return Err(ValidationError::DuplicateSlot {
                    block_id,
                    slot: input_name,
                });
            }

            let overrides = meta.params.get(&param.name);
            let default = resolver.resolve_default(param, overrides);
            tracing::debug!(block = %block_id, slot = %input_name, ?default, "resolved default");

            params.push(ParamSpec {
                name: param.name.clone(),
                declared_type: param.declared_type.clone(),
                label: overrides
                    .and_then(|o| o.label.clone())
                    .unwrap_or_else(|| param_label(&param.name)),
                check_type: resolver
                    .check_type(param.declared_type.as_ref())
                    .map(str::to_string),
                input_name,
                default,
                method_default: param.default.clone(),
            });
        }

        blocks.push(BlockSpec {
            block_id,
            method: action.method.clone(),
            label,
            params,
            output_type: meta.output_type.clone(),
        });
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ActionDescriptor, BlockMeta, DefaultValue, MethodParam, ParamMeta};

    fn mock_actions() -> HostActions {
        HostActions::new("MockActions")
            .action(
                ActionDescriptor::new("move")
                    .meta(BlockMeta::new("Move Robot").param("speed", ParamMeta::new().with_label("Velocity")))
                    .param(MethodParam::new("speed").with_type(ActionType::Float).with_default(1.5))
                    .param(MethodParam::new("forward").with_type(ActionType::Bool).with_default(true)),
            )
            .action(
                ActionDescriptor::new("get_position")
                    .meta(BlockMeta::new("Get Position").with_output_type("3DVector"))
                    .param(MethodParam::new("target_id").with_type(ActionType::Int)),
            )
            .action(ActionDescriptor::new("internal_helper"))
    }

    fn extract(host: &HostActions) -> Result<Vec<BlockSpec>, ValidationError> {
        extract_blocks(host, &Resolver::new(), &GeneratorConfig::new())
    }

    #[test]
    fn test_extract_blocks() {
        let blocks = extract(&mock_actions()).unwrap();
        let ids: Vec<&str> = blocks.iter().map(|b| b.block_id.as_str()).collect();
        assert_eq!(ids, vec!["mock_actions_move", "mock_actions_get_position"]);

        let speed = &blocks[0].params[0];
        assert_eq!(speed.input_name, "SPEED");
        assert_eq!(speed.label, "Velocity");
        assert_eq!(speed.check_type.as_deref(), Some("Number"));
        assert_eq!(blocks[0].params[1].label, "Forward");

        let target = &blocks[1].params[0];
        assert_eq!(target.label, "Target Id");
        assert_eq!(target.default.value, DefaultValue::Null);
        assert!(blocks[1].is_expression());
        assert!(blocks[0].is_statement());
    }

    #[test]
    fn test_block_prefix_override() {
        let config = GeneratorConfig {
            block_prefix: Some("minecraft_action".to_string()),
            ..GeneratorConfig::new()
        };
        let blocks = extract_blocks(&mock_actions(), &Resolver::new(), &config).unwrap();
        assert_eq!(blocks[0].block_id, "minecraft_action_move");
    }

    #[test]
    fn test_missing_label_fails() {
        let host = HostActions::new("MockActions")
            .action(ActionDescriptor::new("jump").meta(BlockMeta::unlabeled()));
        assert_eq!(
            extract(&host),
            Err(ValidationError::MissingLabel {
                host: "MockActions".to_string(),
                method: "jump".to_string(),
            })
        );
    }

    #[test]
    fn test_colliding_slots_fail() {
        let host = HostActions::new("MockActions").action(
            ActionDescriptor::new("jump")
                .meta(BlockMeta::new("Jump"))
                .param(MethodParam::new("height"))
                .param(MethodParam::new("HEIGHT")),
        );
        assert!(matches!(
            extract(&host),
            Err(ValidationError::DuplicateSlot { ref slot, .. }) if slot == "HEIGHT"
        ));

        let host = HostActions::new("MockActions").action(
            ActionDescriptor::new("jump")
                .meta(BlockMeta::new("Jump"))
                .param(MethodParam::new("height"))
                .param(MethodParam::new("height")),
        );
        assert!(matches!(extract(&host), Err(ValidationError::DuplicateParam { .. })));
    }

    #[test]
    fn test_duplicate_methods_fail() {
        let host = HostActions::new("MockActions")
            .action(ActionDescriptor::new("jump").meta(BlockMeta::new("Jump")))
            .action(ActionDescriptor::new("jump").meta(BlockMeta::new("Jump again")));
        assert_eq!(
            extract(&host),
            Err(ValidationError::DuplicateBlock("mock_actions_jump".to_string()))
        );
    }

    #[test]
    fn test_invalid_identifiers_fail() {
        let host = HostActions::new("MockActions")
            .action(ActionDescriptor::new("it's").meta(BlockMeta::new("Quote")));
        assert_eq!(
            extract(&host),
            Err(ValidationError::InvalidIdentifier {
                kind: "method name",
                name: "it's".to_string(),
            })
        );

        let host = HostActions::new("MockActions").action(
            ActionDescriptor::new("locate")
                .meta(BlockMeta::new("Locate"))
                .param(MethodParam::new("target id")),
        );
        assert!(matches!(
            extract(&host),
            Err(ValidationError::InvalidIdentifier { kind: "parameter name", ref name }) if name == "target id"
        ));

        let config = GeneratorConfig {
            block_prefix: Some("mc-action".to_string()),
            ..GeneratorConfig::new()
        };
        assert!(matches!(
            extract_blocks(&mock_actions(), &Resolver::new(), &config),
            Err(ValidationError::InvalidIdentifier { kind: "block prefix", .. })
        ));
    }

    #[test]
    fn test_unannotated_methods_are_not_checked() {
        let host = HostActions::new("MockActions").action(ActionDescriptor::new("not-a-block"));
        assert_eq!(extract(&host), Ok(Vec::new()));
    }

    #[test]
    fn test_non_finite_default_fails() {
        for value in [f64::NAN, f64::INFINITY] {
            let host = HostActions::new("MockActions").action(
                ActionDescriptor::new("move")
                    .meta(BlockMeta::new("Move"))
                    .param(MethodParam::new("speed").with_default(value)),
            );
            assert!(matches!(extract(&host), Err(ValidationError::InvalidDefault { .. })));
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("target_id"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_run_registry_rejects_repeats() {
        let blocks = extract(&mock_actions()).unwrap();
        let mut run = RunRegistry::new();
        run.claim("MockActions", &blocks).unwrap();

        assert_eq!(
            run.claim("MockActions", &[]),
            Err(ValidationError::DuplicateHost("MockActions".to_string()))
        );
        assert_eq!(
            run.claim("OtherActions", &blocks),
            Err(ValidationError::DuplicateBlock("mock_actions_move".to_string()))
        );
        assert_eq!(run.claim("Lamp", &[]), Ok(()));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        assert_eq!(extract(&mock_actions()).unwrap(), extract(&mock_actions()).unwrap());
    }
}
