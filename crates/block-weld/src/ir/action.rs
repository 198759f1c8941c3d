//! Descriptor records for host actions
//!
//! A host action set is described explicitly: each method is paired with a
//! descriptor holding its parameter list and, when it should become a block,
//! its [`BlockMeta`] annotation. Descriptors come from the builder API below,
//! the `#[block_actions]` attribute macro, or a TOML manifest.

use crate::ir::{ActionType, Literal};
use heck::{ToSnakeCase, ToTitleCase};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Per-parameter overrides from a block annotation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamMeta {
    /// Display label (defaults to the title-cased parameter name)
    pub label: Option<String>,
    /// Shadow override: inline markup when it starts with `<`, otherwise
    /// the name of an entry in the shared defaults registry
    pub shadow: Option<String>,
}

impl ParamMeta {
    /// Create an empty override
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the shadow override
    pub fn with_shadow(mut self, shadow: impl Into<String>) -> Self {
        self.shadow = Some(shadow.into());
        self
    }
}

/// Declarative block annotation attached to an action method
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockMeta {
    /// Block label; required, a missing label fails generation
    pub label: Option<String>,
    /// Overrides keyed by parameter name
    #[serde(default)]
    pub params: BTreeMap<String, ParamMeta>,
    /// Output check type; present for value-producing blocks
    pub output_type: Option<String>,
}

impl BlockMeta {
    /// Create an annotation with a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Create an annotation without a label
    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// Mark the block as an expression block producing `output_type`
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = Some(output_type.into());
        self
    }

    /// Add a parameter override
    pub fn param(mut self, name: impl Into<String>, meta: ParamMeta) -> Self {
        self.params.insert(name.into(), meta);
        self
    }
}

/// A parameter as declared on the method signature (receiver excluded)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodParam {
    /// Parameter name
    pub name: String,
    /// Declared type, if any
    #[serde(rename = "type")]
    pub declared_type: Option<ActionType>,
    /// The method's own default value
    pub default: Option<Literal>,
}

impl MethodParam {
    /// Create an untyped parameter without a default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            default: None,
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, ty: ActionType) -> Self {
        self.declared_type = Some(ty);
        self
    }

    /// Set the method default
    pub fn with_default(mut self, default: impl Into<Literal>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A method on a host action set
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDescriptor {
    /// Method name as called on the host implementer
    pub method: String,
    /// Declared parameters in signature order
    #[serde(default)]
    pub params: Vec<MethodParam>,
    /// Block annotation; methods without one are not exposed
    #[serde(rename = "block")]
    pub meta: Option<BlockMeta>,
}

impl ActionDescriptor {
    /// Create a descriptor for a method
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            meta: None,
        }
    }

    /// Attach the block annotation
    pub fn meta(mut self, meta: BlockMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Add a parameter
    pub fn param(mut self, param: MethodParam) -> Self {
        self.params.push(param);
        self
    }

    /// Whether the method carries a block annotation
    pub fn is_block(&self) -> bool {
        self.meta.is_some()
    }
}

/// A host actions type with its ordered methods
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostActions {
    /// Host type name (e.g., "MockActions")
    pub name: String,
    /// Methods in declaration order
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
}

impl HostActions {
    /// Create an empty host action set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Add a method
    pub fn action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }

    /// Methods carrying a block annotation, in declaration order
    pub fn annotated(&self) -> impl Iterator<Item = (&ActionDescriptor, &BlockMeta)> {
        self.actions
            .iter()
            .filter_map(|a| a.meta.as_ref().map(|meta| (a, meta)))
    }

    /// Prefix for block ids (e.g., "MockActions" -> "mock_actions")
    pub fn slug(&self) -> String {
        host_slug(&self.name)
    }

    /// Default palette category name (e.g., "MockActions" -> "Mock Actions")
    pub fn display_name(&self) -> String {
        self.name.to_title_case()
    }
}

/// Types exposing a host action set
///
/// Implemented by `#[block_actions]` on an `impl` block, or by hand.
pub trait ActionSet {
    /// Describe the action set
    fn host_actions() -> HostActions;
}

// Helper functions

/// Convert a host type name to its block id prefix
pub fn host_slug(name: &str) -> String {
    name.to_snake_case()
}

/// Derive a display label from a parameter name ("target_id" -> "Target Id")
pub fn param_label(name: &str) -> String {
    name.to_title_case()
}
