//! Block-Weld: Blockly block generation from annotated host action sets
//!
//! This crate derives three coupled artifacts from the annotated methods of
//! a host "actions" type: Blockly block definitions, Python generator
//! functions that call back into the host API, and a toolbox category that
//! can be merged idempotently into an existing toolbox document.
//!
//! # Architecture
//!
//! - `ir`: Action descriptors, type/default resolution and block specs
//! - `codegen`: Block definition, call-code and category generation
//! - `build`: Artifact assembly, syntax checks and toolbox merging
//! - `config`: Generator options
//!
//! # Usage
//!
//! ```rust,ignore
//! use block_weld::build::BlocklyGenerator;
//! use block_weld_macro::block_actions;
//!
//! pub struct MockActions;
//!
//! #[block_actions]
//! impl MockActions {
//!     #[block(label = "Move Robot")]
//!     pub fn r#move(&self, #[block(default = 1.5)] speed: f64) {}
//! }
//!
//! let output = BlocklyGenerator::for_actions::<MockActions>().generate()?;
//! output.write_modules("blocks", "generators", true)?;
//! output.update_toolbox("toolbox.xml")?;
//! ```

pub mod config;
pub mod ir;
pub mod codegen;
pub mod build;

// Re-export commonly used types
pub use config::GeneratorConfig;
pub use ir::{
    ActionSet, HostActions, ActionDescriptor, BlockMeta, ParamMeta, MethodParam, ActionType,
    Literal, BlockSpec, ParamSpec, Resolver, DefaultDescriptor, DefaultValue, Shadow,
    ValidationError, RunRegistry, ActionRegistry, extract_blocks, is_identifier,
    collect_host_actions, HOST_ACTIONS,
};
pub use codegen::{
    BlockDefinitionGenerator, CallCodeGenerator, CallOutput, CategoryFragment, CodegenError,
    DefaultsRegistry, Order,
};
pub use build::{BlocklyGenerator, GeneratedOutput, GeneratorError, ToolboxError, VerifyError};

// Re-export linkme for inventory
pub use linkme;
