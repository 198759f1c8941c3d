//! Output assembly for generated Blockly artifacts
//!
//! This module ties the generators together:
//! - `BlocklyGenerator` runs one host action set through every emitter
//! - syntax checks of generated ES modules via deno_ast
//! - toolbox document merging and atomic file writes

pub mod generator;
pub mod toolbox;
pub mod verify;
pub mod write;

pub use generator::{BlocklyGenerator, GeneratedOutput, GeneratorError};
pub use toolbox::{merge, merge_all, new_toolbox, update_toolbox_file, ToolboxError, BLOCKLY_XML_NAMESPACE};
pub use verify::{module_specifier, verify_module, VerifyError};
pub use write::{write_all_atomic, write_atomic};
