//! Code generation for Blockly
//!
//! This module provides generators for:
//! - Blockly block definitions (`Blockly.Blocks[...]`)
//! - Python generator functions (`pythonGenerator.forBlock[...]`)
//! - Toolbox category fragments
//!
//! Block definitions and call code share one [`DefaultsRegistry`]: the
//! definition generator records every input's default and the call-code
//! generator reads its fallbacks back from it.

pub mod blocks;
pub mod defaults;
pub mod js;
pub mod python;
pub mod toolbox;

pub use blocks::BlockDefinitionGenerator;
pub use defaults::DefaultsRegistry;
pub use python::{CallCodeGenerator, CallOutput, CodegenError, Order};
pub use toolbox::CategoryFragment;
