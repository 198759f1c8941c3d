//! Proc macros for block-weld
//!
//! Provides the `#[block_actions]` attribute macro that describes the
//! annotated methods of a host actions type for Blockly generation.
//!
//! # Usage
//!
//! ```text
//! use block_weld_macro::block_actions;
//!
//! pub struct MockActions;
//!
//! #[block_actions]
//! impl MockActions {
//!     #[block(label = "Move Robot")]
//!     pub fn r#move(&self, #[block(default = 1.5)] speed: f64) {
//!         // ...
//!     }
//!
//!     #[block(label = "Get Position", output = "3DVector")]
//!     pub fn get_position(&self, #[block(label = "Target")] target_id: i64) -> Vec3 {
//!         // ...
//!     }
//! }
//! ```

use proc_macro::TokenStream;

mod block_actions;
mod type_parser;

/// Attribute macro for describing a host action set
///
/// This macro:
/// 1. Leaves the impl block unchanged apart from removing `#[block]` attributes
/// 2. Implements `block_weld::ActionSet` for the self type, listing every
///    method in declaration order
///
/// Methods without `#[block]` are listed without a block annotation and are
/// therefore skipped by the generators. The receiver is never an input.
///
/// # Attributes
/// - `#[block_actions]` - Host name taken from the self type
/// - `#[block_actions(name = "Robot")]` - Custom host name
///
/// On methods:
/// - `#[block(label = "Move Robot")]` - Statement block; the label is required
/// - `#[block(label = "Get Position", output = "3DVector")]` - Expression block
///
/// On parameters:
/// - `#[block(label = "Velocity")]` - Input label
/// - `#[block(shadow = "...")]` - Shadow markup (`<...>`) or named shared shadow
/// - `#[block(default = 1.5)]` - Default used for shadows and code fallback
///
/// Use `block_weld::register_actions!` to add the type to the inventory.
#[proc_macro_attribute]
pub fn block_actions(attr: TokenStream, item: TokenStream) -> TokenStream {
    block_actions::block_actions_impl(attr.into(), item.into()).into()
}
