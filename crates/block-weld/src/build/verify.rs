//! Syntax checks for generated ES modules
//!
//! Generated modules are parsed with deno_ast before they are written, so a
//! label or override that breaks the JavaScript fails the run instead of
//! shipping a module the editor cannot load.

use deno_ast::{MediaType, ParseParams};
use thiserror::Error;

/// Errors that can occur while checking a generated module
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The specifier is not a valid URL
    #[error("Invalid module specifier {0}: {1}")]
    Specifier(String, String),

    /// The module failed to parse
    #[error("Generated module {specifier} does not parse: {message}")]
    Parse { specifier: String, message: String },
}

/// Parse generated JavaScript as an ES module
///
/// # Arguments
/// * `source` - The generated module source
/// * `specifier` - A file URL specifier for error messages (e.g., "file:///MockActions.mjs")
///
/// # Example
/// ```ignore
/// verify_module("export function f() {}", "file:///blocks.mjs").unwrap();
/// ```
pub fn verify_module(source: &str, specifier: &str) -> Result<(), VerifyError> {
    let module_specifier = deno_ast::ModuleSpecifier::parse(specifier)
        .map_err(|e| VerifyError::Specifier(specifier.to_string(), e.to_string()))?;

    deno_ast::parse_module(ParseParams {
        specifier: module_specifier,
        text: source.into(),
        media_type: MediaType::JavaScript,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| VerifyError::Parse {
        specifier: specifier.to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}

/// Build a file URL specifier for a generated module file name
pub fn module_specifier(file_name: &str) -> String {
    format!("file:///{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_valid_module() {
        let js = "import { MCED } from \"../lib/constants.mjs\";\n\
                  export function defineBlocks(Blockly) { MCED.x = `a=${1}\\n`; }\n";
        assert!(verify_module(js, "file:///blocks.mjs").is_ok());
    }

    #[test]
    fn test_verify_broken_module() {
        let err = verify_module("export function (", "file:///broken.mjs").unwrap_err();
        assert!(matches!(err, VerifyError::Parse { .. }));
    }

    #[test]
    fn test_invalid_specifier() {
        assert!(matches!(
            verify_module("", "not a url"),
            Err(VerifyError::Specifier(..))
        ));
    }

    #[test]
    fn test_module_specifier() {
        assert_eq!(module_specifier("MockActions.mjs"), "file:///MockActions.mjs");
    }
}
