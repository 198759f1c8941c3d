//! JavaScript rendering helpers shared by the generators

use crate::ir::{DefaultValue, Literal, Shadow};
use serde_json::Value;

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    "block", "generator", "code",
];

/// Quote text as a JavaScript string literal
pub fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// JavaScript expression for a shadow in a defaults table
pub fn shadow_expr(shadow: &Shadow, registry_namespace: &str) -> String {
    match shadow {
        Shadow::Markup(markup) => js_string(markup),
        Shadow::Template(name) => format!("{}.{}", registry_namespace, name),
        Shadow::Absent => "null".to_string(),
    }
}

/// JavaScript expression whose interpolation yields the Python fallback
///
/// Numbers stay bare, everything else is quoted so the Python spelling
/// survives template interpolation; the sentinel stays `null`.
pub fn value_expr(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Literal(Literal::Number(repr)) => repr.clone(),
        DefaultValue::Null => "null".to_string(),
        other => js_string(&other.to_python()),
    }
}

/// Local variable name for a parameter inside a generator function
pub fn local_name(param: &str) -> String {
    if RESERVED.contains(&param) {
        format!("{}_", param)
    } else {
        param.to_string()
    }
}
