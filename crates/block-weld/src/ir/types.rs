//! Type system for block-weld
//!
//! This module provides the representations of declared parameter types and
//! method default values on host actions.
//!
//! # Declared Type Mapping
//!
//! Rust parameter types are folded into a small set of source types, which the
//! [`Resolver`](crate::ir::Resolver) maps to Blockly check types:
//!
//! | Rust Type | Source Type | Default Check Type |
//! |-----------|-------------|--------------------|
//! | `f32`, `f64` | `float` | `Number` |
//! | `i8`..`i128`, `u8`..`u128`, `isize`, `usize` | `int` | `Number` |
//! | `String`, `&str`, `char` | `str` | `String` |
//! | `bool` | `bool` | `Boolean` |
//! | `Vec3` | `Vec3` | `3DVector` |
//! | `Matrix3` | `Matrix3` | `3DMatrix` |
//! | `Block` | `Block` | `Block` |
//! | anything else | its last path segment | _no check_ |
//!
//! References are dereferenced, so `&Vec3` declares `Vec3`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of an action parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Floating point number
    Float,
    /// Integer number
    Int,
    /// Text
    Str,
    /// Boolean
    Bool,
    /// Any other named type (domain objects such as `Vec3`)
    Named(String),
}

impl ActionType {
    /// Create a named (domain) type
    pub fn named(name: impl Into<String>) -> Self {
        ActionType::Named(name.into())
    }

    /// Parse from a Rust type string
    ///
    /// Leading references and module paths are stripped, so `&str`,
    /// `&mut Vec3` and `glam::Vec3` are all understood.
    pub fn from_rust_type(s: &str) -> Self {
        let mut ty = s.trim();
        while let Some(rest) = ty.strip_prefix('&') {
            ty = rest.trim_start();
            if let Some(rest) = ty.strip_prefix("mut ") {
                ty = rest.trim_start();
            }
        }
        let ty = ty.rsplit("::").next().unwrap_or(ty).trim();

        match ty {
            "f32" | "f64" => ActionType::Float,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => ActionType::Int,
            "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => ActionType::Int,
            "String" | "str" | "char" => ActionType::Str,
            "bool" => ActionType::Bool,
            other => ActionType::Named(other.to_string()),
        }
    }

    /// Name used as the key in type and shadow tables
    pub fn key(&self) -> &str {
        match self {
            ActionType::Float => "float",
            ActionType::Int => "int",
            ActionType::Str => "str",
            ActionType::Bool => "bool",
            ActionType::Named(name) => name,
        }
    }

    /// Whether this is a domain object type rather than a primitive
    pub fn is_domain(&self) -> bool {
        matches!(self, ActionType::Named(_))
    }
}

impl FromStr for ActionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "float" => ActionType::Float,
            "int" => ActionType::Int,
            "str" => ActionType::Str,
            "bool" => ActionType::Bool,
            other => ActionType::from_rust_type(other),
        })
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<ActionType> for String {
    fn from(ty: ActionType) -> Self {
        ty.key().to_string()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A method's own default value for a parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawLiteral")]
pub enum Literal {
    /// Numeric literal, kept in its source spelling (e.g. `1.5`, `-3`)
    Number(String),
    /// Boolean literal
    Bool(bool),
    /// Text literal
    Text(String),
}

impl Literal {
    /// Create a numeric literal from its spelling
    pub fn number(repr: impl Into<String>) -> Self {
        Literal::Number(repr.into())
    }

    /// Create a text literal
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    /// Render as a Python expression (`1.5`, `True`, `'hi'`)
    pub fn to_python(&self) -> String {
        match self {
            Literal::Number(repr) => repr.clone(),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Text(value) => {
                let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
                format!("'{}'", escaped)
            }
        }
    }

    /// Whether this is a text literal
    pub fn is_text(&self) -> bool {
        matches!(self, Literal::Text(_))
    }
}

/// Non-finite values keep their Rust spelling and are rejected when blocks
/// are extracted.
impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        // Keep a decimal point on whole floats so 2.0 stays a float in Python
        if value.is_finite() && value.fract() == 0.0 {
            Literal::Number(format!("{:.1}", value))
        } else {
            Literal::Number(value.to_string())
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(value.to_string())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

/// Untyped manifest value a [`Literal`] is read from
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLiteral {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawLiteral> for Literal {
    type Error = String;

    fn try_from(raw: RawLiteral) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawLiteral::Bool(b) => Literal::Bool(b),
            RawLiteral::Int(i) => Literal::from(i),
            RawLiteral::Float(f) if !f.is_finite() => {
                return Err(format!("default {} is not a finite number", f))
            }
            RawLiteral::Float(f) => Literal::from(f),
            RawLiteral::Text(s) => Literal::Text(s),
        })
    }
}
