//! Check-type and default resolution
//!
//! The [`Resolver`] maps declared parameter types to Blockly check types and
//! picks each parameter's default. Resolution never fails: unknown types
//! accept any connection and missing defaults fall back to [`NULL_SENTINEL`].
//!
//! Default precedence, applied per parameter:
//!
//! 1. explicit `shadow` override (inline markup if it starts with `<`,
//!    otherwise a named entry in the shared defaults registry)
//! 2. domain object types: canonical zero constructor (`Vec3(0,0,0)`)
//! 3. the method's own default value
//! 4. [`NULL_SENTINEL`]
//!
//! The override decides only the shadow shown in the editor; the value used
//! when generating code comes from tiers 2 to 4.

use crate::config::GeneratorConfig;
use crate::ir::{ActionType, Literal, MethodParam, ParamMeta};
use quick_xml::escape::escape;
use std::collections::BTreeMap;

/// Code emitted when a parameter has no usable default
pub const NULL_SENTINEL: &str = "null";

/// Built-in source type -> check type table
pub const DEFAULT_TYPE_MAP: &[(&str, &str)] = &[
    ("float", "Number"),
    ("int", "Number"),
    ("str", "String"),
    ("bool", "Boolean"),
    ("Vec3", "3DVector"),
    ("Matrix3", "3DMatrix"),
    ("Block", "Block"),
];

/// Built-in zero constructors for domain object types
pub const DEFAULT_ZERO_VALUES: &[(&str, &str)] = &[
    ("Vec3", "Vec3(0,0,0)"),
    ("Matrix3", "Matrix3.identity()"),
];

/// Shadow block pre-filled into an input slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shadow {
    /// Inline shadow markup
    Markup(String),
    /// Named entry in the shared defaults registry
    Template(String),
    /// No shadow
    Absent,
}

/// Value substituted in generated code when an input is left unconnected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Zero-value constructor call of a domain type
    Constructor(String),
    /// The method's own default
    Literal(Literal),
    /// Neutral sentinel
    Null,
}

impl DefaultValue {
    /// Python code for this value
    pub fn to_python(&self) -> String {
        match self {
            DefaultValue::Constructor(call) => call.clone(),
            DefaultValue::Literal(literal) => literal.to_python(),
            DefaultValue::Null => NULL_SENTINEL.to_string(),
        }
    }
}

/// Resolved default of one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDescriptor {
    /// Shadow shown in the editor
    pub shadow: Shadow,
    /// Fallback used by generated code
    pub value: DefaultValue,
}

impl DefaultDescriptor {
    /// The neutral default: no shadow, sentinel value
    pub fn null() -> Self {
        Self {
            shadow: Shadow::Absent,
            value: DefaultValue::Null,
        }
    }
}

/// Maps declared types to check types and defaults
///
/// Tables are fixed at construction and only read afterwards, so one
/// resolver may serve any number of generation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    type_map: BTreeMap<String, String>,
    shadow_map: BTreeMap<String, String>,
    zero_values: BTreeMap<String, String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            type_map: to_table(DEFAULT_TYPE_MAP),
            shadow_map: BTreeMap::new(),
            zero_values: to_table(DEFAULT_ZERO_VALUES),
        }
    }
}

impl Resolver {
    /// Create a resolver with the built-in tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the built-in tables extended by `config`
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut resolver = Self::new();
        resolver.type_map.extend(config.type_map.clone());
        resolver.shadow_map.extend(config.shadow_map.clone());
        resolver.zero_values.extend(config.zero_values.clone());
        resolver
    }

    /// Map a source type to a check type
    pub fn with_type(mut self, source: impl Into<String>, check: impl Into<String>) -> Self {
        self.type_map.insert(source.into(), check.into());
        self
    }

    /// Set the shadow markup used for a domain type
    pub fn with_shadow(mut self, source: impl Into<String>, markup: impl Into<String>) -> Self {
        self.shadow_map.insert(source.into(), markup.into());
        self
    }

    /// Check type for a declared type; `None` accepts any connection
    pub fn check_type(&self, declared: Option<&ActionType>) -> Option<&str> {
        declared
            .and_then(|ty| self.type_map.get(ty.key()))
            .map(String::as_str)
    }

    /// Resolve the default of `param`, honouring its override
    pub fn resolve_default(&self, param: &MethodParam, meta: Option<&ParamMeta>) -> DefaultDescriptor {
        let domain = param
            .declared_type
            .as_ref()
            .filter(|ty| ty.is_domain())
            .map(ActionType::key);

        let value = match (domain.and_then(|key| self.zero_values.get(key)), &param.default) {
            (Some(call), _) => DefaultValue::Constructor(call.clone()),
            (None, Some(literal)) => DefaultValue::Literal(literal.clone()),
            (None, None) => DefaultValue::Null,
        };

        let shadow = match meta.and_then(|m| m.shadow.as_deref()) {
            Some(markup) if markup.starts_with('<') => Shadow::Markup(markup.to_string()),
            Some(name) => Shadow::Template(name.to_string()),
            None => match domain.and_then(|key| self.shadow_map.get(key)) {
                Some(markup) => Shadow::Markup(markup.clone()),
                None => match &value {
                    DefaultValue::Literal(literal) => Shadow::Markup(literal_shadow(literal)),
                    _ => Shadow::Absent,
                },
            },
        };

        DefaultDescriptor { shadow, value }
    }
}

/// Shadow markup for a literal default
pub fn literal_shadow(literal: &Literal) -> String {
    match literal {
        Literal::Number(repr) => format!(
            r#"<shadow type="math_number"><field name="NUM">{}</field></shadow>"#,
            escape(repr.as_str())
        ),
        Literal::Bool(value) => format!(
            r#"<shadow type="logic_boolean"><field name="BOOL">{}</field></shadow>"#,
            if *value { "TRUE" } else { "FALSE" }
        ),
        Literal::Text(text) => format!(
            r#"<shadow type="text"><field name="TEXT">{}</field></shadow>"#,
            escape(text.as_str())
        ),
    }
}

fn to_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_types() {
        let resolver = Resolver::new();
        assert_eq!(resolver.check_type(Some(&ActionType::Float)), Some("Number"));
        assert_eq!(resolver.check_type(Some(&ActionType::Int)), Some("Number"));
        assert_eq!(resolver.check_type(Some(&ActionType::Bool)), Some("Boolean"));
        assert_eq!(resolver.check_type(Some(&ActionType::named("Vec3"))), Some("3DVector"));
        assert_eq!(resolver.check_type(Some(&ActionType::named("Widget"))), None);
        assert_eq!(resolver.check_type(None), None);
    }

    #[test]
    fn test_custom_type_map_extends_defaults() {
        let resolver = Resolver::new().with_type("Widget", "Widget");
        assert_eq!(resolver.check_type(Some(&ActionType::named("Widget"))), Some("Widget"));
        assert_eq!(resolver.check_type(Some(&ActionType::Str)), Some("String"));
    }

    #[test]
    fn test_method_default_literal() {
        let param = MethodParam::new("speed").with_type(ActionType::Float).with_default(1.5);
        let resolved = Resolver::new().resolve_default(&param, None);

        assert_eq!(resolved.value, DefaultValue::Literal(Literal::number("1.5")));
        assert_eq!(resolved.value.to_python(), "1.5");
        assert_eq!(
            resolved.shadow,
            Shadow::Markup(
                r#"<shadow type="math_number"><field name="NUM">1.5</field></shadow>"#.to_string()
            )
        );
    }

    #[test]
    fn test_text_default_is_quoted() {
        let param = MethodParam::new("name").with_type(ActionType::Str).with_default("steve");
        let resolved = Resolver::new().resolve_default(&param, None);
        assert_eq!(resolved.value.to_python(), "'steve'");
    }

    #[test]
    fn test_missing_default_is_null_sentinel() {
        let param = MethodParam::new("target_id").with_type(ActionType::Int);
        let resolved = Resolver::new().resolve_default(&param, None);
        assert_eq!(resolved, DefaultDescriptor::null());
        assert_eq!(resolved.value.to_python(), NULL_SENTINEL);
    }

    #[test]
    fn test_domain_type_zero_constructor() {
        let resolver = Resolver::new().with_shadow("Vec3", r#"<shadow type="vector_3d_zero"></shadow>"#);
        let param = MethodParam::new("position").with_type(ActionType::named("Vec3"));
        let resolved = resolver.resolve_default(&param, None);

        assert_eq!(resolved.value, DefaultValue::Constructor("Vec3(0,0,0)".to_string()));
        assert_eq!(
            resolved.shadow,
            Shadow::Markup(r#"<shadow type="vector_3d_zero"></shadow>"#.to_string())
        );

        let matrix = MethodParam::new("rotation").with_type(ActionType::named("Matrix3"));
        let resolved = resolver.resolve_default(&matrix, None);
        assert_eq!(resolved.value.to_python(), "Matrix3.identity()");
        assert_eq!(resolved.shadow, Shadow::Absent);
    }

    #[test]
    fn test_shadow_override() {
        let resolver = Resolver::new();
        let param = MethodParam::new("speed").with_type(ActionType::Float).with_default(2.5);

        let inline = ParamMeta::new().with_shadow("<shadow type=\"math_number\"></shadow>");
        let resolved = resolver.resolve_default(&param, Some(&inline));
        assert!(matches!(resolved.shadow, Shadow::Markup(ref m) if m.starts_with("<shadow")));
        assert_eq!(resolved.value.to_python(), "2.5");

        let named = ParamMeta::new().with_shadow("SPEED_SHADOW");
        let resolved = resolver.resolve_default(&param, Some(&named));
        assert_eq!(resolved.shadow, Shadow::Template("SPEED_SHADOW".to_string()));
    }

    #[test]
    fn test_text_shadow_is_escaped() {
        let markup = literal_shadow(&Literal::text("a<b"));
        assert!(markup.contains("a&lt;b"));
    }
}
