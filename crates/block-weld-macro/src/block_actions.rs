//! Implementation of the #[block_actions] macro

use crate::type_parser::rust_type_to_action_type;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse2, Attribute, Error, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, Lit, LitStr, Meta, Pat,
    Type, UnOp,
};

/// Parsed `#[block_actions(...)]` arguments
#[derive(Default)]
struct HostAttrs {
    name: Option<String>,
}

impl HostAttrs {
    fn parse(attr: TokenStream) -> syn::Result<Self> {
        let mut attrs = HostAttrs::default();
        if attr.is_empty() {
            return Ok(attrs);
        }

        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported block_actions attribute, expected `name`"))
            }
        });
        syn::parse::Parser::parse2(parser, attr)?;
        Ok(attrs)
    }
}

/// Parsed method-level `#[block(...)]`
struct MethodAttrs {
    label: String,
    output: Option<String>,
}

/// Parsed parameter-level `#[block(...)]`
#[derive(Default)]
struct ParamAttrs {
    label: Option<String>,
    shadow: Option<String>,
    default: Option<TokenStream>,
}

fn is_block_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("block")
}

/// Remove `#[block]` attributes, returning them
fn take_block_attrs(attrs: &mut Vec<Attribute>) -> Vec<Attribute> {
    let (taken, kept): (Vec<Attribute>, Vec<Attribute>) = attrs.drain(..).partition(is_block_attr);
    *attrs = kept;
    taken
}

fn parse_method_attr(attr: &Attribute) -> syn::Result<MethodAttrs> {
    let mut label = None;
    let mut output = None;

    if !matches!(attr.meta, Meta::Path(_)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("label") {
                let value: LitStr = meta.value()?.parse()?;
                label = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("output") {
                let value: LitStr = meta.value()?.parse()?;
                output = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported block attribute, expected `label` or `output`"))
            }
        })?;
    }

    match label.filter(|l| !l.trim().is_empty()) {
        Some(label) => Ok(MethodAttrs { label, output }),
        None => Err(Error::new_spanned(
            attr,
            "block-weld: #[block] on a method requires a non-empty `label`",
        )),
    }
}

fn parse_param_attr(attr: &Attribute, attrs: &mut ParamAttrs) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("label") {
            let value: LitStr = meta.value()?.parse()?;
            attrs.label = Some(value.value());
            Ok(())
        } else if meta.path.is_ident("shadow") {
            let value: LitStr = meta.value()?.parse()?;
            attrs.shadow = Some(value.value());
            Ok(())
        } else if meta.path.is_ident("default") {
            let value: Expr = meta.value()?.parse()?;
            attrs.default = Some(literal_tokens(&value)?);
            Ok(())
        } else {
            Err(meta.error("unsupported block attribute, expected `label`, `shadow` or `default`"))
        }
    })
}

/// Convert a default expression into `Literal` tokens
///
/// Accepts number, bool and string literals, and negated numbers.
fn literal_tokens(expr: &Expr) -> syn::Result<TokenStream> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(i) => {
                let repr = i.base10_digits();
                Ok(quote! { ::block_weld::Literal::number(#repr) })
            }
            Lit::Float(f) => {
                let repr = f.base10_digits();
                Ok(quote! { ::block_weld::Literal::number(#repr) })
            }
            Lit::Bool(b) => {
                let value = b.value;
                Ok(quote! { ::block_weld::Literal::Bool(#value) })
            }
            Lit::Str(s) => {
                let value = s.value();
                Ok(quote! { ::block_weld::Literal::text(#value) })
            }
            other => Err(Error::new_spanned(
                other,
                "block-weld: default must be a number, bool or string literal",
            )),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match &*unary.expr {
            Expr::Lit(lit) => {
                let digits = match &lit.lit {
                    Lit::Int(i) => i.base10_digits().to_string(),
                    Lit::Float(f) => f.base10_digits().to_string(),
                    other => {
                        return Err(Error::new_spanned(other, "block-weld: only numbers can be negated"))
                    }
                };
                let repr = format!("-{}", digits);
                Ok(quote! { ::block_weld::Literal::number(#repr) })
            }
            other => Err(Error::new_spanned(other, "block-weld: only numbers can be negated")),
        },
        other => Err(Error::new_spanned(
            other,
            "block-weld: default must be a number, bool or string literal",
        )),
    }
}

/// Describe one method, stripping its `#[block]` attributes
fn describe_method(method: &mut ImplItemFn) -> syn::Result<TokenStream> {
    let method_name = method.sig.ident.unraw().to_string();

    let meta = match take_block_attrs(&mut method.attrs).as_slice() {
        [] => None,
        [attr] => Some(parse_method_attr(attr)?),
        [_, second, ..] => {
            return Err(Error::new_spanned(second, "block-weld: duplicate #[block] attribute"))
        }
    };

    let mut params = Vec::new();
    let mut overrides = Vec::new();

    for arg in method.sig.inputs.iter_mut() {
        // The receiver is never a block input
        let FnArg::Typed(pat_type) = arg else {
            continue;
        };

        let name = match &*pat_type.pat {
            Pat::Ident(pat_ident) => pat_ident.ident.unraw().to_string(),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "block-weld: parameters must be plain identifiers",
                ))
            }
        };

        let mut attrs = ParamAttrs::default();
        for attr in take_block_attrs(&mut pat_type.attrs) {
            parse_param_attr(&attr, &mut attrs)?;
        }

        let ty = rust_type_to_action_type(strip_type(&pat_type.ty))?;
        let mut param = quote! {
            ::block_weld::MethodParam::new(#name).with_type(#ty)
        };
        if let Some(default) = &attrs.default {
            param = quote! { #param.with_default(#default) };
        }
        params.push(param);

        if attrs.label.is_some() || attrs.shadow.is_some() {
            let mut param_meta = quote! { ::block_weld::ParamMeta::new() };
            if let Some(label) = &attrs.label {
                param_meta = quote! { #param_meta.with_label(#label) };
            }
            if let Some(shadow) = &attrs.shadow {
                param_meta = quote! { #param_meta.with_shadow(#shadow) };
            }
            overrides.push(quote! { .param(#name, #param_meta) });
        }
    }

    let mut descriptor = quote! {
        ::block_weld::ActionDescriptor::new(#method_name)
            #(.param(#params))*
    };

    if let Some(MethodAttrs { label, output }) = meta {
        let output = output.map(|o| quote! { .with_output_type(#o) });
        descriptor = quote! {
            #descriptor.meta(
                ::block_weld::BlockMeta::new(#label)
                    #output
                    #(#overrides)*
            )
        };
    } else if !overrides.is_empty() {
        return Err(Error::new_spanned(
            &method.sig.ident,
            "block-weld: parameter #[block] attributes require #[block] on the method",
        ));
    }

    Ok(descriptor)
}

fn strip_type(ty: &Type) -> &Type {
    match ty {
        Type::Group(group) => strip_type(&group.elem),
        other => other,
    }
}

/// Host name from the self type (e.g., `MockActions`)
fn host_name(self_ty: &Type) -> syn::Result<String> {
    match strip_type(self_ty) {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.unraw().to_string())
            .ok_or_else(|| Error::new_spanned(type_path, "block-weld: empty type path")),
        other => Err(Error::new_spanned(
            other,
            "block-weld: cannot derive a host name, use #[block_actions(name = \"...\")]",
        )),
    }
}

pub fn block_actions_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    match expand(attr, item) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    }
}

fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let attrs = HostAttrs::parse(attr)?;
    let mut input: ItemImpl = parse2(item)?;

    if let Some((_, path, _)) = &input.trait_ {
        return Err(Error::new_spanned(
            path,
            "block-weld: #[block_actions] must be placed on an inherent impl block",
        ));
    }

    let name = match attrs.name {
        Some(name) => name,
        None => host_name(&input.self_ty)?,
    };

    let mut actions = Vec::new();
    for item in input.items.iter_mut() {
        if let ImplItem::Fn(method) = item {
            actions.push(describe_method(method)?);
        }
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::block_weld::ActionSet for #self_ty #where_clause {
            fn host_actions() -> ::block_weld::HostActions {
                ::block_weld::HostActions::new(#name)
                    #(.action(#actions))*
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn expand_str(attr: TokenStream, item: TokenStream) -> String {
        expand(attr, item).unwrap().to_string().replace(' ', "")
    }

    #[test]
    fn test_expand_actions() {
        let output = expand_str(
            quote!(),
            quote! {
                impl MockActions {
                    #[block(label = "Move Robot")]
                    pub fn r#move(&self, #[block(default = 1.5)] speed: f64, #[block(default = true)] forward: bool) {}

                    #[block(label = "Get Position", output = "3DVector")]
                    pub fn get_position(&self, #[block(label = "Target")] target_id: i64) -> Vec3 { todo!() }

                    fn internal_helper(&self) {}
                }
            },
        );

        assert!(output.contains("impl::block_weld::ActionSetforMockActions"));
        assert!(output.contains("HostActions::new(\"MockActions\")"));
        assert!(output.contains("ActionDescriptor::new(\"move\")"));
        assert!(output.contains("with_default(::block_weld::Literal::number(\"1.5\"))"));
        assert!(output.contains("with_default(::block_weld::Literal::Bool(true))"));
        // Spaces are stripped from the whole expansion, literals included
        assert!(output.contains("BlockMeta::new(\"MoveRobot\")"));
        assert!(output.contains(".with_output_type(\"3DVector\")"));
        assert!(output.contains(".param(\"target_id\",::block_weld::ParamMeta::new().with_label(\"Target\"))"));
        assert!(output.contains("ActionDescriptor::new(\"internal_helper\")"));
        // Helper attributes are stripped from the emitted impl
        assert!(!output.contains("#[block"));
    }

    #[test]
    fn test_custom_host_name() {
        let output = expand_str(quote!(name = "Robot"), quote! { impl MockActions {} });
        assert!(output.contains("HostActions::new(\"Robot\")"));
    }

    #[test]
    fn test_negative_default() {
        let output = expand_str(
            quote!(),
            quote! {
                impl Lamp {
                    #[block(label = "Dim")]
                    fn dim(&self, #[block(default = -2)] by: i32) {}
                }
            },
        );
        assert!(output.contains("Literal::number(\"-2\")"));
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let err = expand(
            quote!(),
            quote! {
                impl Lamp {
                    #[block(output = "Number")]
                    fn level(&self) -> f64 { 0.0 }
                }
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires a non-empty `label`"));

        assert!(expand(quote!(), quote! { impl Lamp { #[block] fn on(&self) {} } }).is_err());
    }

    #[test]
    fn test_rejects_trait_impl_and_unknown_keys() {
        assert!(expand(quote!(), quote! { impl Default for Lamp {} }).is_err());
        assert!(expand(quote!(colour = "1"), quote! { impl Lamp {} }).is_err());
        assert!(expand(
            quote!(),
            quote! { impl Lamp { #[block(label = "On", tooltip = "x")] fn on(&self) {} } }
        )
        .is_err());
    }
}
