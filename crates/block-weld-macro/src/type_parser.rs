//! Type parser for converting Rust parameter types to ActionType token streams
//!
//! Block inputs carry a single check type, so only scalar and named types
//! can be described. Everything else is rejected with an error pointing at
//! the offending type.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, GenericArgument, PathArguments, Type};

/// Parse a Rust parameter type into an `ActionType` token stream.
///
/// # Errors
/// Returns a syn::Error with source location if the type cannot be
/// described as a block input.
///
/// # Supported Types
/// - Numbers: u8-u64, i8-i64, usize, isize (int), f32, f64 (float)
/// - Text: String, str, char
/// - bool
/// - Wrappers: Option<T>, Box<T>, Arc<T>, Rc<T> (described by T)
/// - References: &T, &mut T
/// - Custom types: named domain types (e.g., `Vec3`)
pub fn rust_type_to_action_type(ty: &Type) -> syn::Result<TokenStream> {
    match ty {
        Type::Path(type_path) => parse_path_type(type_path),
        Type::Reference(type_ref) => rust_type_to_action_type(&type_ref.elem),
        Type::Paren(type_paren) => rust_type_to_action_type(&type_paren.elem),
        Type::Group(type_group) => rust_type_to_action_type(&type_group.elem),
        Type::Tuple(type_tuple) => Err(Error::new_spanned(
            type_tuple,
            "block-weld: Tuple types cannot be block inputs. \
             Use a named type instead.",
        )),
        Type::Slice(_) | Type::Array(_) => Err(Error::new_spanned(
            ty,
            "block-weld: Slices and arrays cannot be block inputs. \
             Use a named type instead.",
        )),
        Type::ImplTrait(impl_trait) => Err(Error::new_spanned(
            impl_trait,
            "block-weld: `impl Trait` types are not supported. \
             Use concrete types instead.",
        )),
        Type::TraitObject(trait_obj) => Err(Error::new_spanned(
            trait_obj,
            "block-weld: Trait object types (`dyn Trait`) are not supported. \
             Use concrete types instead.",
        )),
        _ => Err(Error::new_spanned(
            ty,
            "block-weld: Unsupported type. \
             This type cannot be described as a block input.",
        )),
    }
}

/// Parse a Type::Path into ActionType tokens
fn parse_path_type(type_path: &syn::TypePath) -> syn::Result<TokenStream> {
    let last_seg = type_path.path.segments.last().ok_or_else(|| {
        Error::new_spanned(type_path, "block-weld: Empty type path encountered.")
    })?;
    let ident = last_seg.ident.to_string();

    if let Some(scalar) = parse_scalar(&ident) {
        return Ok(scalar);
    }

    // Transparent wrappers are described by their inner type
    if matches!(ident.as_str(), "Option" | "Box" | "Arc" | "Rc") {
        if let PathArguments::AngleBracketed(args) = &last_seg.arguments {
            if let Some(GenericArgument::Type(inner)) = args.args.first() {
                return rust_type_to_action_type(inner);
            }
        }
    }

    if !last_seg.arguments.is_empty() {
        return Err(Error::new_spanned(
            type_path,
            "block-weld: Generic types cannot be block inputs. \
             Use a named type instead.",
        ));
    }

    Ok(quote! { ::block_weld::ActionType::named(#ident) })
}

/// Parse a scalar type name into ActionType tokens
fn parse_scalar(ident: &str) -> Option<TokenStream> {
    let tokens = match ident {
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32" | "i64" | "i128"
        | "isize" => {
            quote! { ::block_weld::ActionType::Int }
        }
        "f32" | "f64" => quote! { ::block_weld::ActionType::Float },
        "bool" => quote! { ::block_weld::ActionType::Bool },
        "String" | "str" | "char" => quote! { ::block_weld::ActionType::Str },
        _ => return None,
    };
    Some(tokens)
}
