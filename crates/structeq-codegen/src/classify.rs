// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Syntactic member-type classification.
//!
//! Works off the written type, last path segment only (`Vec`, `HashMap`,
//! `Arc`, ...), the same way types are recognized for descriptor layout
//! elsewhere in the workspace. A type this module cannot place is a
//! composite: compared through its own `PartialEq` (or recursively, per
//! policy) and hashed through `MemberHash`.

use syn::{GenericArgument, PathArguments, Type};

/// Shape of one member type, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Fixed-width numeric, `bool` or `char`.
    Primitive,
    /// `String`.
    Text,
    /// `Vec<T>` or `[T; N]`.
    Sequence,
    /// `HashMap<K, V>`.
    MapHash,
    /// `BTreeMap<K, V>`.
    MapBTree,
    /// `Arc<T>` / `Rc<T>` around an inner shape.
    Shared { rc: bool, inner: Box<Shape> },
    /// `Option<T>` around an inner shape.
    Optional { inner: Box<Shape> },
    /// Everything else.
    Composite,
}

impl Shape {
    /// Whether the shape is a collection for policy purposes.
    pub(crate) fn is_collection(&self) -> bool {
        match self {
            Shape::Sequence | Shape::MapHash | Shape::MapBTree => true,
            Shape::Shared { inner, .. } | Shape::Optional { inner } => inner.is_collection(),
            _ => false,
        }
    }
}

/// Classify a member type.
///
/// # Errors
///
/// Rejects `Option<Option<T>>` members; a doubly-absent value has no
/// meaningful comparison policy.
pub(crate) fn classify(ty: &Type) -> syn::Result<Shape> {
    match ty {
        Type::Array(_) => Ok(Shape::Sequence),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return Ok(Shape::Composite);
            };
            match segment.ident.to_string().as_str() {
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                | "u64" | "u128" | "usize" | "f32" | "f64" | "bool" | "char" => {
                    Ok(Shape::Primitive)
                }
                "String" => Ok(Shape::Text),
                "Vec" => Ok(Shape::Sequence),
                "HashMap" => Ok(Shape::MapHash),
                "BTreeMap" => Ok(Shape::MapBTree),
                "Arc" | "Rc" => {
                    let rc = segment.ident == "Rc";
                    let inner = match first_type_argument(&segment.arguments) {
                        // A shared optional has no per-element policy to
                        // apply; compare it like any other composite.
                        Some(arg) => match classify(arg)? {
                            Shape::Optional { .. } => Shape::Composite,
                            shape => shape,
                        },
                        None => Shape::Composite,
                    };
                    Ok(Shape::Shared {
                        rc,
                        inner: Box::new(inner),
                    })
                }
                "Option" => match first_type_argument(&segment.arguments) {
                    Some(arg) => {
                        let inner = classify(arg)?;
                        if matches!(inner, Shape::Optional { .. }) {
                            return Err(syn::Error::new_spanned(
                                ty,
                                "nested Option members are not supported",
                            ));
                        }
                        Ok(Shape::Optional {
                            inner: Box::new(inner),
                        })
                    }
                    None => Ok(Shape::Composite),
                },
                _ => Ok(Shape::Composite),
            }
        }
        _ => Ok(Shape::Composite),
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    if let PathArguments::AngleBracketed(args) = arguments {
        for arg in &args.args {
            if let GenericArgument::Type(ty) = arg {
                return Some(ty);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn shape_of(ty: Type) -> Shape {
        classify(&ty).unwrap()
    }

    #[test]
    fn primitives_and_text() {
        assert_eq!(shape_of(parse_quote!(i64)), Shape::Primitive);
        assert_eq!(shape_of(parse_quote!(f32)), Shape::Primitive);
        assert_eq!(shape_of(parse_quote!(bool)), Shape::Primitive);
        assert_eq!(shape_of(parse_quote!(String)), Shape::Text);
        assert_eq!(shape_of(parse_quote!(std::string::String)), Shape::Text);
    }

    #[test]
    fn collections() {
        assert_eq!(shape_of(parse_quote!(Vec<i32>)), Shape::Sequence);
        assert_eq!(shape_of(parse_quote!([u8; 16])), Shape::Sequence);
        assert_eq!(
            shape_of(parse_quote!(std::collections::HashMap<String, i32>)),
            Shape::MapHash
        );
        assert_eq!(
            shape_of(parse_quote!(BTreeMap<String, i32>)),
            Shape::MapBTree
        );
    }

    #[test]
    fn wrappers_carry_their_inner_shape() {
        assert_eq!(
            shape_of(parse_quote!(Option<Vec<i32>>)),
            Shape::Optional {
                inner: Box::new(Shape::Sequence)
            }
        );
        assert_eq!(
            shape_of(parse_quote!(Arc<Vec<i32>>)),
            Shape::Shared {
                rc: false,
                inner: Box::new(Shape::Sequence)
            }
        );
        assert_eq!(
            shape_of(parse_quote!(Rc<String>)),
            Shape::Shared {
                rc: true,
                inner: Box::new(Shape::Text)
            }
        );
    }

    #[test]
    fn unknown_types_are_composite() {
        assert_eq!(shape_of(parse_quote!(Foo)), Shape::Composite);
        assert_eq!(shape_of(parse_quote!(Box<Foo>)), Shape::Composite);
        assert_eq!(shape_of(parse_quote!((i32, i32))), Shape::Composite);
        assert_eq!(shape_of(parse_quote!(&'static str)), Shape::Composite);
    }

    #[test]
    fn nested_option_is_rejected() {
        let ty: Type = parse_quote!(Option<Option<i32>>);
        assert!(classify(&ty).is_err());
    }

    #[test]
    fn collection_detection_sees_through_wrappers() {
        assert!(shape_of(parse_quote!(Vec<i32>)).is_collection());
        assert!(shape_of(parse_quote!(Option<Vec<i32>>)).is_collection());
        assert!(shape_of(parse_quote!(Arc<Vec<i32>>)).is_collection());
        assert!(!shape_of(parse_quote!(i32)).is_collection());
    }
}
