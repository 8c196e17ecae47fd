// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Derive expansion: member thunks, the static descriptor table and the
//! `Structural` impl.
//!
//! Per included member the derive emits one equality thunk and one hash
//! thunk over the type-erased parent (`&dyn Any`), picked by the member's
//! resolved policy and syntactic shape. The thunks land in a static
//! `MemberDescriptor` table; the runtime synthesizer composes them into
//! the routine, and the generated `routine()` body caches the registry
//! result in a per-type slot.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields};

use crate::classify::{classify, Shape};
use crate::policy::{self, CollectionComparison, Depth, Inclusion, Resolved};

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic types are not supported: a descriptor table is per concrete type",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs are supported",
            ))
        }
    };

    let type_defaults = policy::type_policy(&input.attrs)?;
    let type_name = name.to_string();
    let type_id = compute_fnv1a_hash(&type_name);

    let mut thunks = Vec::new();
    let mut entries = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };

        let member_spec = policy::member_policy(&field.attrs)?;
        let resolved = policy::resolve(member_spec, type_defaults);
        if resolved.inclusion == Inclusion::Exclude {
            continue;
        }

        let shape = classify(&field.ty)?;
        let eq_ident = format_ident!("member_eq_{}", field_ident);
        let hash_ident = format_ident!("member_hash_{}", field_ident);
        let (eq_body, hash_body) = thunk_bodies(name, field_ident, &shape, &resolved)?;

        thunks.push(quote! {
            fn #eq_ident(x: &dyn ::core::any::Any, y: &dyn ::core::any::Any) -> bool {
                #eq_body
            }

            fn #hash_ident(x: &dyn ::core::any::Any) -> ::core::option::Option<i32> {
                #hash_body
            }
        });

        let name_str = field_ident.to_string();
        let kind = kind_variant(&shape);
        let collections = collections_variant(resolved.collections);
        let depth = depth_variant(resolved.depth);
        entries.push(quote! {
            ::structeq::MemberDescriptor {
                name: #name_str,
                kind: ::structeq::MemberKind::#kind,
                policy: ::structeq::ResolvedPolicy {
                    inclusion: ::structeq::Inclusion::Include,
                    collections: ::structeq::CollectionComparison::#collections,
                    depth: ::structeq::Depth::#depth,
                },
                eq: #eq_ident,
                hash: #hash_ident,
            }
        });
    }

    let member_count = entries.len();

    Ok(quote! {
        const _: () = {
            #(#thunks)*

            static MEMBERS: [::structeq::MemberDescriptor; #member_count] = [#(#entries),*];
            static DESCRIPTOR: ::structeq::TypeDescriptor =
                ::structeq::TypeDescriptor::new(#type_id, #type_name, &MEMBERS);

            #[automatically_derived]
            impl ::structeq::Structural for #name {
                fn descriptor(&self) -> &'static ::structeq::TypeDescriptor {
                    &DESCRIPTOR
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn routine_dyn(&self) -> &'static ::structeq::Routine {
                    <#name as ::structeq::Structural>::routine()
                }

                fn type_descriptor() -> &'static ::structeq::TypeDescriptor {
                    &DESCRIPTOR
                }

                fn routine() -> &'static ::structeq::Routine {
                    static SLOT: ::std::sync::OnceLock<&'static ::structeq::Routine> =
                        ::std::sync::OnceLock::new();
                    *SLOT.get_or_init(|| {
                        ::structeq::registry::global().get_or_build::<#name>()
                    })
                }
            }
        };
    })
}

/// Thunk bodies for one member. Optional members get the null guard here;
/// everything else binds `a`/`b` to the member and defers to the shape.
fn thunk_bodies(
    owner: &syn::Ident,
    field: &syn::Ident,
    shape: &Shape,
    resolved: &Resolved,
) -> syn::Result<(TokenStream2, TokenStream2)> {
    let bind_a = quote!(a);
    let bind_b = quote!(b);

    if let Shape::Optional { inner } = shape {
        let inner_eq = eq_expr(inner, resolved, &bind_a, &bind_b);
        let inner_hash = hash_expr(inner, resolved, &bind_a);
        let eq_body = quote! {
            let (::core::option::Option::Some(x), ::core::option::Option::Some(y)) =
                (x.downcast_ref::<#owner>(), y.downcast_ref::<#owner>())
            else {
                return false;
            };
            match (&x.#field, &y.#field) {
                (::core::option::Option::None, ::core::option::Option::None) => true,
                (::core::option::Option::Some(a), ::core::option::Option::Some(b)) => #inner_eq,
                _ => false,
            }
        };
        let hash_body = quote! {
            let x = x.downcast_ref::<#owner>()?;
            x.#field.as_ref().map(|a| #inner_hash)
        };
        return Ok((eq_body, hash_body));
    }

    let eq = eq_expr(shape, resolved, &bind_a, &bind_b);
    let hash = hash_expr(shape, resolved, &bind_a);
    let eq_body = quote! {
        let (::core::option::Option::Some(x), ::core::option::Option::Some(y)) =
            (x.downcast_ref::<#owner>(), y.downcast_ref::<#owner>())
        else {
            return false;
        };
        let a = &x.#field;
        let b = &y.#field;
        #eq
    };
    let hash_body = quote! {
        let x = x.downcast_ref::<#owner>()?;
        let a = &x.#field;
        ::core::option::Option::Some(#hash)
    };
    Ok((eq_body, hash_body))
}

/// Equality expression over `a`/`b`, both references to the member value.
fn eq_expr(shape: &Shape, resolved: &Resolved, a: &TokenStream2, b: &TokenStream2) -> TokenStream2 {
    match shape {
        Shape::Primitive | Shape::Text | Shape::Optional { .. } => quote! { #a == #b },
        Shape::Composite => match resolved.depth {
            Depth::Memberwise => quote! { #a == #b },
            Depth::Recursive => quote! { ::structeq::Struct::equals(#a, #b) },
        },
        Shape::Sequence => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::sequence_eq(&#a[..], &#b[..]) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::instance_eq(&#a[..], &#b[..]) }
            }
        },
        Shape::MapHash => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::map_eq(#a, #b) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::addr_eq(#a, #b) }
            }
        },
        Shape::MapBTree => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::btree_map_eq(#a, #b) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::addr_eq(#a, #b) }
            }
        },
        Shape::Shared { rc, inner } => match resolved.collections {
            CollectionComparison::Instance => {
                if *rc {
                    quote! { ::structeq::collections::rc_instance_eq(#a, #b) }
                } else {
                    quote! { ::structeq::collections::shared_instance_eq(#a, #b) }
                }
            }
            CollectionComparison::Structure => {
                let deref_a = quote!((&**#a));
                let deref_b = quote!((&**#b));
                eq_expr(inner, resolved, &deref_a, &deref_b)
            }
        },
    }
}

/// Hash expression over `a`, a reference to the member value.
fn hash_expr(shape: &Shape, resolved: &Resolved, a: &TokenStream2) -> TokenStream2 {
    match shape {
        Shape::Primitive | Shape::Text | Shape::Optional { .. } => {
            quote! { ::structeq::MemberHash::member_hash(#a) }
        }
        Shape::Composite => match resolved.depth {
            Depth::Memberwise => quote! { ::structeq::MemberHash::member_hash(#a) },
            Depth::Recursive => quote! { ::structeq::Struct::hash(#a) },
        },
        Shape::Sequence => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::sequence_hash(&#a[..]) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::instance_hash(&#a[..]) }
            }
        },
        Shape::MapHash => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::map_hash(#a) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::addr_hash(#a) }
            }
        },
        Shape::MapBTree => match resolved.collections {
            CollectionComparison::Structure => {
                quote! { ::structeq::collections::btree_map_hash(#a) }
            }
            CollectionComparison::Instance => {
                quote! { ::structeq::collections::addr_hash(#a) }
            }
        },
        Shape::Shared { rc, inner } => match resolved.collections {
            CollectionComparison::Instance => {
                if *rc {
                    quote! { ::structeq::collections::rc_instance_hash(#a) }
                } else {
                    quote! { ::structeq::collections::shared_instance_hash(#a) }
                }
            }
            CollectionComparison::Structure => {
                let deref_a = quote!((&**#a));
                hash_expr(inner, resolved, &deref_a)
            }
        },
    }
}

fn kind_variant(shape: &Shape) -> TokenStream2 {
    match shape {
        Shape::Primitive => quote!(Primitive),
        Shape::Text => quote!(Text),
        Shape::Sequence => quote!(Collection),
        Shape::MapHash | Shape::MapBTree => quote!(Map),
        Shape::Optional { .. } => quote!(Optional),
        Shape::Composite => quote!(Composite),
        Shape::Shared { inner, .. } => kind_variant(inner),
    }
}

fn collections_variant(collections: CollectionComparison) -> TokenStream2 {
    match collections {
        CollectionComparison::Structure => quote!(Structure),
        CollectionComparison::Instance => quote!(Instance),
    }
}

fn depth_variant(depth: Depth) -> TokenStream2 {
    match depth {
        Depth::Memberwise => quote!(Memberwise),
        Depth::Recursive => quote!(Recursive),
    }
}

/// Compute FNV-1a hash (32-bit) for type ID
fn compute_fnv1a_hash(s: &str) -> u32 {
    let mut hash = 2_166_136_261_u32;
    for byte in s.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn excluded_members_leave_no_descriptor_entry() {
        let input: DeriveInput = parse_quote! {
            struct Sample {
                kept: i32,
                #[structeq(exclude)]
                dropped: i32,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("member_eq_kept"));
        assert!(!tokens.contains("member_eq_dropped"));
        assert!(tokens.contains("; 1usize"));
    }

    #[test]
    fn type_default_exclusion_with_member_optin() {
        let input: DeriveInput = parse_quote! {
            #[structeq(members = "exclude")]
            struct Sparse {
                ignored: i32,
                #[structeq(include)]
                counted: i32,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(!tokens.contains("member_eq_ignored"));
        assert!(tokens.contains("member_eq_counted"));
    }

    #[test]
    fn recursive_members_dispatch_through_the_engine() {
        let input: DeriveInput = parse_quote! {
            struct Outer {
                #[structeq(depth = "recursive")]
                inner: Inner,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("Struct :: equals"));
        assert!(tokens.contains("Struct :: hash"));
    }

    #[test]
    fn tuple_structs_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Point(i32, i32);
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Either { A, B }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn generics_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> { value: T }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn unit_struct_yields_empty_table() {
        let input: DeriveInput = parse_quote! {
            struct Marker;
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("; 0usize"));
    }
}
