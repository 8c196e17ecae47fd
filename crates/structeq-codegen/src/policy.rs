// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Comparison-policy attribute parsing and cascade resolution.
//!
//! Resolution is a pure phase that runs before any code generation:
//! member-level attribute, else the type-level default, else the global
//! default (include, structure, memberwise). Conflicting signals on one
//! member are rejected with a descriptive error, never silently picked.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inclusion {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CollectionComparison {
    Structure,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Depth {
    Memberwise,
    Recursive,
}

/// Raw policy signals from one attribute site (type or member).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PolicySpec {
    pub inclusion: Option<Inclusion>,
    pub collections: Option<CollectionComparison>,
    pub depth: Option<Depth>,
}

/// Fully-resolved policy for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub inclusion: Inclusion,
    pub collections: CollectionComparison,
    pub depth: Depth,
}

/// Member attribute beats type default beats the global default.
pub(crate) fn resolve(member: PolicySpec, type_default: PolicySpec) -> Resolved {
    Resolved {
        inclusion: member
            .inclusion
            .or(type_default.inclusion)
            .unwrap_or(Inclusion::Include),
        collections: member
            .collections
            .or(type_default.collections)
            .unwrap_or(CollectionComparison::Structure),
        depth: member
            .depth
            .or(type_default.depth)
            .unwrap_or(Depth::Memberwise),
    }
}

/// Type-level `#[structeq(...)]` defaults.
///
/// Accepts `members = "include" | "exclude"`, `collections = "structure"
/// | "instance"`, `depth = "memberwise" | "recursive"`.
pub(crate) fn type_policy(attrs: &[Attribute]) -> syn::Result<PolicySpec> {
    let mut spec = PolicySpec::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("structeq")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("members") {
                let value: LitStr = meta.value()?.parse()?;
                let inclusion = match value.value().as_str() {
                    "include" => Inclusion::Include,
                    "exclude" => Inclusion::Exclude,
                    other => {
                        return Err(syn::Error::new(
                            value.span(),
                            format!(
                                "unknown member default `{other}` (expected \"include\" or \"exclude\")"
                            ),
                        ))
                    }
                };
                set(&mut spec.inclusion, inclusion, &meta, "member inclusion")
            } else if meta.path.is_ident("collections") {
                let collections = parse_collections(&meta)?;
                set(&mut spec.collections, collections, &meta, "collection comparison")
            } else if meta.path.is_ident("depth") {
                let depth = parse_depth(&meta)?;
                set(&mut spec.depth, depth, &meta, "comparison depth")
            } else {
                Err(meta.error(
                    "unknown structeq type attribute (expected `members`, `collections` or `depth`)",
                ))
            }
        })?;
    }
    Ok(spec)
}

/// Member-level `#[structeq(...)]` overrides.
///
/// Accepts the `include`/`exclude` flags plus `collections = ...` and
/// `depth = ...`.
pub(crate) fn member_policy(attrs: &[Attribute]) -> syn::Result<PolicySpec> {
    let mut spec = PolicySpec::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("structeq")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("include") {
                set(&mut spec.inclusion, Inclusion::Include, &meta, "member inclusion")
            } else if meta.path.is_ident("exclude") {
                set(&mut spec.inclusion, Inclusion::Exclude, &meta, "member inclusion")
            } else if meta.path.is_ident("collections") {
                let collections = parse_collections(&meta)?;
                set(&mut spec.collections, collections, &meta, "collection comparison")
            } else if meta.path.is_ident("depth") {
                let depth = parse_depth(&meta)?;
                set(&mut spec.depth, depth, &meta, "comparison depth")
            } else {
                Err(meta.error(
                    "unknown structeq member attribute (expected `include`, `exclude`, `collections` or `depth`)",
                ))
            }
        })?;
    }
    Ok(spec)
}

fn parse_collections(meta: &ParseNestedMeta) -> syn::Result<CollectionComparison> {
    let value: LitStr = meta.value()?.parse()?;
    match value.value().as_str() {
        "structure" => Ok(CollectionComparison::Structure),
        "instance" => Ok(CollectionComparison::Instance),
        other => Err(syn::Error::new(
            value.span(),
            format!("unknown collection comparison `{other}` (expected \"structure\" or \"instance\")"),
        )),
    }
}

fn parse_depth(meta: &ParseNestedMeta) -> syn::Result<Depth> {
    let value: LitStr = meta.value()?.parse()?;
    match value.value().as_str() {
        "memberwise" => Ok(Depth::Memberwise),
        "recursive" => Ok(Depth::Recursive),
        other => Err(syn::Error::new(
            value.span(),
            format!("unknown comparison depth `{other}` (expected \"memberwise\" or \"recursive\")"),
        )),
    }
}

/// Record a signal; a second, different signal for the same knob is a
/// configuration conflict.
fn set<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    meta: &ParseNestedMeta,
    what: &str,
) -> syn::Result<()> {
    match slot {
        Some(existing) if *existing != value => {
            Err(meta.error(format!("conflicting {what} policy for this member")))
        }
        _ => {
            *slot = Some(value);
            Ok(())
        }
    }
}
