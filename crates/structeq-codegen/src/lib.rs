// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[derive(Structural)]` macro: generates the static descriptor table
//! and the `Structural` impl for one type.
//!
//! Supported shapes: non-generic structs with named fields (or unit
//! structs, which compare vacuously equal). Member types are classified
//! syntactically; anything unrecognized is treated as a composite and
//! compared through its own `PartialEq`.
//!
//! # Attributes
//!
//! Type level, defaults for every member:
//!
//! ```ignore
//! #[derive(Structural)]
//! #[structeq(members = "exclude", collections = "instance")]
//! struct Snapshot { /* ... */ }
//! ```
//!
//! Member level, overriding the type defaults:
//!
//! ```ignore
//! #[structeq(include, collections = "structure", depth = "recursive")]
//! inner: Inner,
//! ```
//!
//! Conflicting signals on one member (`include` together with `exclude`,
//! or the same knob set twice with different values) are compile errors.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod classify;
mod expand;
mod policy;

/// Derive `Structural` for a struct.
///
/// Emits one comparison thunk and one hash thunk per included member,
/// a static `TypeDescriptor` over them, and the trait impl whose
/// `routine()` caches the synthesized routine in a per-type slot.
#[proc_macro_derive(Structural, attributes(structeq))]
pub fn derive_structural(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
