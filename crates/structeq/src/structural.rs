// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Structural` trait: descriptor and routine access for one type.
//!
//! Implemented by `#[derive(Structural)]`. The object-safe half
//! (`descriptor`/`as_any`/`routine_dyn`) serves dynamically-typed call
//! sites; the `Sized`-gated half serves statically-typed ones. The
//! generated `routine` body owns a per-type slot that caches the registry
//! result, so exact-type calls resolve the routine once and never touch
//! the map again.

use std::any::Any;

use crate::descriptor::TypeDescriptor;
use crate::member::MemberHash;
use crate::synth::Routine;

/// A type with a synthesized structural equals/hash routine.
pub trait Structural: Any {
    /// Descriptor of the value's concrete type.
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// The value, type-erased for routine invocation.
    fn as_any(&self) -> &dyn Any;

    /// Routine of the value's concrete runtime type.
    fn routine_dyn(&self) -> &'static Routine;

    /// Descriptor of the statically-known type.
    fn type_descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;

    /// Routine of the statically-known type, resolved on first use.
    fn routine() -> &'static Routine
    where
        Self: Sized;
}

// Trait objects compare with reference-handle semantics (identity, then
// runtime-type guard, then routine), which makes sequences of boxed
// values fall back gracefully to element-wise structural equality.
impl PartialEq for dyn Structural {
    fn eq(&self, other: &Self) -> bool {
        crate::facade::dyn_equals(self, other)
    }
}

impl Eq for dyn Structural {}

impl MemberHash for dyn Structural {
    fn member_hash(&self) -> i32 {
        crate::facade::Class::hash_dyn(self)
    }
}
