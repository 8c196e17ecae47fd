// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Comparison-routine synthesis.
//!
//! `build_routine` turns a type descriptor into a [`Routine`]: one
//! equality function and one hash function, specialized for the
//! descriptor's concrete type. Routines are built once per type (the
//! registry memoizes them) and live for the rest of the process.
//!
//! Equality is a fail-fast AND chain. Members are visited cheapest first
//! (primitives before text before composites before collections); the
//! reorder is stable, so declaration order breaks ties and the visit
//! order is deterministic across calls. The hash folds
//! `hash = hash * PRIME + member` in declaration order, seeded with
//! [`SEED`]; an absent member is skipped, not folded as zero, so a value
//! whose optional members are all absent hashes exactly like a value of
//! a narrower shape. That asymmetry is intentional and tested.

use std::any::Any;
use std::fmt;

use crate::descriptor::{MemberKind, TypeDescriptor};
use crate::selector;

/// Hash accumulator seed.
pub const SEED: i32 = 1_374_496_523;

/// Hash accumulator multiplier.
pub const PRIME: i32 = -1_521_134_295;

/// Compiled equals/hash pair for one concrete type.
///
/// Opaque: the only operations are [`Routine::eq`] and [`Routine::hash`].
/// Both take the instances type-erased; a routine invoked on a foreign
/// type answers false / the bare seed rather than panicking.
pub struct Routine {
    eq_fn: Box<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync>,
    hash_fn: Box<dyn Fn(&dyn Any) -> i32 + Send + Sync>,
}

impl Routine {
    #[must_use]
    pub fn eq(&self, x: &dyn Any, y: &dyn Any) -> bool {
        (self.eq_fn)(x, y)
    }

    #[must_use]
    pub fn hash(&self, x: &dyn Any) -> i32 {
        (self.hash_fn)(x)
    }
}

impl fmt::Debug for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Routine")
    }
}

/// Descriptor validation errors, surfaced on first use of the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    DuplicateMember {
        type_name: &'static str,
        member: &'static str,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateMember { type_name, member } => write!(
                f,
                "duplicate member `{}` in descriptor for `{}`",
                member, type_name
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Equality visit cost: lower compares first.
fn eq_cost(kind: MemberKind) -> u8 {
    match kind {
        MemberKind::Primitive => 0,
        MemberKind::Text => 1,
        MemberKind::Optional => 2,
        MemberKind::Composite => 3,
        MemberKind::Collection => 4,
        MemberKind::Map => 5,
    }
}

/// Build the compiled routine for `desc`.
///
/// A descriptor with no participating members yields a vacuous routine:
/// every pair compares equal and every instance hashes to [`SEED`].
///
/// # Errors
///
/// Returns [`BuildError`] when the descriptor fails selection (see
/// [`selector::participating`]).
pub fn build_routine(desc: &'static TypeDescriptor) -> Result<Routine, BuildError> {
    let hash_order = selector::participating(desc)?;
    let mut eq_order = hash_order.clone();
    eq_order.sort_by_key(|m| eq_cost(m.kind));

    log::debug!(
        "[synth] built routine for {} ({} members)",
        desc.type_name,
        hash_order.len()
    );

    let eq_fn: Box<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync> =
        Box::new(move |x, y| eq_order.iter().all(|m| (m.eq)(x, y)));

    let hash_fn: Box<dyn Fn(&dyn Any) -> i32 + Send + Sync> = Box::new(move |x| {
        let mut hash = SEED;
        for member in &hash_order {
            if let Some(member_hash) = (member.hash)(x) {
                hash = hash.wrapping_mul(PRIME).wrapping_add(member_hash);
            }
        }
        hash
    });

    Ok(Routine { eq_fn, hash_fn })
}
