// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide routine registry.
//!
//! Maps runtime type identity to the compiled routine for that type.
//! Population is memoized once per key: the build runs under the map
//! shard lock, so racing first-use threads can never observe two
//! distinct routines for one type. Reads on unrelated keys never block.
//!
//! The registry is conceptually append-only. Routines are leaked into
//! `'static` storage on insert and never evicted — a type's shape cannot
//! change while the process runs, so a built routine stays valid forever.
//!
//! Statically-typed call sites do not pay the map lookup after first
//! use: the derive caches the returned reference in a per-type slot (see
//! the generated `Structural::routine`). The map serves dynamic call
//! sites, where only the runtime type identity is known.

use std::any::TypeId;
use std::sync::OnceLock;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::structural::Structural;
use crate::synth::{build_routine, BuildError, Routine};

/// Registry hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    /// Build duration of the most recent miss.
    pub last_build_ns: u64,
}

/// Type-identity keyed routine cache.
///
/// Constructed once ([`global`]) and read-mostly afterwards. A private
/// registry can be built for tests; production call sites share the
/// global one.
pub struct RoutineRegistry {
    routines: DashMap<TypeId, &'static Routine>,
    stats: RwLock<LookupStats>,
}

impl RoutineRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routines: DashMap::new(),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Routine for an already-registered type identity.
    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<&'static Routine> {
        let hit = self.routines.get(&type_id).map(|r| *r);
        if hit.is_some() {
            self.record_hit();
        }
        hit
    }

    /// Routine for `T`, building and registering it on first use.
    ///
    /// # Panics
    ///
    /// Panics when `T`'s descriptor fails validation. Derived
    /// descriptors never do; hand-registered descriptors that might
    /// should go through [`RoutineRegistry::get_or_try_build`].
    #[must_use]
    pub fn get_or_build<T: Structural>(&self) -> &'static Routine {
        #[allow(clippy::expect_used)] // derive-emitted descriptors are validated at expansion
        self.get_or_try_build::<T>()
            .expect("descriptor failed validation")
    }

    /// Routine for `T`, building and registering it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when `T`'s descriptor fails validation.
    /// Derived descriptors never do; this is the error surface for
    /// hand-registered descriptors.
    pub fn get_or_try_build<T: Structural>(&self) -> Result<&'static Routine, BuildError> {
        if let Some(hit) = self.get(TypeId::of::<T>()) {
            return Ok(hit);
        }

        let start = Instant::now();
        match self.routines.entry(TypeId::of::<T>()) {
            Entry::Occupied(occupied) => {
                self.record_hit();
                Ok(*occupied.get())
            }
            Entry::Vacant(vacant) => {
                let desc = T::type_descriptor();
                let routine: &'static Routine = Box::leak(Box::new(build_routine(desc)?));
                vacant.insert(routine);
                self.record_miss(start);
                log::debug!("[registry] registered routine for {}", desc.type_name);
                Ok(routine)
            }
        }
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.last_build_ns = start.elapsed().as_nanos() as u64;
    }
}

impl Default for RoutineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry, constructed on first use.
#[must_use]
pub fn global() -> &'static RoutineRegistry {
    static GLOBAL: OnceLock<RoutineRegistry> = OnceLock::new();
    GLOBAL.get_or_init(RoutineRegistry::new)
}
