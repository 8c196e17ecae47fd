// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection comparators and hashers.
//!
//! Sequences compare index-ordered (length first, then pairwise,
//! short-circuit on first mismatch). Maps compare key-ordered: counts,
//! then both key sets sorted by the key's natural `Ord`, then values by
//! key. A key that cannot be fetched during the value phase is treated as
//! inequality, never as an error, so a collection mutated out from under a
//! comparison fails closed.
//!
//! Sequence hashes are order-dependent, map hashes order-independent
//! (keys are sorted first). Both fold with the engine's SEED/PRIME scheme.
//!
//! Identity (`Instance` policy) helpers compare backing storage rather
//! than contents. For contiguous storage that is the data pointer plus
//! length, so two empty vectors — which share the dangling pointer —
//! compare equal under identity.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use crate::member::{fold_64, MemberHash};
use crate::synth::{PRIME, SEED};

/// Index-ordered sequence equality.
#[must_use]
pub fn sequence_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| x == y)
}

/// Order-dependent sequence hash.
#[must_use]
pub fn sequence_hash<T: MemberHash>(a: &[T]) -> i32 {
    let mut hash = SEED;
    for item in a {
        hash = hash.wrapping_mul(PRIME).wrapping_add(item.member_hash());
    }
    hash
}

/// Generic enumerable fallback: element-wise equality in iteration order.
///
/// Length mismatch is detected during iteration, so this works for
/// iterators without a cheap count.
#[must_use]
pub fn iter_eq<I, J>(a: I, b: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator<Item = I::Item>,
    I::Item: PartialEq,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                if x != y {
                    return false;
                }
            }
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Key-ordered map equality over unordered maps.
#[must_use]
pub fn map_eq<K, V>(a: &HashMap<K, V>, b: &HashMap<K, V>) -> bool
where
    K: Ord + Hash,
    V: PartialEq,
{
    if a.len() != b.len() {
        return false;
    }
    let mut a_keys: Vec<&K> = a.keys().collect();
    let mut b_keys: Vec<&K> = b.keys().collect();
    a_keys.sort();
    b_keys.sort();
    if a_keys != b_keys {
        return false;
    }
    for key in a_keys {
        // A vanished key means the map changed mid-comparison: unequal.
        match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) => {
                if x != y {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Order-independent map hash (keys sorted, key then value folded).
#[must_use]
pub fn map_hash<K, V>(a: &HashMap<K, V>) -> i32
where
    K: Ord + Hash + MemberHash,
    V: MemberHash,
{
    let mut keys: Vec<&K> = a.keys().collect();
    keys.sort();
    let mut hash = SEED;
    for key in keys {
        hash = hash.wrapping_mul(PRIME).wrapping_add(key.member_hash());
        if let Some(value) = a.get(key) {
            hash = hash.wrapping_mul(PRIME).wrapping_add(value.member_hash());
        }
    }
    hash
}

/// Key-ordered map equality over maps that are already key-ordered.
#[must_use]
pub fn btree_map_eq<K: Ord, V: PartialEq>(a: &BTreeMap<K, V>, b: &BTreeMap<K, V>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|((ak, av), (bk, bv))| ak == bk && av == bv)
}

/// Order-independent hash for maps that are already key-ordered.
#[must_use]
pub fn btree_map_hash<K: Ord + MemberHash, V: MemberHash>(a: &BTreeMap<K, V>) -> i32 {
    let mut hash = SEED;
    for (key, value) in a {
        hash = hash.wrapping_mul(PRIME).wrapping_add(key.member_hash());
        hash = hash.wrapping_mul(PRIME).wrapping_add(value.member_hash());
    }
    hash
}

// ============================================================================
// Identity (Instance policy) helpers
// ============================================================================

/// Storage identity for contiguous sequences: same data pointer, same length.
#[must_use]
pub fn instance_eq<T>(a: &[T], b: &[T]) -> bool {
    std::ptr::eq(a.as_ptr(), b.as_ptr()) && a.len() == b.len()
}

/// Address-derived hash consistent with [`instance_eq`].
#[must_use]
pub fn instance_hash<T>(a: &[T]) -> i32 {
    fold_64(a.as_ptr() as usize as u64)
}

/// Identity for shared handles.
#[must_use]
pub fn shared_instance_eq<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Address-derived hash consistent with [`shared_instance_eq`].
#[must_use]
pub fn shared_instance_hash<T>(a: &Arc<T>) -> i32 {
    fold_64(Arc::as_ptr(a) as usize as u64)
}

/// Identity for single-threaded shared handles.
#[must_use]
pub fn rc_instance_eq<T>(a: &Rc<T>, b: &Rc<T>) -> bool {
    Rc::ptr_eq(a, b)
}

/// Address-derived hash consistent with [`rc_instance_eq`].
#[must_use]
pub fn rc_instance_hash<T>(a: &Rc<T>) -> i32 {
    fold_64(Rc::as_ptr(a) as usize as u64)
}

/// Field-address identity fallback for members without observable storage.
#[must_use]
pub fn addr_eq<T>(a: &T, b: &T) -> bool {
    std::ptr::eq(a, b)
}

/// Address-derived hash consistent with [`addr_eq`].
#[must_use]
pub fn addr_hash<T>(a: &T) -> i32 {
    fold_64(std::ptr::from_ref(a) as usize as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_compares_by_position() {
        assert!(sequence_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!sequence_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!sequence_eq(&[1, 2, 3], &[1, 2]));
        assert!(sequence_eq::<i32>(&[], &[]));
        // Order matters for sequences.
        assert!(!sequence_eq(&[1, 2], &[2, 1]));
    }

    #[test]
    fn sequence_hash_is_order_dependent() {
        assert_eq!(sequence_hash(&[1, 2, 3]), sequence_hash(&[1, 2, 3]));
        assert_ne!(sequence_hash(&[1, 2, 3]), sequence_hash(&[3, 2, 1]));
        assert_eq!(sequence_hash::<i32>(&[]), SEED);
    }

    #[test]
    fn iter_eq_detects_length_mismatch_lazily() {
        assert!(iter_eq(0..3, 0..3));
        assert!(!iter_eq(0..3, 0..4));
        assert!(!iter_eq(0..4, 0..3));
        assert!(!iter_eq([1, 2].iter(), [1, 3].iter()));
    }

    #[test]
    fn map_eq_ignores_insertion_order() {
        let mut a = HashMap::new();
        let mut b = HashMap::new();
        for (k, v) in [("x", 1), ("y", 2), ("z", 3)] {
            a.insert(k, v);
        }
        for (k, v) in [("z", 3), ("x", 1), ("y", 2)] {
            b.insert(k, v);
        }
        assert!(map_eq(&a, &b));
        assert_eq!(map_hash(&a), map_hash(&b));

        b.insert("y", 9);
        assert!(!map_eq(&a, &b));
    }

    #[test]
    fn map_eq_rejects_differing_key_sets() {
        let mut a = HashMap::new();
        let mut b = HashMap::new();
        a.insert("x", 1);
        a.insert("y", 2);
        b.insert("x", 1);
        b.insert("w", 2);
        assert!(!map_eq(&a, &b));
    }

    #[test]
    fn btree_map_matches_hash_map_semantics() {
        let mut a = BTreeMap::new();
        let mut b = BTreeMap::new();
        a.insert(1, "one");
        a.insert(2, "two");
        b.insert(2, "two");
        b.insert(1, "one");
        assert!(btree_map_eq(&a, &b));
        assert_eq!(btree_map_hash(&a), btree_map_hash(&b));

        let mut h = HashMap::new();
        h.insert(1, "one");
        h.insert(2, "two");
        assert_eq!(map_hash(&h), btree_map_hash(&a));
    }

    #[test]
    fn instance_identity_tracks_storage() {
        let a = vec![1, 2, 3];
        let b = vec![1, 2, 3];
        assert!(instance_eq(&a, &a));
        assert!(!instance_eq(&a, &b));
        assert_eq!(instance_hash(&a), instance_hash(&a));

        let shared = Arc::new(vec![1, 2]);
        let alias = Arc::clone(&shared);
        let other = Arc::new(vec![1, 2]);
        assert!(shared_instance_eq(&shared, &alias));
        assert!(!shared_instance_eq(&shared, &other));
        assert_eq!(
            shared_instance_hash(&shared),
            shared_instance_hash(&alias)
        );
    }
}
