// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Racing first use of a type must produce exactly one routine identity,
// observed by every thread, with the registry populated once.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use structeq::{registry, Struct, Structural};

#[derive(Structural, Debug, Clone)]
struct Fresh {
    value: i64,
    tag: Option<String>,
    samples: Vec<i32>,
}

fn fresh(value: i64) -> Fresh {
    Fresh {
        value,
        tag: Some("t".to_string()),
        samples: vec![1, 2, 3],
    }
}

#[test]
fn racing_first_use_yields_one_routine_identity() {
    const THREADS: usize = 8;

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let a = fresh(i as i64);
                let b = fresh(i as i64);
                assert!(Struct::equals(&a, &b));
                assert_eq!(Struct::hash(&a), Struct::hash(&b));
                std::ptr::from_ref(<Fresh as Structural>::routine()) as usize
            })
        })
        .collect();

    let identities: HashSet<usize> = handles
        .into_iter()
        .map(|handle| handle.join().expect("comparison thread panicked"))
        .collect();

    // Every thread saw the same compiled routine.
    assert_eq!(identities.len(), 1);
    assert!(registry::global().get(TypeId::of::<Fresh>()).is_some());
}

#[test]
fn dynamic_dispatch_hits_the_registry_after_first_use() {
    #[derive(Structural, Debug)]
    struct Late {
        value: i64,
    }

    // Not yet registered: the type has never flowed through the engine.
    assert!(registry::global().get(TypeId::of::<Late>()).is_none());

    let a = Late { value: 1 };
    let b = Late { value: 1 };
    let c = Late { value: 2 };

    // First dynamic encounter populates the map.
    assert!(structeq::Class::equals_dyn(Some(&a), Some(&b)));
    assert!(registry::global().get(TypeId::of::<Late>()).is_some());
    assert!(!structeq::Class::equals_dyn(Some(&a), Some(&c)));

    let before = registry::global().stats();
    assert!(structeq::Class::equals_dyn(Some(&a), Some(&b)));
    let after = registry::global().stats();
    assert!(after.hits > before.hits);
}
