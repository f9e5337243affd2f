//! Property-based tests for update batching.
//!
//! Bindings read a fixed set of fields; random updates write random values.
//! After every update, a binding must have run exactly when one of the fields
//! it reads was changed by at least one write.

use proptest::prelude::*;
use sprig_reactive::{BindMode, NotifierNode, Observable, ReactiveStore};
use std::cell::Cell;
use std::rc::Rc;

const FIELDS: usize = 4;

#[derive(Default, Observable)]
pub struct Cells {
    #[reactive(notifier)]
    node: NotifierNode,
    f0: u8,
    f1: u8,
    f2: u8,
    f3: u8,
}

fn read(cells: &Cells, field: usize) -> u8 {
    match field {
        0 => *cells.f0(),
        1 => *cells.f1(),
        2 => *cells.f2(),
        _ => *cells.f3(),
    }
}

fn write(cells: &mut Cells, field: usize, value: u8) -> bool {
    match field {
        0 => cells.set_f0(value),
        1 => cells.set_f1(value),
        2 => cells.set_f2(value),
        _ => cells.set_f3(value),
    }
}

/// Strategy for the field sets read by each binding.
fn readers_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..FIELDS, 0..FIELDS), 1..5)
}

/// Strategy for a sequence of updates, each a list of (field, value) writes.
fn updates_strategy() -> impl Strategy<Value = Vec<Vec<(usize, u8)>>> {
    prop::collection::vec(prop::collection::vec((0..FIELDS, 0u8..3), 0..6), 1..10)
}

proptest! {
    /// Property: a binding runs once per update that changes a field it reads,
    /// and never otherwise.
    #[test]
    fn bindings_run_exactly_when_read_fields_change(
        readers in readers_strategy(),
        updates in updates_strategy(),
        dynamic in any::<bool>(),
    ) {
        let store = ReactiveStore::new(Cells::default());
        let mode = if dynamic { BindMode::Dynamic } else { BindMode::Static };

        let counters: Vec<Rc<Cell<usize>>> = readers
            .iter()
            .map(|fields| {
                let counter = Rc::new(Cell::new(0));
                let calls = counter.clone();
                let fields = fields.clone();
                store
                    .bind(mode, move |cells: &Cells| {
                        calls.set(calls.get() + 1);
                        for field in &fields {
                            let _ = read(cells, *field);
                        }
                    })
                    .unwrap();
                counter
            })
            .collect();

        let mut model = [0u8; FIELDS];
        let mut expected = vec![1usize; readers.len()];

        for writes in &updates {
            let mut changed = [false; FIELDS];
            for &(field, value) in writes {
                if model[field] != value {
                    model[field] = value;
                    changed[field] = true;
                }
            }

            let recorded = store
                .update(|cells| {
                    let mut recorded = [false; FIELDS];
                    for &(field, value) in writes {
                        recorded[field] |= write(cells, field, value);
                    }
                    recorded
                })
                .unwrap();
            prop_assert_eq!(recorded, changed);

            for (index, fields) in readers.iter().enumerate() {
                if fields.iter().any(|field| changed[*field]) {
                    expected[index] += 1;
                }
            }
            let actual: Vec<usize> = counters.iter().map(|counter| counter.get()).collect();
            prop_assert_eq!(&actual, &expected);
        }

        for field in 0..FIELDS {
            prop_assert_eq!(store.with_state(|cells| read(cells, field)).unwrap(), model[field]);
        }
    }
}
