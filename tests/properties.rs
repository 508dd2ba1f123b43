//! Property tests: random operation scripts checked against `Vec`.

use proptest::prelude::*;
use seqalloc::{ConstructError, Sequence, TrackingAlloc};

#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    PushClone(u16),
    Pop,
    Reserve(usize),
    Resize(usize, u16),
    Clear,
    Take,
    Assign(Vec<u16>),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u16>().prop_map(Op::Push),
        2 => any::<u16>().prop_map(Op::PushClone),
        2 => Just(Op::Pop),
        1 => (0usize..100).prop_map(Op::Reserve),
        2 => (0usize..40, any::<u16>()).prop_map(|(n, v)| Op::Resize(n, v)),
        1 => Just(Op::Clear),
        1 => Just(Op::Take),
        1 => prop::collection::vec(any::<u16>(), 0..20).prop_map(Op::Assign),
    ]
}

fn contents(seq: &Sequence<u16, TrackingAlloc>) -> Vec<u16> {
    (0..seq.len()).map(|i| seq[i]).collect()
}

fn check_shape(seq: &Sequence<u16, TrackingAlloc>) -> Result<(), TestCaseError> {
    let capacity = seq.capacity();
    prop_assert!(seq.len() <= capacity);
    prop_assert!(capacity == 0 || capacity.is_power_of_two());
    Ok(())
}

/// Apply `op`, mirroring it on `model`. Returns false if the op failed.
fn apply(seq: &mut Sequence<u16, TrackingAlloc>, model: &mut Vec<u16>, op: &Op) -> bool {
    let ok = match op {
        Op::Push(v) => seq.push(*v).is_ok(),
        Op::PushClone(v) => seq.push_clone(v).is_ok(),
        Op::Pop => {
            assert_eq!(seq.pop(), model.pop());
            return true;
        }
        Op::Reserve(n) => seq.reserve(*n).is_ok(),
        Op::Resize(n, v) => seq.resize(*n, v).is_ok(),
        Op::Clear => {
            seq.clear();
            true
        }
        Op::Take => {
            let taken = seq.take();
            assert_eq!(contents(&taken), *model);
            model.clear();
            return true;
        }
        Op::Assign(values) => {
            let source = Sequence::try_from_fn_in(values.len(), seq.allocator().clone(), |i| {
                Ok::<_, ConstructError>(values[i])
            });
            match source {
                Ok(source) => seq.assign_from(&source).is_ok(),
                Err(_) => false,
            }
        }
    };

    if ok {
        match op {
            Op::Push(v) | Op::PushClone(v) => model.push(*v),
            Op::Resize(n, v) => model.resize(*n, *v),
            Op::Clear => model.clear(),
            Op::Assign(values) => *model = values.clone(),
            _ => {}
        }
    }
    ok
}

proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(arb_op(), 0..60)) {
        let tracker = TrackingAlloc::new();
        {
            let mut seq = Sequence::new_in(tracker.clone());
            let mut model = Vec::new();

            for op in &ops {
                let capacity = seq.capacity();
                prop_assert!(apply(&mut seq, &mut model, op));
                check_shape(&seq)?;
                prop_assert_eq!(contents(&seq), model.clone());
                if !matches!(op, Op::Take | Op::Assign(_)) {
                    prop_assert!(seq.capacity() >= capacity);
                }
            }
        }
        prop_assert!(tracker.is_balanced());
    }

    #[test]
    fn failed_allocation_changes_nothing(
        ops in prop::collection::vec(arb_op(), 1..60),
        fail_after in 0u64..12,
    ) {
        let tracker = TrackingAlloc::new();
        {
            let mut seq = Sequence::new_in(tracker.clone());
            let mut model = Vec::new();
            tracker.arm_failure(fail_after);

            for op in &ops {
                let capacity = seq.capacity();
                let storage = seq.as_ptr();
                let ok = apply(&mut seq, &mut model, op);
                check_shape(&seq)?;
                prop_assert_eq!(contents(&seq), model.clone());
                if !ok {
                    prop_assert_eq!(seq.capacity(), capacity);
                    prop_assert_eq!(seq.as_ptr(), storage);
                }
            }
        }
        prop_assert!(tracker.is_balanced());
    }

    #[test]
    fn copies_are_independent(values in prop::collection::vec(any::<u16>(), 0..50), extra in any::<u16>()) {
        let tracker = TrackingAlloc::new();
        let original = Sequence::try_from_fn_in(values.len(), tracker.clone(), |i| {
            Ok::<_, ConstructError>(values[i])
        }).unwrap();
        let mut copy = original.try_clone().unwrap();

        copy.push(extra).unwrap();
        if !copy.is_empty() {
            copy[0] = copy[0].wrapping_add(1);
        }

        prop_assert_eq!(contents(&original), values.clone());
        prop_assert_eq!(copy.len(), values.len() + 1);
        prop_assert_eq!(original.capacity(), values.len().next_power_of_two() * usize::from(!values.is_empty()));
    }
}
