//! Basic usage example for seqalloc.
//!
//! Run with: cargo run --example basic_usage

use seqalloc::{ConstructError, SeqError, Sequence, TrackingAlloc, TrackingConfig};

fn main() {
    println!("=== seqalloc Basic Usage ===\n");

    // === Growth ===
    println!("1. Power-of-two growth");

    let mut seq = Sequence::new();
    for i in 0..5u64 {
        seq.push(i).expect("allocation failed");
        println!("   len {} capacity {}", seq.len(), seq.capacity());
    }
    println!();

    // === Budgets ===
    println!("2. Tracking allocator with a byte budget");

    let tracker = TrackingAlloc::with_config(TrackingConfig::budget(256).with_name("demo"));
    let mut budgeted = Sequence::new_in(tracker.clone());
    let mut pushed = 0u32;
    let err = loop {
        match budgeted.push(pushed) {
            Ok(()) => pushed += 1,
            Err(err) => break err,
        }
    };
    println!("   stopped after {} elements: {}", pushed, err);
    println!("   sequence kept len {} capacity {}", budgeted.len(), budgeted.capacity());
    println!("{}", tracker.stats());

    // === Rollback ===
    println!("3. Failed construction leaves the sequence untouched");

    let mut names = Sequence::from_elem_in(3, &"ok".to_string(), tracker.clone())
        .expect("allocation failed");
    let result = names.try_resize_with(6, || Err(ConstructError::new("out of names")));
    match result {
        Err(SeqError::Construction { index, source }) => {
            println!("   slot {} failed: {}", index, source);
        }
        other => println!("   unexpected: {:?}", other),
    }
    println!("   names still has {} elements\n", names.len());

    drop(budgeted);
    drop(names);
    println!("   balanced after drop: {}", tracker.is_balanced());
    println!("\n=== Done ===");
}
