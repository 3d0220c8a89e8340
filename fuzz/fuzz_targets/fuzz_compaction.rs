#![no_main]

use arbitrary::Arbitrary;
use dashgrid_layout::invariants::check;
use dashgrid_layout::{Compactor, Layout, LayoutItem, compact};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Card {
    x: i8,
    y: i8,
    w: u8,
    h: u8,
}

#[derive(Debug, Arbitrary)]
struct Input {
    columns: u8,
    cards: Vec<Card>,
}

fuzz_target!(|input: Input| {
    // 1..=12 columns, at most 48 cards, sizes that always fit.
    let columns = u16::from(input.columns % 12) + 1;
    let width = i32::from(columns);
    let layout: Layout = input
        .cards
        .iter()
        .take(48)
        .enumerate()
        .map(|(i, card)| {
            LayoutItem::new(
                format!("c{i}"),
                i32::from(card.x),
                i32::from(card.y),
                i32::from(card.w) % width + 1,
                i32::from(card.h % 6) + 1,
            )
        })
        .collect();

    let compaction = Compactor::new()
        .run(&layout, columns)
        .expect("generated layouts are valid");
    let output = compaction.layout;

    assert_eq!(output.len(), layout.len(), "card count changed");
    for (before, after) in layout.iter().zip(output.iter()) {
        assert_eq!(before.id, after.id, "order changed");
        assert_eq!((before.w, before.h), (after.w, after.h), "size changed");
    }
    assert_eq!(output.area(), layout.area());

    // Overlap, bounds, and packing slack all show up here.
    if compaction.report.converged {
        let report = check(&output, columns);
        assert!(!report.has_errors(), "{report:?}");
        assert_eq!(compact(&output, columns).as_ref(), Ok(&output), "not idempotent");
    }
});
