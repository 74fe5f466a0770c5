use koginkit_core::Color;
use koginkit_designer::{PositionCalculator, StitchTable};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn test_one_definition_per_key(
        entries in prop::collection::vec((1u32..12, 0u8..4), 1..60)
    ) {
        let palette = [Color::BLACK, Color::rgb(255, 0, 0), Color::rgb(0, 0, 255), Color::rgba(0, 0, 0, 128)];
        let mut table = StitchTable::new(PositionCalculator::default());
        let mut distinct = HashSet::new();
        for (length, color) in &entries {
            let color = palette[*color as usize];
            let first = table.get(*length, color).key;
            let second = table.get(*length, color).key;
            prop_assert_eq!(first, second);
            distinct.insert((*length, color));
        }
        prop_assert_eq!(table.len(), distinct.len());
        prop_assert_eq!(table.keys().count(), distinct.len());
    }
}

#[test]
fn test_usage_counts_follow_has() {
    let mut table = StitchTable::new(PositionCalculator::default());
    table.get(2, Color::BLACK);
    table.get(3, Color::BLACK);
    assert!(table.has(2, Color::BLACK).is_some());
    assert!(table.has(2, Color::BLACK).is_some());
    assert!(table.has(5, Color::BLACK).is_none());

    let key = table.has(3, Color::BLACK).unwrap();
    assert_eq!(table.used_count(&key), 1);
    assert_eq!(table.used_keys().len(), 2);
    assert_eq!(table.used_by_length(), vec![(2, vec![Color::BLACK]), (3, vec![Color::BLACK])]);

    table.clear_used();
    assert!(table.used_keys().is_empty());
    assert_eq!(table.len(), 2);
}
