//! Property tests for block document editing.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

use physio_cms::blocks::BlockType;
use physio_cms::document::BlockDocument;

fn block_type() -> impl Strategy<Value = BlockType> {
    prop::sample::select(BlockType::ALL.to_vec())
}

fn build(types: &[BlockType], indexes: &[usize]) -> BlockDocument {
    let mut doc = BlockDocument::new(Uuid::new_v4());
    for (t, i) in types.iter().zip(indexes.iter().chain(std::iter::repeat(&0))) {
        doc.insert(*i, t.as_str()).unwrap();
    }
    doc
}

fn ids(doc: &BlockDocument) -> Vec<String> {
    doc.to_ordered_list().map(|b| b.id().to_string()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn inserts_keep_ids_unique_and_sort_dense(
        types in prop::collection::vec(block_type(), 0..12),
        indexes in prop::collection::vec(0usize..20, 0..12),
    ) {
        let doc = build(&types, &indexes);
        prop_assert_eq!(doc.len(), types.len());

        let unique: HashSet<String> = ids(&doc).into_iter().collect();
        prop_assert_eq!(unique.len(), doc.len());

        for (i, block) in doc.to_ordered_list().enumerate() {
            prop_assert_eq!(block.sort(), i as i32);
        }
    }

    #[test]
    fn remove_shrinks_by_one_and_keeps_order(
        types in prop::collection::vec(block_type(), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut doc = build(&types, &[]);
        let before = ids(&doc);
        let victim = before[pick.index(before.len())].clone();

        doc.remove(&victim).unwrap();

        let expected: Vec<String> = before.into_iter().filter(|id| *id != victim).collect();
        prop_assert_eq!(ids(&doc), expected);
    }

    #[test]
    fn move_is_a_permutation_and_idempotent(
        types in prop::collection::vec(block_type(), 1..10),
        pick in any::<prop::sample::Index>(),
        to in 0usize..15,
    ) {
        let mut doc = build(&types, &[]);
        let before = ids(&doc);
        let id = before[pick.index(before.len())].clone();

        doc.move_to(&id, to).unwrap();
        let once = ids(&doc);
        doc.move_to(&id, to).unwrap();
        prop_assert_eq!(ids(&doc), once.clone());

        prop_assert_eq!(doc.position(&id), Some(to.min(before.len() - 1)));

        let mut sorted_before = before.clone();
        let mut sorted_after = once;
        sorted_before.sort();
        sorted_after.sort();
        prop_assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn patch_then_read_returns_value_and_keeps_siblings(
        headline in "[A-Za-zÄÖÜäöüß ]{1,40}",
    ) {
        let mut doc = BlockDocument::new(Uuid::new_v4());
        let id = doc.insert(0, "hero").unwrap();
        let before = doc.get(&id).unwrap().props().to_value();

        doc.patch(&id, "headline", json!(headline.clone())).unwrap();
        let after = doc.get(&id).unwrap().props().to_value();

        prop_assert_eq!(&after["headline"], &json!(headline));
        prop_assert_eq!(&after["subheadline"], &before["subheadline"]);
        prop_assert_eq!(&after["alignment"], &before["alignment"]);
    }

    #[test]
    fn failed_patch_leaves_document_unchanged(
        bogus in "[a-z]{3,10}".prop_filter("not an alignment", |s| {
            !["left", "center", "right", "justify"].contains(&s.as_str())
        }),
    ) {
        let mut doc = build(&[BlockType::Text, BlockType::Hero], &[]);
        let snapshot = doc.clone();
        let id = ids(&doc)[0].clone();

        prop_assert!(doc.patch(&id, "alignment", json!(bogus)).is_err());
        prop_assert_eq!(doc, snapshot);
    }
}
