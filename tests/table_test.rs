mod helpers;

use helpers::{insert, metadata, new_records, noise_embedding, plain_store, test_embedding, DIM};
use semvec::store::types::{Metadata, MetadataValue, NewRecord};
use semvec::StoreError;

#[test]
fn add_assigns_unique_ids_in_insertion_order() {
    let store = plain_store();
    let ids: Vec<String> = (0..5)
        .map(|i| insert(&store, &format!("chunk {i}"), &test_embedding(i)))
        .collect();

    assert_eq!(store.len().unwrap(), 5);
    assert_eq!(store.ids().unwrap(), ids);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
}

#[test]
fn add_stores_text_and_metadata() {
    let store = plain_store();
    let id = store
        .add(
            "Rust ownership rules",
            test_embedding(3),
            metadata(&[("source", "book.md")]),
            false,
        )
        .unwrap()
        .id;

    let record = store.get(&id).unwrap();
    assert_eq!(record.chunk_text, "Rust ownership rules");
    assert_eq!(record.metadata["source"].as_str(), Some("book.md"));
    assert!(record.connections.is_empty());
    assert_eq!(store.embedding(&id).unwrap(), test_embedding(3));
}

#[test]
fn dimension_mismatch_leaves_table_unchanged() {
    let store = plain_store();
    insert(&store, "first", &test_embedding(0));
    let before = store.snapshot().unwrap();

    let err = store
        .add("short", vec![1.0; DIM - 1], Metadata::new(), false)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DimensionMismatch { expected: DIM, actual } if actual == DIM - 1
    ));

    let err = store.top_cosine_similarity(&[1.0; 3], 1).unwrap_err();
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));

    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn batch_with_one_bad_dimension_inserts_nothing() {
    let store = plain_store();
    insert(&store, "existing", &test_embedding(0));

    let mut records = new_records(1..4);
    records.push(NewRecord::new("bad", vec![1.0; DIM + 2]));

    let err = store.add_batch(records, false).unwrap_err();
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn batch_into_empty_table_takes_first_dimension() {
    let store = plain_store();
    let records = vec![
        NewRecord::new("a", vec![1.0, 0.0, 0.0]),
        NewRecord::new("b", vec![1.0, 0.0]),
    ];
    assert!(store.add_batch(records, false).is_err());
    assert!(store.is_empty().unwrap());
    assert_eq!(store.dimension().unwrap(), None);
}

#[test]
fn update_replaces_embedding_and_merges_metadata() {
    let store = plain_store();
    let id = store
        .add(
            "doc",
            test_embedding(1),
            metadata(&[("lang", "en"), ("status", "draft")]),
            false,
        )
        .unwrap()
        .id;

    let result = store
        .update(
            &id,
            Some(test_embedding(9)),
            Some(metadata(&[("status", "final"), ("reviewer", "kim")])),
            false,
        )
        .unwrap();
    assert!(result.embedding_changed);

    let record = store.get(&id).unwrap();
    assert_eq!(record.metadata["lang"].as_str(), Some("en"));
    assert_eq!(record.metadata["status"].as_str(), Some("final"));
    assert_eq!(record.metadata["reviewer"].as_str(), Some("kim"));
    assert_eq!(store.embedding(&id).unwrap(), test_embedding(9));
}

#[test]
fn update_metadata_only_keeps_embedding() {
    let store = plain_store();
    let id = insert(&store, "doc", &test_embedding(2));

    let mut update = Metadata::new();
    update.insert("pages".into(), MetadataValue::Number(12.0));
    let result = store.update(&id, None, Some(update), false).unwrap();

    assert!(!result.embedding_changed);
    assert_eq!(store.embedding(&id).unwrap(), test_embedding(2));
    assert_eq!(store.get(&id).unwrap().metadata["pages"].as_f64(), Some(12.0));
}

#[test]
fn update_wrong_dimension_changes_nothing() {
    let store = plain_store();
    let id = store
        .add("doc", test_embedding(2), metadata(&[("k", "v")]), false)
        .unwrap()
        .id;

    let err = store
        .update(&id, Some(vec![1.0; 2]), Some(metadata(&[("k", "changed")])), false)
        .unwrap_err();
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    assert_eq!(store.get(&id).unwrap().metadata["k"].as_str(), Some("v"));
}

#[test]
fn unknown_ids_are_not_found() {
    let store = plain_store();
    insert(&store, "doc", &test_embedding(0));

    assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update("nope", None, Some(Metadata::new()), false),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.delete("nope"), Err(StoreError::NotFound(_))));
}

#[test]
fn insert_then_delete_is_inverse() {
    let store = plain_store();
    for i in 0..4 {
        insert(&store, &format!("chunk {i}"), &noise_embedding(i));
    }
    let before = store.snapshot().unwrap();

    let id = insert(&store, "temporary", &noise_embedding(99));
    assert_eq!(store.len().unwrap(), 5);
    let removed = store.delete(&id).unwrap();
    assert_eq!(removed.chunk_text, "temporary");

    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn delete_compacts_rows() {
    let store = plain_store();
    let ids: Vec<String> = (0..4)
        .map(|i| insert(&store, &format!("chunk {i}"), &test_embedding(i)))
        .collect();

    store.delete(&ids[1]).unwrap();

    assert_eq!(store.ids().unwrap(), vec![ids[0].clone(), ids[2].clone(), ids[3].clone()]);
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.vectors.len(), snapshot.metadata.len());
    assert_eq!(snapshot.vectors[1], test_embedding(2));
    assert_eq!(store.embedding(&ids[3]).unwrap(), test_embedding(3));
}

#[test]
fn top_k_is_prefix_of_full_ranking() {
    let store = plain_store();
    for i in 0..12 {
        insert(&store, &format!("chunk {i}"), &noise_embedding(i));
    }
    insert(&store, "zero", &[0.0; DIM]);

    let query = noise_embedding(1000);
    let full = store.top_cosine_similarity(&query, 13).unwrap();
    assert_eq!(full.len(), 12, "zero-norm record must be skipped");
    for pair in full.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }

    for k in [1, 4, 7] {
        let partial = store.top_cosine_similarity(&query, k).unwrap();
        let partial_ids: Vec<&str> = partial.iter().map(|h| h.record.id.as_str()).collect();
        let prefix: Vec<&str> = full[..k].iter().map(|h| h.record.id.as_str()).collect();
        assert_eq!(partial_ids, prefix);
    }
}

#[test]
fn search_on_empty_table_is_empty() {
    let store = plain_store();
    assert!(store.top_cosine_similarity(&[1.0, 2.0], 5).unwrap().is_empty());
}

#[test]
fn self_similarity_is_one() {
    let store = plain_store();
    for i in 0..5 {
        insert(&store, &format!("chunk {i}"), &noise_embedding(i));
    }
    let hits = store.top_cosine_similarity(&noise_embedding(3), 1).unwrap();
    assert_eq!(hits[0].record.chunk_text, "chunk 3");
    assert!((hits[0].similarity - 1.0).abs() < 1e-5);
}

#[test]
fn large_components_rank_by_true_similarity() {
    let store = plain_store();
    insert(&store, "unit", &[1.0, 0.0]);
    insert(&store, "big", &[1e20, 1e20]);

    let hits = store.top_cosine_similarity(&[1e20, 1e20], 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].record.chunk_text, "big");
    assert!((hits[0].similarity - 1.0).abs() < 1e-5);
    assert_eq!(hits[1].record.chunk_text, "unit");
    assert!((hits[1].similarity - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
}
