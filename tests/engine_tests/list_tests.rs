//! Tests for list operations
//!
//! These tests verify:
//! - Push/pop at both ends and the lengths they report
//! - Indexing and inclusive ranges with negative indices
//! - lset padding, linsert placement and lrem removal
//! - Type checks against scalar values

use serde_json::{json, Value};
use tablebrain::{Brain, BrainError, Config, Placement, MAX_LSET_PADDING};

// =============================================================================
// Helper Functions
// =============================================================================

fn memory_brain() -> Brain {
    Brain::open(Config::builder().in_memory().build()).unwrap()
}

async fn list_of(brain: &Brain, key: &str, values: &[Value]) {
    for value in values {
        brain.rpush(key, value.clone()).await.unwrap();
    }
}

// =============================================================================
// Push / Pop Tests
// =============================================================================

#[tokio::test]
async fn test_lpush_prepends() {
    let brain = memory_brain();

    assert_eq!(brain.lpush("l", json!("a")).await.unwrap(), 1);
    assert_eq!(brain.lpush("l", json!("b")).await.unwrap(), 2);

    assert_eq!(brain.lindex("l", 0).await.unwrap(), Some(json!("b")));
    assert_eq!(brain.lgetall("l").await.unwrap(), Some(vec![json!("b"), json!("a")]));
}

#[tokio::test]
async fn test_rpush_appends() {
    let brain = memory_brain();

    assert_eq!(brain.rpush("l", json!(1)).await.unwrap(), 1);
    assert_eq!(brain.rpush("l", json!(2)).await.unwrap(), 2);
    assert_eq!(brain.rpush("l", json!({"three": 3})).await.unwrap(), 3);

    assert_eq!(brain.lindex("l", -1).await.unwrap(), Some(json!({"three": 3})));
    assert_eq!(brain.llen("l").await.unwrap(), 3);
}

#[tokio::test]
async fn test_pops() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1), json!(2), json!(3)]).await;

    assert_eq!(brain.lpop("l").await.unwrap(), Some(json!(1)));
    assert_eq!(brain.rpop("l").await.unwrap(), Some(json!(3)));
    assert_eq!(brain.lgetall("l").await.unwrap(), Some(vec![json!(2)]));

    assert_eq!(brain.rpop("l").await.unwrap(), Some(json!(2)));
    assert_eq!(brain.lpop("l").await.unwrap(), None);
    assert_eq!(brain.rpop("l").await.unwrap(), None);
    assert_eq!(brain.llen("l").await.unwrap(), 0);
}

#[tokio::test]
async fn test_pop_missing_key() {
    let brain = memory_brain();

    assert_eq!(brain.lpop("missing").await.unwrap(), None);
    assert_eq!(brain.rpop("missing").await.unwrap(), None);
    assert!(!brain.exists("missing").await.unwrap());
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_lindex_out_of_range() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!("a"), json!("b")]).await;

    assert_eq!(brain.lindex("l", 1).await.unwrap(), Some(json!("b")));
    assert_eq!(brain.lindex("l", -2).await.unwrap(), Some(json!("a")));
    assert_eq!(brain.lindex("l", 2).await.unwrap(), None);
    assert_eq!(brain.lindex("missing", 0).await.unwrap(), None);
}

#[tokio::test]
async fn test_lrange() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(0), json!(1), json!(2), json!(3), json!(4)]).await;

    assert_eq!(
        brain.lrange("l", 0, 2).await.unwrap(),
        vec![json!(0), json!(1), json!(2)]
    );
    assert_eq!(brain.lrange("l", 0, -1).await.unwrap().len(), 5);
    assert_eq!(brain.lrange("l", -2, -1).await.unwrap(), vec![json!(3), json!(4)]);
    assert_eq!(brain.lrange("l", 3, 100).await.unwrap(), vec![json!(3), json!(4)]);
    assert!(brain.lrange("l", 4, 2).await.unwrap().is_empty());
    assert!(brain.lrange("missing", 0, -1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lgetall_missing() {
    let brain = memory_brain();
    assert_eq!(brain.lgetall("missing").await.unwrap(), None);
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[tokio::test]
async fn test_lset() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!("a"), json!("b"), json!("c")]).await;

    brain.lset("l", 1, json!("B")).await.unwrap();
    brain.lset("l", -1, json!("C")).await.unwrap();

    assert_eq!(
        brain.lgetall("l").await.unwrap(),
        Some(vec![json!("a"), json!("B"), json!("C")])
    );
}

#[tokio::test]
async fn test_lset_past_tail_pads_with_null() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1)]).await;

    brain.lset("l", 3, json!("x")).await.unwrap();

    assert_eq!(
        brain.lrange("l", 0, -1).await.unwrap(),
        vec![json!(1), Value::Null, Value::Null, json!("x")]
    );
}

#[tokio::test]
async fn test_lset_before_head_fails() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1), json!(2)]).await;

    let result = brain.lset("l", -3, json!(0)).await;
    assert!(matches!(
        result,
        Err(BrainError::IndexOutOfRange { index: -3, .. })
    ));
    assert_eq!(brain.llen("l").await.unwrap(), 2);
}

#[tokio::test]
async fn test_lset_far_past_tail_fails() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1)]).await;

    for index in [i64::MAX, 1 << 40, MAX_LSET_PADDING as i64 + 2] {
        let result = brain.lset("l", index, json!(2)).await;
        assert!(
            matches!(result, Err(BrainError::IndexOutOfRange { index: i, .. }) if i == index),
            "index {} should be rejected",
            index
        );
    }
    assert_eq!(brain.lgetall("l").await.unwrap(), Some(vec![json!(1)]));

    // Padding up to the limit is still allowed
    brain
        .lset("l", MAX_LSET_PADDING as i64 + 1, json!(2))
        .await
        .unwrap();
    assert_eq!(brain.llen("l").await.unwrap(), MAX_LSET_PADDING + 2);
    assert_eq!(brain.lindex("l", -1).await.unwrap(), Some(json!(2)));

    // The queue keeps working after a rejected index
    assert_eq!(brain.rpush("l", json!(3)).await.unwrap(), MAX_LSET_PADDING + 3);
}

#[tokio::test]
async fn test_linsert() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!("a"), json!("c")]).await;

    assert_eq!(
        brain
            .linsert("l", Placement::Before, json!("c"), json!("b"))
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        brain
            .linsert("l", Placement::After, json!("c"), json!("d"))
            .await
            .unwrap(),
        4
    );
    assert_eq!(
        brain.lrange("l", 0, -1).await.unwrap(),
        vec![json!("a"), json!("b"), json!("c"), json!("d")]
    );
}

#[tokio::test]
async fn test_linsert_missing_pivot() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!("a")]).await;

    assert_eq!(
        brain
            .linsert("l", Placement::After, json!("zzz"), json!("b"))
            .await
            .unwrap(),
        -1
    );
    assert_eq!(brain.lgetall("l").await.unwrap(), Some(vec![json!("a")]));

    assert_eq!(
        brain
            .linsert("missing", Placement::Before, json!("a"), json!("b"))
            .await
            .unwrap(),
        -1
    );
    assert!(!brain.exists("missing").await.unwrap());
}

#[tokio::test]
async fn test_linsert_matches_objects_by_content() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!({"a": 1, "b": 2})]).await;

    let pivot = json!({"b": 2, "a": 1});
    assert_eq!(
        brain
            .linsert("l", Placement::Before, pivot, json!("first"))
            .await
            .unwrap(),
        2
    );
    assert_eq!(brain.lindex("l", 0).await.unwrap(), Some(json!("first")));
}

#[tokio::test]
async fn test_lrem_removes_every_occurrence() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1), json!(2), json!(1), json!(3), json!(1)]).await;

    assert_eq!(brain.lrem("l", json!(1)).await.unwrap(), 3);
    assert_eq!(brain.lrange("l", 0, -1).await.unwrap(), vec![json!(2), json!(3)]);

    assert_eq!(brain.lrem("l", json!(99)).await.unwrap(), 0);
    assert_eq!(brain.lrem("missing", json!(1)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_lrem_distinguishes_types() {
    let brain = memory_brain();
    list_of(&brain, "l", &[json!(1), json!("1")]).await;

    assert_eq!(brain.lrem("l", json!("1")).await.unwrap(), 1);
    assert_eq!(brain.lgetall("l").await.unwrap(), Some(vec![json!(1)]));
}

// =============================================================================
// Type Tests
// =============================================================================

#[tokio::test]
async fn test_list_ops_on_scalar() {
    let brain = memory_brain();
    brain.set("s", json!("plain")).await.unwrap();

    assert!(matches!(
        brain.rpush("s", json!(1)).await,
        Err(BrainError::WrongType { .. })
    ));
    assert!(matches!(
        brain.lpop("s").await,
        Err(BrainError::WrongType { .. })
    ));
    assert_eq!(brain.get("s").await.unwrap(), Some(json!("plain")));

    // Plain reads just see no list
    assert_eq!(brain.llen("s").await.unwrap(), 0);
    assert_eq!(brain.lindex("s", 0).await.unwrap(), None);
    assert_eq!(brain.lgetall("s").await.unwrap(), None);
    assert!(brain.lrange("s", 0, -1).await.unwrap().is_empty());
    assert!(brain.smembers("s").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_array_then_push() {
    let brain = memory_brain();
    brain.set("l", json!([1, 2])).await.unwrap();

    assert_eq!(brain.rpush("l", json!(3)).await.unwrap(), 3);
    assert_eq!(
        brain.lgetall("l").await.unwrap(),
        Some(vec![json!(1), json!(2), json!(3)])
    );
}
