//! Tests for set operations
//!
//! These tests verify:
//! - sadd deduplication and its return values
//! - Membership checks honour the set flag
//! - srem, scard, spop, srandmember and smembers

use serde_json::json;
use tablebrain::{Brain, Config, KeyKind, SADD_NOOP};

fn memory_brain() -> Brain {
    Brain::open(Config::builder().in_memory().build()).unwrap()
}

// =============================================================================
// Add / Membership Tests
// =============================================================================

#[tokio::test]
async fn test_sadd_deduplicates() {
    let brain = memory_brain();

    assert_eq!(brain.sadd("s", json!("a")).await.unwrap(), 1);
    assert_eq!(brain.sadd("s", json!("a")).await.unwrap(), SADD_NOOP);
    assert_eq!(brain.sadd("s", json!("b")).await.unwrap(), 2);

    assert_eq!(brain.scard("s").await.unwrap(), 2);
    assert_eq!(brain.key_type("s").await.unwrap(), Some(KeyKind::Set));
}

#[tokio::test]
async fn test_sadd_objects_ignore_key_order() {
    let brain = memory_brain();

    brain.sadd("s", json!({"x": 1, "y": 2})).await.unwrap();
    assert_eq!(
        brain.sadd("s", json!({"y": 2, "x": 1})).await.unwrap(),
        SADD_NOOP
    );
    assert!(brain.sismember("s", &json!({"y": 2, "x": 1})).await.unwrap());
    assert_eq!(brain.scard("s").await.unwrap(), 1);
}

#[tokio::test]
async fn test_sismember() {
    let brain = memory_brain();

    brain.sadd("s", json!(1)).await.unwrap();

    assert!(brain.sismember("s", &json!(1)).await.unwrap());
    assert!(!brain.sismember("s", &json!("1")).await.unwrap());
    assert!(!brain.sismember("s", &json!(2)).await.unwrap());
    assert!(!brain.sismember("missing", &json!(1)).await.unwrap());
}

#[tokio::test]
async fn test_sismember_ignores_plain_lists() {
    let brain = memory_brain();

    brain.rpush("l", json!("a")).await.unwrap();
    assert!(!brain.sismember("l", &json!("a")).await.unwrap());
}

// =============================================================================
// Removal Tests
// =============================================================================

#[tokio::test]
async fn test_srem() {
    let brain = memory_brain();

    brain.sadd("s", json!("a")).await.unwrap();
    brain.sadd("s", json!("b")).await.unwrap();

    assert_eq!(brain.srem("s", json!("a")).await.unwrap(), 1);
    assert_eq!(brain.srem("s", json!("a")).await.unwrap(), 0);
    assert!(!brain.sismember("s", &json!("a")).await.unwrap());
    assert_eq!(brain.smembers("s").await.unwrap(), vec![json!("b")]);

    // Still a set after removals
    assert_eq!(brain.key_type("s").await.unwrap(), Some(KeyKind::Set));
}

#[tokio::test]
async fn test_spop_takes_latest_member() {
    let brain = memory_brain();

    brain.sadd("s", json!("first")).await.unwrap();
    brain.sadd("s", json!("second")).await.unwrap();

    assert_eq!(brain.spop("s").await.unwrap(), Some(json!("second")));
    assert_eq!(brain.spop("s").await.unwrap(), Some(json!("first")));
    assert_eq!(brain.spop("s").await.unwrap(), None);
    assert_eq!(brain.spop("missing").await.unwrap(), None);
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_srandmember() {
    let brain = memory_brain();

    assert_eq!(brain.srandmember("s").await.unwrap(), None);

    let members = vec![json!("a"), json!(2), json!({"c": 3})];
    for member in &members {
        brain.sadd("s", member.clone()).await.unwrap();
    }

    for _ in 0..20 {
        let picked = brain.srandmember("s").await.unwrap().unwrap();
        assert!(members.contains(&picked), "unexpected member {}", picked);
    }

    // Nothing was removed
    assert_eq!(brain.scard("s").await.unwrap(), 3);
}

#[tokio::test]
async fn test_srandmember_empty_set() {
    let brain = memory_brain();

    brain.sadd("s", json!("only")).await.unwrap();
    brain.spop("s").await.unwrap();

    assert_eq!(brain.srandmember("s").await.unwrap(), None);
}

#[tokio::test]
async fn test_smembers_in_insertion_order() {
    let brain = memory_brain();

    brain.sadd("s", json!("c")).await.unwrap();
    brain.sadd("s", json!("a")).await.unwrap();
    brain.sadd("s", json!("b")).await.unwrap();
    brain.sadd("s", json!("a")).await.unwrap();

    assert_eq!(
        brain.smembers("s").await.unwrap(),
        vec![json!("c"), json!("a"), json!("b")]
    );
    assert!(brain.smembers("missing").await.unwrap().is_empty());
}
