//! Cache store invalidation behavior

use std::collections::BTreeSet;
use std::time::Duration;

use statement_cache::key::CacheKey;
use statement_cache::model::CachedEntry;
use statement_cache::model::Value;
use statement_cache::policy::CachePolicy;
use statement_cache::policy::ExpirationMode;
use statement_cache::store::CacheStore;

fn key(hash: &str, dependencies: &[&str]) -> CacheKey {
    CacheKey::new(
        hash,
        dependencies.iter().map(|d| d.to_string()).collect(),
    )
}

fn deps(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|d| d.to_string()).collect()
}

fn policy() -> CachePolicy {
    CachePolicy::absolute(Duration::from_secs(600))
}

fn scalar(text: &str) -> CachedEntry {
    CachedEntry::Scalar(Value::from(text))
}

#[tokio::test]
async fn invalidating_one_shared_dependency_evicts_both_entries() {
    let store = CacheStore::in_memory();
    let key1 = key("key1", &["entity1", "entity2"]);
    let key2 = key("key2", &["entity1", "entity2"]);

    store.insert(&key1, scalar("value1"), &policy()).await.unwrap();
    store.insert(&key2, scalar("value2"), &policy()).await.unwrap();

    assert!(store.get(&key1).await.unwrap().is_some());
    assert!(store.get(&key2).await.unwrap().is_some());

    assert!(store.invalidate(&deps(&["entity2"])).await.unwrap());

    assert!(store.get(&key1).await.unwrap().is_none());
    assert!(store.get(&key2).await.unwrap().is_none());
}

#[tokio::test]
async fn invalidation_reaches_entries_registered_under_overlapping_sets() {
    let store = CacheStore::in_memory();
    let key1 = key("key1", &["entity1", "entity2"]);
    let key2 = key("key2", &["entity2"]);

    store.insert(&key1, scalar("value1"), &policy()).await.unwrap();
    store.insert(&key2, scalar("value2"), &policy()).await.unwrap();

    assert!(store.invalidate(&deps(&["entity2"])).await.unwrap());

    assert!(store.get(&key1).await.unwrap().is_none());
    assert!(store.get(&key2).await.unwrap().is_none());
}

#[tokio::test]
async fn entries_with_disjoint_dependencies_survive() {
    let store = CacheStore::in_memory();
    let doomed = key("doomed", &["entity1"]);
    let survivor = key("survivor", &["entity3"]);

    store.insert(&doomed, scalar("a"), &policy()).await.unwrap();
    store.insert(&survivor, scalar("b"), &policy()).await.unwrap();

    assert!(store.invalidate(&deps(&["entity1"])).await.unwrap());

    assert!(store.get(&doomed).await.unwrap().is_none());
    assert!(store.get(&survivor).await.unwrap().is_some());
}

#[tokio::test]
async fn invalidating_an_unregistered_dependency_is_a_noop() {
    let store = CacheStore::in_memory();
    assert!(!store.invalidate(&deps(&["nothing"])).await.unwrap());

    // idempotent: a second invalidation of an already emptied dependency
    let k = key("k", &["entity1"]);
    store.insert(&k, scalar("v"), &policy()).await.unwrap();
    assert!(store.invalidate(&deps(&["entity1"])).await.unwrap());
    assert!(!store.invalidate(&deps(&["entity1"])).await.unwrap());
}

#[tokio::test]
async fn null_entries_round_trip_as_hits() {
    let store = CacheStore::in_memory();
    let k = key("null-key", &["entity1", "entity2"]);

    store.insert(&k, CachedEntry::Null, &policy()).await.unwrap();

    let cached = store.get(&k).await.unwrap();
    assert!(matches!(cached, Some(entry) if entry.is_null()));
}

#[tokio::test]
async fn no_index_bucket_outlives_its_entries() {
    let store = CacheStore::in_memory();
    let key1 = key("key1", &["entity1", "entity2"]);
    let key2 = key("key2", &["entity2", "entity3"]);

    store.insert(&key1, scalar("a"), &policy()).await.unwrap();
    store.insert(&key2, scalar("b"), &policy()).await.unwrap();
    assert_eq!(store.index_bucket_count().await, 3);

    store.invalidate(&deps(&["entity2"])).await.unwrap();

    // both entries were registered under entity2; removing them must also
    // scrub entity1 and entity3
    assert_eq!(store.index_bucket_count().await, 0);
}

#[tokio::test]
async fn never_remove_entries_survive_dependency_invalidation() {
    let store = CacheStore::in_memory();
    let pinned = key("pinned", &["entity1"]);
    let normal = key("normal", &["entity1"]);
    let pinned_policy = CachePolicy::default().with_mode(ExpirationMode::NeverRemove);

    store.insert(&pinned, scalar("stays"), &pinned_policy).await.unwrap();
    store.insert(&normal, scalar("goes"), &policy()).await.unwrap();

    store.invalidate(&deps(&["entity1"])).await.unwrap();

    assert!(store.get(&pinned).await.unwrap().is_some());
    assert!(store.get(&normal).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_entries_read_as_misses_and_leave_no_index_residue() {
    let store = CacheStore::in_memory();
    let k = key("short-lived", &["entity1"]);
    let instant = CachePolicy::absolute(Duration::ZERO);

    store.insert(&k, scalar("v"), &instant).await.unwrap();

    assert!(store.get(&k).await.unwrap().is_none());
    assert_eq!(store.index_bucket_count().await, 0);
}

#[tokio::test]
async fn clear_empties_entries_and_index() {
    let store = CacheStore::in_memory();
    let k = key("k", &["entity1"]);
    store.insert(&k, scalar("v"), &policy()).await.unwrap();

    store.clear().await.unwrap();

    assert!(store.get(&k).await.unwrap().is_none());
    assert_eq!(store.index_bucket_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_inserts_and_invalidations_leave_no_orphans() {
    let store = CacheStore::in_memory();
    let mut tasks = Vec::new();

    for i in 0..200 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let k = key(&format!("key{i}"), &["entity1", "entity2"]);
            store.insert(&k, CachedEntry::NonQuery(i), &policy()).await.unwrap();
        }));
    }
    for i in 0..40 {
        let store = store.clone();
        let dependency = if i % 2 == 0 { "entity1" } else { "entity2" };
        tasks.push(tokio::spawn(async move {
            store.invalidate(&deps(&[dependency])).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // a final invalidation must evict everything the index still tracks,
    // after which no bucket may remain
    store.invalidate(&deps(&["entity1", "entity2"])).await.ok();
    assert_eq!(store.index_bucket_count().await, 0);
    let probe = key("key1", &["entity1", "entity2"]);
    assert!(store.get(&probe).await.unwrap().is_none());
}
