//! Tests for rendered answer caching.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use warden_cache::ResponseCache;

#[test]
fn test_cache_insert_and_get() {
    let cache = ResponseCache::new();
    cache.insert("k", "answer", Duration::from_secs(60));

    assert_eq!(cache.get("k").as_deref(), Some("answer"));
}

#[test]
fn test_cache_miss() {
    let cache = ResponseCache::new();
    assert!(cache.get("missing").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_expiration() {
    let cache = ResponseCache::new();
    let start = Instant::now();
    let ttl = Duration::from_secs(30);

    cache.insert_at("k", "answer", ttl, start);

    assert_eq!(cache.get_at("k", start).as_deref(), Some("answer"));
    assert_eq!(
        cache.get_at("k", start + Duration::from_secs(29)).as_deref(),
        Some("answer")
    );
    assert!(cache.get_at("k", start + ttl).is_none());
    assert!(cache.get_at("k", start + Duration::from_secs(3600)).is_none());
}

#[test]
fn test_expired_entries_are_kept() {
    let cache = ResponseCache::new();
    let start = Instant::now();

    cache.insert_at("k", "answer", Duration::from_secs(1), start);
    assert!(cache.get_at("k", start + Duration::from_secs(5)).is_none());

    // Ignored, not removed.
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_zero_ttl_is_never_served() {
    let cache = ResponseCache::new();
    let start = Instant::now();
    cache.insert_at("k", "answer", Duration::ZERO, start);
    assert!(cache.get_at("k", start).is_none());
}

#[test]
fn test_last_write_wins() {
    let cache = ResponseCache::new();
    cache.insert("k", "first", Duration::from_secs(60));
    cache.insert("k", "second", Duration::from_secs(60));

    assert_eq!(cache.get("k").as_deref(), Some("second"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_rewrite_refreshes_expiry() {
    let cache = ResponseCache::new();
    let start = Instant::now();
    cache.insert_at("k", "old", Duration::from_secs(10), start);
    cache.insert_at("k", "new", Duration::from_secs(10), start + Duration::from_secs(8));

    assert_eq!(
        cache.get_at("k", start + Duration::from_secs(15)).as_deref(),
        Some("new")
    );
}

#[test]
fn test_concurrent_readers_and_writers() {
    let cache = Arc::new(ResponseCache::new());
    let mut handles = Vec::new();

    for writer in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                cache.insert(format!("{}-{}", writer, i), "v", Duration::from_secs(60));
            }
        }));
    }
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let _ = cache.get(&format!("0-{}", i));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 400);
    assert_eq!(cache.get("3-99").as_deref(), Some("v"));
}
