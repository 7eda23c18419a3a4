//! Change filter against the version cache.

use periscope::cache::VersionCache;
use periscope::engine::filter_changed;
use periscope::model::{Job, TrackedResource};

fn resource(id: &str, version: &str) -> TrackedResource {
    TrackedResource::new(id, version, Job::new(format!("job-{id}"), Some(1)))
}

fn ids(resources: &[TrackedResource]) -> Vec<&str> {
    resources.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn empty_cache_keeps_everything_in_order() {
    let cache = VersionCache::new();
    let snapshot = vec![resource("c", "1"), resource("a", "1"), resource("b", "1")];

    let changed = filter_changed(snapshot, &cache);
    assert_eq!(ids(&changed), vec!["c", "a", "b"]);
}

#[test]
fn second_pass_after_marking_is_empty() {
    let cache = VersionCache::new();
    let snapshot = vec![resource("a", "7")];

    let first = filter_changed(snapshot.clone(), &cache);
    assert_eq!(first.len(), 1);
    for r in &first {
        cache.mark_seen(&r.id, &r.version);
    }

    let second = filter_changed(snapshot, &cache);
    assert!(second.is_empty());
}

#[test]
fn version_change_makes_a_resource_eligible_again() {
    let cache = VersionCache::new();
    cache.mark_seen("a", "1");
    cache.mark_seen("b", "1");

    let changed = filter_changed(vec![resource("a", "2"), resource("b", "1")], &cache);
    assert_eq!(ids(&changed), vec!["a"]);
    assert_eq!(changed[0].version, "2");
}

#[test]
fn mixed_snapshot_keeps_relative_order_of_survivors() {
    let cache = VersionCache::new();
    cache.mark_seen("b", "1");
    cache.mark_seen("d", "1");

    let snapshot = vec![
        resource("a", "1"),
        resource("b", "1"),
        resource("c", "1"),
        resource("d", "1"),
        resource("e", "1"),
    ];
    let changed = filter_changed(snapshot, &cache);
    assert_eq!(ids(&changed), vec!["a", "c", "e"]);
}

#[test]
fn empty_snapshot_yields_empty_batch() {
    let cache = VersionCache::new();
    assert!(filter_changed(Vec::new(), &cache).is_empty());
}
