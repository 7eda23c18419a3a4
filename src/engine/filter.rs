//! Change detection: drop resources already synced at their current version.

use crate::cache::VersionCache;
use crate::model::TrackedResource;

/// Keep every resource whose (id, version) pair has not been synced yet.
///
/// Relative order of the snapshot is preserved. Ids the cache has never
/// seen are always kept.
pub fn filter_changed(snapshot: Vec<TrackedResource>, cache: &VersionCache) -> Vec<TrackedResource> {
    snapshot
        .into_iter()
        .filter(|r| !cache.seen(&r.id, &r.version))
        .collect()
}
