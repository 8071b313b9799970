//! Which article routes are resolved, missing or still being resolved.

use std::{collections::HashSet, num::NonZeroUsize};

use lru::LruCache;
use parking_lot::Mutex;
use space_traveling_shared::ContentError;

/// Bound on remembered misses and on unreported resolution failures.
const MISSING_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugStatus {
    /// The provider is known to have this article.
    Known,
    /// The provider reported no such article since the last revalidation.
    Missing,
    /// A background resolution is running.
    Pending,
    /// The last background resolution failed transiently and the failure has
    /// not been shown yet.
    Unavailable,
    /// Never seen.
    Unknown,
}

#[derive(Debug)]
pub struct KnownSlugs {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    known: HashSet<String>,
    missing: LruCache<String, ()>,
    pending: HashSet<String>,
    failed: LruCache<String, ContentError>,
}

impl KnownSlugs {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(MISSING_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                known: HashSet::new(),
                missing: LruCache::new(capacity),
                pending: HashSet::new(),
                failed: LruCache::new(capacity),
            }),
        }
    }

    pub fn status(&self, slug: &str) -> SlugStatus {
        let inner = self.inner.lock();
        if inner.known.contains(slug) {
            SlugStatus::Known
        } else if inner.pending.contains(slug) {
            SlugStatus::Pending
        } else if inner.missing.contains(slug) {
            SlugStatus::Missing
        } else if inner.failed.contains(slug) {
            SlugStatus::Unavailable
        } else {
            SlugStatus::Unknown
        }
    }

    /// Adds freshly enumerated slugs and forgets every remembered miss, so
    /// articles published since then can resolve. Returns the known count.
    pub fn refresh(&self, slugs: impl IntoIterator<Item = String>) -> usize {
        let mut inner = self.inner.lock();
        inner.known.extend(slugs);
        inner.missing.clear();
        inner.failed.clear();
        inner.known.len()
    }

    /// Marks `slug` pending. Returns `false` if it is not unknown, in which
    /// case no resolution should be started.
    pub fn begin_resolution(&self, slug: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.known.contains(slug)
            || inner.pending.contains(slug)
            || inner.missing.contains(slug)
            || inner.failed.contains(slug)
        {
            return false;
        }
        inner.pending.insert(slug.to_string())
    }

    pub fn mark_known(&self, slug: &str) {
        let mut inner = self.inner.lock();
        inner.pending.remove(slug);
        inner.missing.pop(slug);
        inner.failed.pop(slug);
        inner.known.insert(slug.to_string());
    }

    pub fn mark_missing(&self, slug: &str) {
        let mut inner = self.inner.lock();
        inner.pending.remove(slug);
        inner.known.remove(slug);
        inner.failed.pop(slug);
        inner.missing.put(slug.to_string(), ());
    }

    /// Records a transient resolution failure. The next request for `slug`
    /// reports it once through [`KnownSlugs::take_failure`].
    pub fn mark_unavailable(&self, slug: &str, err: ContentError) {
        let mut inner = self.inner.lock();
        inner.pending.remove(slug);
        inner.failed.put(slug.to_string(), err);
    }

    /// Removes and returns the recorded failure, making `slug` unknown again
    /// so that a later request retries.
    pub fn take_failure(&self, slug: &str) -> Option<ContentError> {
        self.inner.lock().failed.pop(slug)
    }
}

impl Default for KnownSlugs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use space_traveling_shared::ContentError;

    use super::{KnownSlugs, SlugStatus};

    fn unavailable() -> ContentError {
        ContentError::Status {
            status: 503,
            url: "https://repo.cdn.prismic.io/api/v2".to_string(),
        }
    }

    #[test]
    fn resolution_lifecycle() {
        let slugs = KnownSlugs::new();
        assert_eq!(slugs.status("new-post"), SlugStatus::Unknown);

        assert!(slugs.begin_resolution("new-post"));
        assert!(!slugs.begin_resolution("new-post"));
        assert_eq!(slugs.status("new-post"), SlugStatus::Pending);

        slugs.mark_known("new-post");
        assert_eq!(slugs.status("new-post"), SlugStatus::Known);
        assert!(!slugs.begin_resolution("new-post"));
    }

    #[test]
    fn transient_failure_is_reported_once_then_retried() {
        let slugs = KnownSlugs::new();
        assert!(slugs.begin_resolution("flaky"));
        slugs.mark_unavailable("flaky", unavailable());
        assert_eq!(slugs.status("flaky"), SlugStatus::Unavailable);
        assert!(!slugs.begin_resolution("flaky"));

        let err = slugs.take_failure("flaky").expect("recorded failure");
        assert!(err.is_transient());
        assert!(slugs.take_failure("flaky").is_none());
        assert_eq!(slugs.status("flaky"), SlugStatus::Unknown);
        assert!(slugs.begin_resolution("flaky"));
    }

    #[test]
    fn refresh_clears_misses_and_adds_slugs() {
        let slugs = KnownSlugs::new();
        assert!(slugs.begin_resolution("draft"));
        slugs.mark_missing("draft");
        assert_eq!(slugs.status("draft"), SlugStatus::Missing);

        let count = slugs.refresh(["a".to_string(), "b".to_string()]);
        assert_eq!(count, 2);
        assert_eq!(slugs.status("a"), SlugStatus::Known);
        assert_eq!(slugs.status("draft"), SlugStatus::Unknown);
    }

    #[test]
    fn known_slug_that_disappears_becomes_missing() {
        let slugs = KnownSlugs::new();
        slugs.refresh(["removed".to_string()]);
        slugs.mark_missing("removed");
        assert_eq!(slugs.status("removed"), SlugStatus::Missing);
    }
}
