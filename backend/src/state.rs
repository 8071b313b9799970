use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use lru::LruCache;
use parking_lot::Mutex;
use space_traveling_shared::{
    pagination::Paginator, ContentError, ContentProvider, LISTING_PAGE_SIZE, PUBLICATION_TYPE,
};
use tokio::task::JoinHandle;

use crate::{known_slugs::KnownSlugs, request_context::random_id};

#[derive(Clone)]
pub struct AppState {
    /// Content provider handle shared by every request.
    provider: Arc<dyn ContentProvider>,
    /// Live listing views by view id; the least recently used is evicted.
    views: Arc<Mutex<LruCache<String, Arc<Paginator>>>>,
    /// Article route resolution.
    slugs: Arc<KnownSlugs>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ContentProvider>, view_capacity: NonZeroUsize) -> Self {
        Self {
            provider,
            views: Arc::new(Mutex::new(LruCache::new(view_capacity))),
            slugs: Arc::new(KnownSlugs::new()),
        }
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    pub fn slugs(&self) -> &KnownSlugs {
        &self.slugs
    }

    /// Stores a new listing view and returns its id.
    pub fn register_view(&self, paginator: Paginator) -> String {
        let view_id = random_id("view");
        self.views.lock().put(view_id.clone(), Arc::new(paginator));
        view_id
    }

    pub fn view(&self, view_id: &str) -> Option<Arc<Paginator>> {
        self.views.lock().get(view_id).cloned()
    }

    /// Re-enumerates the article routes of the first listing page.
    pub async fn refresh_known_slugs(&self) -> Result<usize, ContentError> {
        let page = self.provider.query_by_type(PUBLICATION_TYPE, LISTING_PAGE_SIZE).await?;
        Ok(self.slugs.refresh(page.results.into_iter().map(|summary| summary.uid)))
    }

    /// Refreshes the known article routes every `interval`.
    pub fn spawn_revalidation(&self, interval: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; startup already enumerated.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match state.refresh_known_slugs().await {
                    Ok(count) => tracing::debug!(known = count, "revalidated article routes"),
                    Err(err) => tracing::warn!("article route revalidation failed: {}", err),
                }
            }
        })
    }

    /// Starts resolving an unknown article route in the background, unless a
    /// resolution for it is already running.
    pub fn start_resolution(&self, slug: &str) {
        if !self.slugs.begin_resolution(slug) {
            return;
        }

        let state = self.clone();
        let slug = slug.to_string();
        tokio::spawn(async move {
            match state.provider.get_by_uid(PUBLICATION_TYPE, &slug).await {
                Ok(_) => {
                    tracing::info!(slug = %slug, "resolved article route");
                    state.slugs.mark_known(&slug);
                },
                Err(err) if err.is_not_found() => {
                    tracing::info!(slug = %slug, "article route does not exist");
                    state.slugs.mark_missing(&slug);
                },
                Err(err) => {
                    tracing::warn!(slug = %slug, "article route resolution failed: {}", err);
                    state.slugs.mark_unavailable(&slug, err);
                },
            }
        });
    }
}
