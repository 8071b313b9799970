use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use space_traveling_shared::{
    article_view::ArticlePhase, pagination::Paginator, ContentError, PUBLICATION_TYPE,
};

use crate::{
    known_slugs::SlugStatus,
    pages::{self, view_path},
    request_context::{record_slug, record_view},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// Present (with any value) after a failed load-more.
    #[serde(default)]
    pub error: Option<String>,
}

/// GET /: a fresh listing view with the first page.
pub async fn home(State(state): State<AppState>) -> Response {
    let paginator = match Paginator::initial_load(state.provider()).await {
        Ok(paginator) => paginator,
        Err(err) => {
            tracing::warn!("initial listing load failed: {}", err);
            return pages::unavailable_response();
        },
    };

    let snapshot = paginator.snapshot();
    let view_id = state.register_view(paginator);
    record_view(&view_id);
    tracing::info!(
        view_id = %view_id,
        results = snapshot.results.len(),
        has_more = snapshot.has_more(),
        "created listing view"
    );
    Html(pages::render_listing(&view_id, &snapshot, false)).into_response()
}

/// GET /views/:view_id: everything the view has accumulated so far.
pub async fn listing_view(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response {
    record_view(&view_id);
    let Some(paginator) = state.view(&view_id) else {
        return Redirect::to("/").into_response();
    };
    let snapshot = paginator.snapshot();
    Html(pages::render_listing(&view_id, &snapshot, query.error.is_some())).into_response()
}

/// POST /views/:view_id/more: the "load more" control.
pub async fn load_more(State(state): State<AppState>, Path(view_id): Path<String>) -> Response {
    record_view(&view_id);
    let Some(paginator) = state.view(&view_id) else {
        return Redirect::to("/").into_response();
    };

    let target = view_path(&view_id);
    match paginator.load_more(state.provider()).await {
        Ok(outcome) => {
            tracing::debug!(view_id = %view_id, ?outcome, "load more");
            Redirect::to(&target).into_response()
        },
        Err(err) => {
            tracing::warn!(view_id = %view_id, "load more failed: {}", err);
            Redirect::to(&format!("{target}?error=1")).into_response()
        },
    }
}

/// GET /post/:slug: the article page.
pub async fn article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    record_slug(&slug);
    let phase = match state.slugs().status(&slug) {
        SlugStatus::Known => {
            let result = state.provider().get_by_uid(PUBLICATION_TYPE, &slug).await;
            match &result {
                Err(err) if err.is_not_found() => state.slugs().mark_missing(&slug),
                Err(err) => tracing::warn!(slug = %slug, "article fetch failed: {}", err),
                Ok(_) => {},
            }
            ArticlePhase::from_fetch(result)
        },
        SlugStatus::Missing => ArticlePhase::Failed(ContentError::NotFound {
            uid: slug,
        }),
        SlugStatus::Pending => ArticlePhase::Pending,
        // Another request may have taken the failure first; resolve again.
        SlugStatus::Unavailable => match state.slugs().take_failure(&slug) {
            Some(err) => ArticlePhase::Failed(err),
            None => {
                state.start_resolution(&slug);
                ArticlePhase::Pending
            },
        },
        SlugStatus::Unknown => {
            state.start_resolution(&slug);
            ArticlePhase::Pending
        },
    };
    pages::article_response(phase)
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}
