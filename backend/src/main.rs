//! Space Traveling blog server.
//!
//! Renders the publication listing and article pages from a Prismic
//! repository.

mod config;
mod handlers;
mod known_slugs;
mod pages;
mod request_context;
mod routes;
mod state;

use std::{num::NonZeroUsize, sync::Arc};

use anyhow::{Context, Result};
use space_traveling_shared::prismic::PrismicClient;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _logging = space_traveling_runtime::init_logging(
        config.log_dir.as_deref(),
        "space-traveling.log",
    )?;

    tracing::info!("Starting Space Traveling server");
    tracing::info!("Prismic endpoint: {}", config.prismic.endpoint);
    tracing::info!("Images directory: {}", config.images_dir.display());

    let client = PrismicClient::new(&config.prismic).context("failed to build Prismic client")?;
    let capacity = NonZeroUsize::new(config.listing_view_capacity)
        .context("LISTING_VIEW_CAPACITY must be greater than zero")?;
    let app_state = AppState::new(Arc::new(client), capacity);

    // Unresolved routes still work on demand, so a failed enumeration is not fatal.
    match app_state.refresh_known_slugs().await {
        Ok(count) => tracing::info!("Enumerated {} article routes", count),
        Err(err) => tracing::warn!("Initial article route enumeration failed: {}", err),
    }
    let _revalidation = app_state.spawn_revalidation(config.revalidate_interval);

    let app = routes::create_router(app_state, &config.images_dir);

    let addr = config.listen_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
