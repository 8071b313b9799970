//! Server-rendered HTML pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use space_traveling_shared::{
    article_view::{format_publication_date, ArticlePhase, ArticleView, SITE_NAME},
    pagination::PaginationState,
    rich_text::escape_html,
};

const LOGO_PATH: &str = "/images/logo.svg";
const LISTING_TITLE: &str = "Space Traveling";
/// Seconds before the pending page reloads itself.
const PENDING_REFRESH_SECS: u32 = 1;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub fn post_path(uid: &str) -> String {
    format!("/post/{}", urlencoding::encode(uid))
}

pub fn view_path(view_id: &str) -> String {
    format!("/views/{}", urlencoding::encode(view_id))
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title}</title>
{head_extra}
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn header() -> String {
    format!(
        r#"<header class="header"><a href="/"><img src="{LOGO_PATH}" alt="logo" /></a></header>"#
    )
}

fn info_item(class: &str, text: &str) -> String {
    format!(r#"<p class="{class}">{}</p>"#, escape_html(text))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Listing page for one view. The "load more" form is present only while a
/// next page exists.
pub fn render_listing(view_id: &str, state: &PaginationState, load_failed: bool) -> String {
    let mut posts = String::new();
    for summary in &state.results {
        posts.push_str(&format!(
            r#"<a class="post" href="{href}"><h2>{title}</h2><span>{subtitle}</span><div class="info">{date}{author}</div></a>
"#,
            href = escape_html(&post_path(&summary.uid)),
            title = escape_html(&summary.title),
            subtitle = escape_html(&summary.subtitle),
            date = info_item(
                "date",
                &format_publication_date(summary.first_publication_date.as_deref())
            ),
            author = info_item("author", &summary.author),
        ));
    }

    let error = if load_failed {
        r#"<p class="load-error" role="alert">Não foi possível carregar mais posts. Tente novamente.</p>"#
    } else {
        ""
    };

    let more = if state.has_more() {
        format!(
            r#"<form class="more-posts" method="post" action="{action}"><button type="submit">Carregar mais posts</button></form>"#,
            action = escape_html(&format!("{}/more", view_path(view_id))),
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<div class="container">
<div class="logo"><img src="{LOGO_PATH}" alt="logo" /></div>
<main class="posts">
{posts}</main>
{error}{more}
</div>"#
    );
    layout(LISTING_TITLE, "", &body)
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

pub fn render_article(view: &ArticleView) -> String {
    let banner = view
        .banner
        .as_deref()
        .map(|url| {
            format!(
                r#"<img class="banner" src="{}" alt="{}" />"#,
                escape_html(url),
                escape_html(&view.title)
            )
        })
        .unwrap_or_default();

    let mut sections = String::new();
    for section in &view.sections {
        // Section bodies are sanitized by the rich-text converter.
        sections.push_str(&format!(
            r#"<section class="section"><h2>{}</h2><div class="content">{}</div></section>
"#,
            escape_html(&section.heading),
            section.html,
        ));
    }

    let body = format!(
        r#"{header}
<main class="article">
{banner}
<h1>{title}</h1>
<div class="info">{date}{author}{reading}</div>
{sections}</main>"#,
        header = header(),
        title = escape_html(&view.title),
        date = info_item("date", &view.published_on),
        author = info_item("author", &view.author),
        reading = info_item("reading-time", &format!("{} min", view.reading_time_minutes)),
    );
    layout(&view.document_title(), "", &body)
}

pub fn render_pending() -> String {
    let refresh = format!(r#"<meta http-equiv="refresh" content="{PENDING_REFRESH_SECS}" />"#);
    let body = format!(r#"{}<p class="fallback" aria-busy="true">Carregando...</p>"#, header());
    layout(SITE_NAME, &refresh, &body)
}

pub fn render_message(title: &str, message: &str) -> String {
    let body = format!(
        r#"{}<main class="message"><h1>{}</h1><p>{}</p><p><a href="/">Voltar para a página inicial</a></p></main>"#,
        header(),
        escape_html(title),
        escape_html(message),
    );
    layout(&format!("{title} | {SITE_NAME}"), "", &body)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub fn not_found_response() -> Response {
    let html = render_message("Post não encontrado", "O post que você procura não existe.");
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

pub fn unavailable_response() -> Response {
    let html = render_message(
        "Conteúdo indisponível",
        "Não foi possível carregar o conteúdo agora. Tente novamente em instantes.",
    );
    (StatusCode::BAD_GATEWAY, Html(html)).into_response()
}

/// Renders each article phase distinctly: loading indicator, article page,
/// 404 or 502.
pub fn article_response(phase: ArticlePhase) -> Response {
    match phase {
        ArticlePhase::Pending => Html(render_pending()).into_response(),
        ArticlePhase::Ready(view) => Html(render_article(&view)).into_response(),
        ArticlePhase::Failed(err) if err.is_not_found() => not_found_response(),
        ArticlePhase::Failed(_) => unavailable_response(),
    }
}
