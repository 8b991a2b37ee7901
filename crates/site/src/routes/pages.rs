//! Markdown content pages: services, FAQ and one page per service.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::content::SERVICE_PAGES;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;
use crate::views::PageContext;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub description: String,
    pub tagline: Option<String>,
    pub content_html: String,
    /// Query string for the booking link, e.g. `?service=Hematology`.
    pub book_query: Option<String>,
}

fn serve_content_page(state: &AppState, ctx: PageContext, slug: &str) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        ctx,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        tagline: page.meta.tagline.clone(),
        content_html: page.content_html.clone(),
        book_query: page
            .meta
            .booking_service()
            .map(|s| format!("?service={}", urlencoding::encode(s.label()))),
    })
}

/// Display the services and pricing page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn services(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, ctx, "services")
}

/// Display the FAQ page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn faq(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    serve_content_page(&state, ctx, "faq")
}

/// Display a service information page, e.g. `/pet-grooming`.
///
/// Only the known service slugs are served from the site root.
///
/// # Errors
///
/// Returns 404 for unknown slugs.
#[instrument(skip(state, ctx))]
pub async fn service_page(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    if !SERVICE_PAGES.contains(&slug.as_str()) {
        return Err(AppError::NotFound(format!("page {slug}")));
    }
    serve_content_page(&state, ctx, &slug)
}
