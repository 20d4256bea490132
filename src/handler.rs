//! HTTP request handlers for post pages
//!
//! The handler only gathers request inputs and turns the resolver's outcome
//! into a response; the decision flow itself lives in [`crate::resolver`].

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::error::ResolveError;
use crate::model::{PostParams, PostPath};
use crate::resolver::{Outcome, PostRequest};
use crate::state::AppState;
use crate::template::{render_not_found, render_post};

/// Renders the post published under the requested path
///
/// # Path Parameters
///
/// - `postpath` - Arbitrary-depth post slug, e.g. `2024/05/hello-world`
///
/// # Query Parameters
///
/// - `fbclid` (optional) - Ad-click marker; when present the visitor is redirected
///
/// # Response
///
/// - **200 OK** - Rendered HTML page
/// - **307 Temporary Redirect** - Ad traffic, sent to the public site
/// - **404 Not Found** - No post under this path
/// - **502/503/504** - Content service failed
pub async fn render_post_page(
    State(state): State<AppState>,
    Path(postpath): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ResolveError> {
    let params = PostParams::from_pairs(&query);
    resolve_and_render(&state, PostPath::from_route(&postpath), &params, &headers).await
}

/// Site root has no post; resolves an empty path.
pub async fn render_root(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ResolveError> {
    let params = PostParams::from_pairs(&query);
    resolve_and_render(&state, PostPath::default(), &params, &headers).await
}

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

async fn resolve_and_render(
    state: &AppState,
    path: PostPath,
    params: &PostParams,
    headers: &HeaderMap,
) -> Result<Response, ResolveError> {
    let request = PostRequest {
        path,
        referrer: header_value(headers, header::REFERER),
        tracking_marker: params.tracking_marker().map(str::to_string),
        host: header_value(headers, header::HOST).unwrap_or_else(|| state.default_host.clone()),
    };

    let response = match state.resolver.resolve(request).await? {
        Outcome::Redirect(destination) => Redirect::temporary(&destination).into_response(),
        Outcome::NotFound => (StatusCode::NOT_FOUND, Html(render_not_found())).into_response(),
        Outcome::Render(payload) => Html(render_post(&payload)).into_response(),
    };
    Ok(response)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
