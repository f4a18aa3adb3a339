use super::engine::SearchService;
use super::response::shape_response;
use super::types::{
    Document, ErrorResponse, HotQueriesParams, HotQueriesResponse, Query as SearchQuery,
    SearchParams, SearchResponse, StatusResponse,
};
use crate::error::GatewayError;
use crate::geo::GeoGate;
use crate::moderation::ContentModerator;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Query};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const DEFAULT_HOT_QUERIES: usize = 10;
pub const MAX_HOT_QUERIES: usize = 50;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Client errors carry their own message; everything else is reported as
/// `internal` so backend detail never reaches the caller.
fn to_api_error(err: &GatewayError, internal: &str) -> ApiError {
    let (status, message) = if err.is_client_error() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, internal.to_string())
    };
    (status, Json(ErrorResponse { error: message }))
}

/// Checks required fields and escapes the text fields of an incoming document.
pub fn prepare_document(mut document: Document) -> crate::error::Result<Document> {
    if document.id.trim().is_empty() {
        return Err(GatewayError::InvalidDocument("missing id".to_string()));
    }
    if document.url.trim().is_empty() {
        return Err(GatewayError::InvalidDocument("missing url".to_string()));
    }

    document.title = html_escape::encode_quoted_attribute(&document.title).into_owned();
    document.content = html_escape::encode_quoted_attribute(&document.content).into_owned();
    document.timestamp.get_or_insert_with(chrono::Utc::now);

    Ok(document)
}

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Extension(service): Extension<Arc<SearchService>>,
    Extension(gate): Extension<GeoGate>,
    Extension(moderator): Extension<Arc<ContentModerator>>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery::parse(
        params.q.as_deref().unwrap_or_default(),
        params.page.as_deref(),
        params.size.as_deref(),
    )
    .map_err(|e| to_api_error(&e, "internal server error"))?;

    let region = gate.classify_request(&headers, peer);

    // The cause is logged by the service.
    let result = service
        .search(&query)
        .await
        .map_err(|e| to_api_error(&e, "internal server error"))?;

    Ok(Json(shape_response(result, region, &moderator)))
}

pub async fn handle_index(
    Extension(service): Extension<Arc<SearchService>>,
    payload: Result<Json<Document>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let document = payload
        .map_err(|rejection| GatewayError::InvalidDocument(rejection.body_text()))
        .and_then(|Json(document)| prepare_document(document))
        .map_err(|e| {
            tracing::debug!("Rejected index request: {}", e);
            to_api_error(&e, "indexing failed")
        })?;

    service
        .index_document(&document)
        .await
        .map_err(|e| to_api_error(&e, "indexing failed"))?;

    Ok(Json(StatusResponse {
        status: "indexed".to_string(),
    }))
}

pub async fn handle_health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

pub async fn handle_hot_queries(
    Query(params): Query<HotQueriesParams>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Json<HotQueriesResponse> {
    let n = params
        .n
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_HOT_QUERIES)
        .clamp(1, MAX_HOT_QUERIES);

    Json(HotQueriesResponse {
        queries: service.hot_queries(n).await,
    })
}

/// CORS policy for the browser UI. An empty list or `*` allows any origin;
/// origins that are not valid header values are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Public HTTP surface with its shared state attached.
pub fn build_router(
    service: Arc<SearchService>,
    gate: GeoGate,
    moderator: Arc<ContentModerator>,
    cors: CorsLayer,
) -> Router {
    Router::new()
        .route("/api/search", get(handle_search))
        .route("/api/index", post(handle_index))
        .route("/api/health", get(handle_health))
        .route("/api/hot", get(handle_hot_queries))
        .layer(Extension(service))
        .layer(Extension(gate))
        .layer(Extension(moderator))
        .layer(cors)
}
