use axum::{
  extract::{Path, Query, State},
  http::{header, HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::types::CollectionData;
use super::xml;
use crate::error::{ErrorCode, ServiceError};
use crate::server::AppState;
use crate::wire::WireFormat;

/// GET /collection/{*path} - Collection metadata, optionally with a listing
pub async fn get_collection(
  State(state): State<Arc<AppState>>,
  Path(path): Path<String>,
  Query(params): Query<HashMap<String, String>>,
  headers: HeaderMap,
) -> Response {
  collection_response(&state, Some(&path), &params, &headers).await
}

/// GET /collection - No path given
pub async fn get_collection_without_path(
  State(state): State<Arc<AppState>>,
  Query(params): Query<HashMap<String, String>>,
  headers: HeaderMap,
) -> Response {
  collection_response(&state, None, &params, &headers).await
}

async fn collection_response(
  state: &AppState,
  path: Option<&str>,
  params: &HashMap<String, String>,
  headers: &HeaderMap,
) -> Response {
  let format = WireFormat::from_headers(headers);
  let authorization = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok());

  let result = fetch(state, authorization, path, params).await;

  match result.and_then(|data| render(&data, format)) {
    Ok(response) => response,
    Err(e) => {
      if e.code.http_status().is_server_error() {
        tracing::error!("collection request failed: {}", e);
      } else {
        tracing::info!("collection request rejected: {}", e);
      }
      e.render(format)
    }
  }
}

async fn fetch(
  state: &AppState,
  authorization: Option<&str>,
  path: Option<&str>,
  params: &HashMap<String, String>,
) -> Result<CollectionData, ServiceError> {
  let offset = parse_offset(params)?;
  let listing = parse_listing(params)?;
  state
    .collections
    .get_collection(authorization, path, offset, listing)
    .await
}

fn render(data: &CollectionData, format: WireFormat) -> Result<Response, ServiceError> {
  let body = match format {
    WireFormat::Xml => xml::collection_xml(data),
    WireFormat::Json => serde_json::to_string(data),
  }
  .map_err(|e| ServiceError::new(ErrorCode::StorageError, e.to_string()))?;

  Ok((StatusCode::OK, [(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// `offset` query parameter, 0 when absent
fn parse_offset(params: &HashMap<String, String>) -> Result<i32, ServiceError> {
  match params.get("offset").map(|s| s.trim()) {
    None | Some("") => Ok(0),
    Some(raw) => raw
      .parse()
      .map_err(|_| ServiceError::invalid_request(format!("offset is not an integer: {}", raw))),
  }
}

/// `listing` query parameter, false when absent
fn parse_listing(params: &HashMap<String, String>) -> Result<bool, ServiceError> {
  match params.get("listing").map(|s| s.trim()) {
    None | Some("") => Ok(false),
    Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(true),
    Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(false),
    Some(raw) => Err(ServiceError::invalid_request(format!(
      "listing is not a boolean: {}",
      raw
    ))),
  }
}
