use axum::{
  extract::{Path, State},
  http::{header, HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::{ErrorCode, ServiceError};
use crate::server::AppState;
use crate::wire::WireFormat;

/// GET /user/{userName}
pub async fn get_user(
  State(state): State<Arc<AppState>>,
  Path(user_name): Path<String>,
  headers: HeaderMap,
) -> Response {
  let format = WireFormat::from_headers(&headers);
  let authorization = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok());

  let user = match state.users.find_user(authorization, Some(&user_name)).await {
    Ok(user) => user,
    Err(e) => return e.render(format),
  };

  let body = match format {
    WireFormat::Xml => Ok(user.to_xml()),
    WireFormat::Json => serde_json::to_string(&user),
  };
  match body {
    Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, format.content_type())], body).into_response(),
    Err(e) => ServiceError::new(ErrorCode::StorageError, e.to_string()).render(format),
  }
}

/// PUT /user/{userName} - Writes are not supported
pub async fn put_user(Path(user_name): Path<String>, headers: HeaderMap) -> Response {
  tracing::info!("put_user(name={})", user_name);
  ServiceError::not_implemented("user creation is not supported")
    .with_resource(user_name)
    .render(WireFormat::from_headers(&headers))
}
