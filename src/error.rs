use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::auth::AuthError;
use crate::storage::StorageError;
use crate::wire::{escape_xml, WireFormat, XML_NAMESPACE};

/// API error reported to HTTP callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
  pub code: ErrorCode,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resource: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,
  /// Realm for the `WWW-Authenticate` challenge on 401 responses
  #[serde(skip)]
  pub challenge: Option<String>,
}

/// Error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
  InvalidRequest,
  AuthenticationFailed,
  NotFound,
  StorageError,
  BackendUnavailable,
  NotImplemented,
}

impl ErrorCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::InvalidRequest => "InvalidRequest",
      Self::AuthenticationFailed => "AuthenticationFailed",
      Self::NotFound => "NotFound",
      Self::StorageError => "StorageError",
      Self::BackendUnavailable => "BackendUnavailable",
      Self::NotImplemented => "NotImplemented",
    }
  }

  pub fn http_status(&self) -> StatusCode {
    match self {
      Self::InvalidRequest => StatusCode::BAD_REQUEST,
      Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
      Self::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
    }
  }
}

impl ServiceError {
  pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
      resource: None,
      request_id: None,
      challenge: None,
    }
  }

  pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
    self.resource = Some(resource.into());
    self
  }

  pub fn with_challenge(mut self, realm: impl Into<String>) -> Self {
    self.challenge = Some(realm.into());
    self
  }

  pub fn invalid_request(message: impl Into<String>) -> Self {
    Self::new(ErrorCode::InvalidRequest, message)
  }

  pub fn authentication_failed(message: impl Into<String>) -> Self {
    Self::new(ErrorCode::AuthenticationFailed, message)
  }

  pub fn not_found(path: impl Into<String>) -> Self {
    let path = path.into();
    Self::new(
      ErrorCode::NotFound,
      format!("No collection found at {}", path),
    )
    .with_resource(path)
  }

  pub fn not_implemented(message: impl Into<String>) -> Self {
    Self::new(ErrorCode::NotImplemented, message)
  }

  /// Convert to XML error response
  pub fn to_xml(&self) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<error xmlns=\"{}\">\n", XML_NAMESPACE));
    xml.push_str(&format!("  <code>{}</code>\n", self.code.as_str()));
    xml.push_str(&format!(
      "  <message>{}</message>\n",
      escape_xml(&self.message)
    ));
    if let Some(ref resource) = self.resource {
      xml.push_str(&format!(
        "  <resource>{}</resource>\n",
        escape_xml(resource)
      ));
    }
    if let Some(ref request_id) = self.request_id {
      xml.push_str(&format!(
        "  <requestId>{}</requestId>\n",
        escape_xml(request_id)
      ));
    }
    xml.push_str("</error>");
    xml
  }

  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_else(|_| {
      format!(
        "{{\"code\":\"{}\",\"message\":\"\"}}",
        self.code.as_str()
      )
    })
  }

  /// Render in the negotiated format, tagging the response with a request id
  pub fn render(mut self, format: WireFormat) -> Response {
    if self.request_id.is_none() {
      self.request_id = Some(uuid::Uuid::new_v4().to_string());
    }
    let status = self.code.http_status();
    let body = match format {
      WireFormat::Xml => self.to_xml(),
      WireFormat::Json => self.to_json(),
    };

    let mut response = (status, [(header::CONTENT_TYPE, format.content_type())], body).into_response();
    if status == StatusCode::UNAUTHORIZED {
      if let Some(ref realm) = self.challenge {
        if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
          response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
        }
      }
    }
    response
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    self.render(WireFormat::Xml)
  }
}

impl From<AuthError> for ServiceError {
  fn from(e: AuthError) -> Self {
    ServiceError::authentication_failed(e.to_string())
  }
}

impl From<StorageError> for ServiceError {
  fn from(e: StorageError) -> Self {
    let code = match &e {
      StorageError::AuthenticationFailed(_) => ErrorCode::AuthenticationFailed,
      StorageError::NoSuchCollection(_) => ErrorCode::NotFound,
      StorageError::InvalidArgument(_) => ErrorCode::InvalidRequest,
      StorageError::Unavailable(_) | StorageError::Timeout(_) => ErrorCode::BackendUnavailable,
      StorageError::SessionClosed | StorageError::Internal(_) => ErrorCode::StorageError,
    };
    let error = ServiceError::new(code, e.to_string());
    if let StorageError::NoSuchCollection(path) = e {
      error.with_resource(path)
    } else {
      error
    }
  }
}

impl fmt::Display for ServiceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code.as_str(), self.message)
  }
}

impl std::error::Error for ServiceError {}
