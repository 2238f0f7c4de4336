use axum::http::{header, HeaderMap};

pub const XML_NAMESPACE: &str = "http://irods.org/irods-rest";

/// Response encoding chosen from the request's `Accept` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireFormat {
  #[default]
  Xml,
  Json,
}

impl WireFormat {
  /// JSON when the client asks for it, XML otherwise
  pub fn from_accept(accept: Option<&str>) -> Self {
    match accept {
      Some(value)
        if value
          .split(',')
          .map(|part| part.split(';').next().unwrap_or("").trim())
          .any(|media| media.eq_ignore_ascii_case("application/json")) =>
      {
        Self::Json
      }
      _ => Self::Xml,
    }
  }

  pub fn from_headers(headers: &HeaderMap) -> Self {
    Self::from_accept(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      Self::Xml => "application/xml",
      Self::Json => "application/json",
    }
  }
}

pub fn escape_xml(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('\'', "&apos;")
    .replace('"', "&quot;")
}
