mod basic;

pub use basic::BasicAuthResolver;

use std::fmt;

/// Connection identity for one request against the storage grid.
///
/// Built fresh from the `Authorization` header on every request and dropped
/// with it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub host: String,
  pub port: u16,
  pub zone: String,
  pub user_name: String,
  pub password: String,
  pub default_resource: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("zone", &self.zone)
      .field("user_name", &self.user_name)
      .field("password", &"<redacted>")
      .field("default_resource", &self.default_resource)
      .finish()
  }
}

/// Errors turning an `Authorization` header into credentials
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
  #[error("authorization header is empty")]
  Empty,

  #[error("unsupported authorization scheme: {0}")]
  UnsupportedScheme(String),

  #[error("credentials are not valid base64")]
  InvalidEncoding,

  #[error("credentials are not valid UTF-8")]
  InvalidUtf8,

  #[error("credentials must have the form user:password")]
  MissingSeparator,

  #[error("user name is empty")]
  EmptyUserName,
}

/// Parses a raw `Authorization` header into validated credentials
pub trait CredentialResolver: Send + Sync {
  fn resolve(&self, authorization: &str) -> Result<Credentials, AuthError>;

  /// Realm advertised in `WWW-Authenticate` challenges
  fn realm(&self) -> &str;
}
