use std::sync::Arc;

use crate::auth::{CredentialResolver, Credentials};
use crate::error::{ErrorCode, ServiceError};
use crate::storage::{SessionFactory, SessionGuard};

/// Collaborators a request needs to reach the grid: the credential resolver
/// and the session factory. Cloned into each service at startup.
#[derive(Clone)]
pub struct StorageAccess {
  resolver: Arc<dyn CredentialResolver>,
  sessions: Arc<dyn SessionFactory>,
}

impl StorageAccess {
  pub fn new(resolver: Arc<dyn CredentialResolver>, sessions: Arc<dyn SessionFactory>) -> Self {
    Self { resolver, sessions }
  }

  /// Resolve a raw `Authorization` header to credentials
  pub fn resolve(&self, authorization: &str) -> Result<Credentials, ServiceError> {
    self
      .resolver
      .resolve(authorization)
      .map_err(|e| self.reject(e.into()))
  }

  /// Open a session that is closed when the returned guard drops
  pub async fn open_session(&self, credentials: &Credentials) -> Result<SessionGuard, ServiceError> {
    SessionGuard::open(self.sessions.as_ref(), credentials)
      .await
      .map_err(|e| self.reject(e.into()))
  }

  /// Attach the auth challenge to authentication failures
  pub fn reject(&self, error: ServiceError) -> ServiceError {
    if error.code == ErrorCode::AuthenticationFailed {
      error.with_challenge(self.resolver.realm())
    } else {
      error
    }
  }
}

/// Fail with `InvalidRequest` unless `value` is present and non-empty
pub fn require<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, ServiceError> {
  match value {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(ServiceError::invalid_request(format!("null or empty {}", what))),
  }
}
