use async_trait::async_trait;
use std::ops::{Deref, DerefMut};

use super::error::StorageError;
use super::types::{Collection, ListingEntry, User};
use crate::auth::Credentials;

/// Opens authenticated sessions against the storage backend
#[async_trait]
pub trait SessionFactory: Send + Sync {
  async fn open(&self, credentials: &Credentials) -> Result<Box<dyn StorageSession>, StorageError>;
}

/// A live backend session owned by a single request
#[async_trait]
pub trait StorageSession: Send {
  /// Look up a collection by absolute path, `None` if nothing exists there
  async fn find_collection(&mut self, absolute_path: &str)
    -> Result<Option<Collection>, StorageError>;

  /// One page of the collection's children starting at `offset`
  async fn list_children(
    &mut self,
    absolute_path: &str,
    offset: i32,
  ) -> Result<Vec<ListingEntry>, StorageError>;

  async fn find_user(&mut self, name: &str) -> Result<Option<User>, StorageError>;

  /// Release the underlying connection. Called exactly once by `SessionGuard`.
  fn close(&mut self) -> Result<(), StorageError>;
}

/// Closes the wrapped session when dropped.
///
/// Release runs on every exit path, including `?` propagation and panic
/// unwinding. Close errors are logged and discarded so they never replace
/// the request's own outcome.
pub struct SessionGuard {
  session: Box<dyn StorageSession>,
}

impl SessionGuard {
  pub fn new(session: Box<dyn StorageSession>) -> Self {
    Self { session }
  }

  /// Open a session through `factory` and wrap it
  pub async fn open(
    factory: &dyn SessionFactory,
    credentials: &Credentials,
  ) -> Result<Self, StorageError> {
    let session = factory.open(credentials).await?;
    tracing::debug!(
      "session opened for {}#{}",
      credentials.user_name,
      credentials.zone
    );
    Ok(Self::new(session))
  }
}

impl Deref for SessionGuard {
  type Target = dyn StorageSession;

  fn deref(&self) -> &Self::Target {
    &*self.session
  }
}

impl DerefMut for SessionGuard {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut *self.session
  }
}

impl Drop for SessionGuard {
  fn drop(&mut self) {
    match self.session.close() {
      Ok(()) => tracing::debug!("session closed"),
      Err(e) => tracing::warn!("error closing session, ignored: {}", e),
    }
  }
}
