use super::path::normalize_path;
use super::types::{CollectionData, FileListingEntry};
use crate::access::{require, StorageAccess};
use crate::error::ServiceError;

/// Collection metadata lookups.
///
/// Every call runs in its own backend session, opened after the request is
/// validated and closed on every exit path.
#[derive(Clone)]
pub struct CollectionService {
  access: StorageAccess,
}

impl CollectionService {
  pub fn new(access: StorageAccess) -> Self {
    Self { access }
  }

  /// Look up the collection at `path` and, when `listing` is set, one page
  /// of its children starting at `offset`.
  ///
  /// `path` is relative to the grid root; a leading separator is tolerated.
  /// Negative offsets are handed to the backend unchanged.
  pub async fn get_collection(
    &self,
    authorization: Option<&str>,
    path: Option<&str>,
    offset: i32,
    listing: bool,
  ) -> Result<CollectionData, ServiceError> {
    tracing::info!("get_collection(path={:?}, offset={}, listing={})", path, offset, listing);

    let authorization = require(authorization, "authorization")?;
    let path = require(path, "path")?;
    let absolute_path = normalize_path(path);

    let credentials = self.access.resolve(authorization)?;
    let mut session = self.access.open_session(&credentials).await?;

    let collection = session
      .find_collection(&absolute_path)
      .await
      .map_err(|e| self.access.reject(e.into()))?
      .ok_or_else(|| ServiceError::not_found(&absolute_path))?;
    tracing::debug!("found collection: {:?}", collection);

    let mut data = CollectionData::from(collection);

    if listing {
      tracing::info!("add listing with offset at: {}", offset);
      let entries = session
        .list_children(&data.absolute_path, offset)
        .await
        .map_err(|e| self.access.reject(e.into()))?;
      data
        .children
        .extend(entries.into_iter().map(FileListingEntry::from));
      tracing::info!("listing added, {} entries", data.children.len());
    }

    Ok(data)
  }
}
