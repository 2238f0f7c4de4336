use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, ListingEntry, ObjectType, SpecialCollectionType};

/// Wire representation of a collection and, optionally, one page of children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
  pub collection_id: i64,
  pub collection_name: String,
  pub absolute_path: String,
  pub collection_parent_name: String,
  pub collection_owner_name: String,
  pub collection_owner_zone: String,
  pub collection_inheritance: bool,
  pub collection_map_id: String,
  pub comments: String,
  pub info1: String,
  pub info2: String,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
  pub spec_col_type: SpecialCollectionType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub object_path: Option<String>,
  #[serde(default)]
  pub children: Vec<FileListingEntry>,
}

/// Wire representation of one listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListingEntry {
  pub id: i64,
  pub path_or_name: String,
  pub parent_path: String,
  pub object_type: ObjectType,
  pub owner_name: String,
  pub owner_zone: String,
  pub data_size: u64,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
  pub spec_col_type: SpecialCollectionType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub special_object_path: Option<String>,
  pub count: i64,
  pub last_result: bool,
  pub total_records: i64,
}

// Conversions destructure exhaustively: a field added to the domain type
// does not compile until it is mapped here and in `mapping`.

impl From<Collection> for CollectionData {
  fn from(collection: Collection) -> Self {
    let Collection {
      collection_id,
      collection_name,
      absolute_path,
      collection_parent_name,
      collection_owner_name,
      collection_owner_zone,
      collection_inheritance,
      collection_map_id,
      comments,
      info1,
      info2,
      created_at,
      modified_at,
      spec_col_type,
      object_path,
    } = collection;

    Self {
      collection_id,
      collection_name,
      absolute_path,
      collection_parent_name,
      collection_owner_name,
      collection_owner_zone,
      collection_inheritance,
      collection_map_id,
      comments,
      info1,
      info2,
      created_at,
      modified_at,
      spec_col_type,
      object_path,
      children: Vec::new(),
    }
  }
}

impl From<ListingEntry> for FileListingEntry {
  fn from(entry: ListingEntry) -> Self {
    let ListingEntry {
      id,
      path_or_name,
      parent_path,
      object_type,
      owner_name,
      owner_zone,
      data_size,
      created_at,
      modified_at,
      spec_col_type,
      special_object_path,
      count,
      is_last_result,
      total_records,
    } = entry;

    Self {
      id,
      path_or_name,
      parent_path,
      object_type,
      owner_name,
      owner_zone,
      data_size,
      created_at,
      modified_at,
      spec_col_type,
      special_object_path,
      count,
      last_result: is_last_result,
      total_records,
    }
  }
}
