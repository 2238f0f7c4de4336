use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Special collection semantics reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialCollectionType {
  #[default]
  Normal,
  Linked,
  MountedCollection,
}

impl SpecialCollectionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Normal => "NORMAL",
      Self::Linked => "LINKED",
      Self::MountedCollection => "MOUNTED_COLLECTION",
    }
  }
}

/// Kind of node a listing entry points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
  Collection,
  DataObject,
  #[default]
  Unknown,
}

impl ObjectType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Collection => "COLLECTION",
      Self::DataObject => "DATA_OBJECT",
      Self::Unknown => "UNKNOWN",
    }
  }
}

/// Snapshot of a collection's catalog metadata at lookup time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
  pub collection_id: i64,
  /// Last path segment (`"/"` for the root)
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
  /// Target of a mounted or linked collection
  pub object_path: Option<String>,
}

/// One child of a collection as returned by a paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
  pub id: i64,
  pub path_or_name: String,
  pub parent_path: String,
  pub object_type: ObjectType,
  pub owner_name: String,
  pub owner_zone: String,
  /// Zero for collections
  pub data_size: u64,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
  pub spec_col_type: SpecialCollectionType,
  pub special_object_path: Option<String>,
  /// Position of this entry within the full result set
  pub count: i64,
  pub is_last_result: bool,
  pub total_records: i64,
}

/// Catalog user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub zone: String,
  pub user_type: String,
  pub info: String,
  pub comment: String,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}
