//! Field mapping between catalog domain types and their wire representations.
//!
//! `source` names the serialized field of the domain type, `target` the
//! serialized field of the representation. The XML writer emits elements in
//! table order.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
  pub source: &'static str,
  pub target: &'static str,
}

const fn map(source: &'static str, target: &'static str) -> FieldMapping {
  FieldMapping { source, target }
}

/// `Collection` -> `CollectionData`
pub const COLLECTION_FIELDS: &[FieldMapping] = &[
  map("collection_id", "collectionId"),
  map("collection_name", "collectionName"),
  map("absolute_path", "absolutePath"),
  map("collection_parent_name", "collectionParentName"),
  map("collection_owner_name", "collectionOwnerName"),
  map("collection_owner_zone", "collectionOwnerZone"),
  map("collection_inheritance", "collectionInheritance"),
  map("collection_map_id", "collectionMapId"),
  map("comments", "comments"),
  map("info1", "info1"),
  map("info2", "info2"),
  map("created_at", "createdAt"),
  map("modified_at", "modifiedAt"),
  map("spec_col_type", "specColType"),
  map("object_path", "objectPath"),
];

/// `ListingEntry` -> `FileListingEntry`
pub const LISTING_ENTRY_FIELDS: &[FieldMapping] = &[
  map("id", "id"),
  map("path_or_name", "pathOrName"),
  map("parent_path", "parentPath"),
  map("object_type", "objectType"),
  map("owner_name", "ownerName"),
  map("owner_zone", "ownerZone"),
  map("data_size", "dataSize"),
  map("created_at", "createdAt"),
  map("modified_at", "modifiedAt"),
  map("spec_col_type", "specColType"),
  map("special_object_path", "specialObjectPath"),
  map("count", "count"),
  map("is_last_result", "lastResult"),
  map("total_records", "totalRecords"),
];
