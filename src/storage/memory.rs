use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::error::StorageError;
use super::seed::{CatalogSeed, CollectionSeed, DataObjectSeed, UserSeed};
use super::session::{SessionFactory, StorageSession};
use super::types::*;
use crate::auth::Credentials;

const ADMIN_USER: &str = "rods";
const FIRST_ID: i64 = 10000;

struct UserRecord {
  user: User,
  password: String,
}

struct DataObject {
  id: i64,
  name: String,
  parent_path: String,
  owner_name: String,
  owner_zone: String,
  size: u64,
  created_at: chrono::DateTime<Utc>,
  modified_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct CatalogState {
  users: BTreeMap<String, UserRecord>,
  collections: BTreeMap<String, Collection>,
  data_objects: BTreeMap<String, DataObject>,
  next_id: i64,
}

impl CatalogState {
  fn allocate_id(&mut self) -> i64 {
    let id = self.next_id;
    self.next_id += 1;
    id
  }
}

struct CatalogInner {
  zone: String,
  page_size: usize,
  state: RwLock<CatalogState>,
  open_sessions: AtomicUsize,
  sessions_opened: AtomicUsize,
}

/// Single-zone catalog held in memory.
///
/// Serves as the storage backend for local runs and end-to-end tests. Clones
/// share the same state.
#[derive(Clone)]
pub struct MemoryCatalog {
  inner: Arc<CatalogInner>,
}

impl MemoryCatalog {
  /// Empty catalog containing only `/` and `/{zone}`
  pub fn new(zone: impl Into<String>, page_size: usize) -> Self {
    let zone = zone.into();
    let catalog = Self {
      inner: Arc::new(CatalogInner {
        zone: zone.clone(),
        page_size: page_size.max(1),
        state: RwLock::new(CatalogState {
          next_id: FIRST_ID,
          ..Default::default()
        }),
        open_sessions: AtomicUsize::new(0),
        sessions_opened: AtomicUsize::new(0),
      }),
    };

    {
      let mut state = catalog.inner.state.write();
      let root = CollectionSeed::new("/", ADMIN_USER);
      insert_collection(&mut state, &zone, &root);
      let zone_root = CollectionSeed::new(format!("/{}", zone), ADMIN_USER);
      insert_collection(&mut state, &zone, &zone_root);
    }

    catalog
  }

  pub fn from_seed(
    zone: impl Into<String>,
    page_size: usize,
    seed: &CatalogSeed,
  ) -> Result<Self, StorageError> {
    let catalog = Self::new(zone, page_size);
    for user in &seed.users {
      catalog.add_user(user);
    }
    for collection in &seed.collections {
      catalog.add_collection(collection)?;
    }
    for object in &seed.data_objects {
      catalog.add_data_object(object)?;
    }
    tracing::info!(
      "catalog seeded: {} users, {} collections, {} data objects",
      seed.users.len(),
      seed.collections.len(),
      seed.data_objects.len()
    );
    Ok(catalog)
  }

  pub fn zone(&self) -> &str {
    &self.inner.zone
  }

  pub fn page_size(&self) -> usize {
    self.inner.page_size
  }

  /// Sessions opened and not yet closed
  pub fn open_sessions(&self) -> usize {
    self.inner.open_sessions.load(Ordering::SeqCst)
  }

  /// Sessions opened since creation
  pub fn sessions_opened(&self) -> usize {
    self.inner.sessions_opened.load(Ordering::SeqCst)
  }

  /// Add or replace a user
  pub fn add_user(&self, seed: &UserSeed) -> User {
    let mut state = self.inner.state.write();
    let now = Utc::now();
    let id = match state.users.get(&seed.name) {
      Some(existing) => existing.user.id,
      None => state.allocate_id(),
    };
    let user = User {
      id,
      name: seed.name.clone(),
      zone: self.inner.zone.clone(),
      user_type: seed.user_type.clone(),
      info: seed.info.clone(),
      comment: seed.comment.clone(),
      created_at: now,
      modified_at: now,
    };
    state.users.insert(
      seed.name.clone(),
      UserRecord {
        user: user.clone(),
        password: seed.password.clone(),
      },
    );
    user
  }

  /// Add a collection, creating missing ancestors with the same owner
  pub fn add_collection(&self, seed: &CollectionSeed) -> Result<Collection, StorageError> {
    check_absolute(&seed.path)?;
    let mut state = self.inner.state.write();
    if state.data_objects.contains_key(&seed.path) {
      return Err(StorageError::InvalidArgument(format!(
        "a data object already exists at {}",
        seed.path
      )));
    }
    ensure_ancestors(&mut state, &self.inner.zone, &seed.path, &seed.owner)?;
    Ok(insert_collection(&mut state, &self.inner.zone, seed))
  }

  /// Add a data object, creating missing parent collections
  pub fn add_data_object(&self, seed: &DataObjectSeed) -> Result<(), StorageError> {
    check_absolute(&seed.path)?;
    if seed.path == "/" {
      return Err(StorageError::InvalidArgument(
        "the root cannot be a data object".into(),
      ));
    }
    let mut state = self.inner.state.write();
    if state.collections.contains_key(&seed.path) {
      return Err(StorageError::InvalidArgument(format!(
        "a collection already exists at {}",
        seed.path
      )));
    }
    ensure_ancestors(&mut state, &self.inner.zone, &seed.path, &seed.owner)?;

    let now = Utc::now();
    let created_at = seed.created_at.unwrap_or(now);
    let id = state.allocate_id();
    state.data_objects.insert(
      seed.path.clone(),
      DataObject {
        id,
        name: leaf_of(&seed.path).to_string(),
        parent_path: parent_of(&seed.path).to_string(),
        owner_name: seed.owner.clone(),
        owner_zone: self.inner.zone.clone(),
        size: seed.size,
        created_at,
        modified_at: seed.modified_at.unwrap_or(created_at),
      },
    );
    Ok(())
  }

  fn authenticate(&self, credentials: &Credentials) -> Result<(), StorageError> {
    if credentials.zone != self.inner.zone {
      return Err(StorageError::AuthenticationFailed(format!(
        "unknown zone {}",
        credentials.zone
      )));
    }
    let state = self.inner.state.read();
    match state.users.get(&credentials.user_name) {
      Some(record) if record.password == credentials.password => Ok(()),
      _ => Err(StorageError::AuthenticationFailed(
        "invalid user name or password".into(),
      )),
    }
  }
}

#[async_trait]
impl SessionFactory for MemoryCatalog {
  async fn open(&self, credentials: &Credentials) -> Result<Box<dyn StorageSession>, StorageError> {
    self.authenticate(credentials)?;
    self.inner.sessions_opened.fetch_add(1, Ordering::SeqCst);
    self.inner.open_sessions.fetch_add(1, Ordering::SeqCst);
    Ok(Box::new(MemorySession {
      catalog: self.inner.clone(),
      closed: false,
    }))
  }
}

struct MemorySession {
  catalog: Arc<CatalogInner>,
  closed: bool,
}

impl MemorySession {
  fn check_open(&self) -> Result<(), StorageError> {
    if self.closed {
      Err(StorageError::SessionClosed)
    } else {
      Ok(())
    }
  }
}

#[async_trait]
impl StorageSession for MemorySession {
  async fn find_collection(
    &mut self,
    absolute_path: &str,
  ) -> Result<Option<Collection>, StorageError> {
    self.check_open()?;
    Ok(self.catalog.state.read().collections.get(absolute_path).cloned())
  }

  async fn list_children(
    &mut self,
    absolute_path: &str,
    offset: i32,
  ) -> Result<Vec<ListingEntry>, StorageError> {
    self.check_open()?;
    let start = usize::try_from(offset).map_err(|_| {
      StorageError::InvalidArgument(format!("offset must not be negative: {}", offset))
    })?;

    let state = self.catalog.state.read();
    if !state.collections.contains_key(absolute_path) {
      return Err(StorageError::NoSuchCollection(absolute_path.to_string()));
    }

    // Sub-collections first, then data objects, each in lexical order
    let collections = state
      .collections
      .values()
      .filter(|c| c.absolute_path != "/" && c.collection_parent_name == absolute_path);
    let objects = state
      .data_objects
      .values()
      .filter(|o| o.parent_path == absolute_path);

    let total = collections.clone().count() + objects.clone().count();
    let page_size = self.catalog.page_size;
    let is_last_result = start.saturating_add(page_size) >= total;

    let mut entries: Vec<ListingEntry> = collections
      .map(collection_entry)
      .chain(objects.map(data_object_entry))
      .skip(start)
      .take(page_size)
      .collect();

    for (i, entry) in entries.iter_mut().enumerate() {
      entry.count = (start + i) as i64;
      entry.is_last_result = is_last_result;
      entry.total_records = total as i64;
    }

    Ok(entries)
  }

  async fn find_user(&mut self, name: &str) -> Result<Option<User>, StorageError> {
    self.check_open()?;
    Ok(
      self
        .catalog
        .state
        .read()
        .users
        .get(name)
        .map(|record| record.user.clone()),
    )
  }

  fn close(&mut self) -> Result<(), StorageError> {
    self.check_open()?;
    self.closed = true;
    self.catalog.open_sessions.fetch_sub(1, Ordering::SeqCst);
    Ok(())
  }
}

fn collection_entry(collection: &Collection) -> ListingEntry {
  ListingEntry {
    id: collection.collection_id,
    path_or_name: collection.absolute_path.clone(),
    parent_path: collection.collection_parent_name.clone(),
    object_type: ObjectType::Collection,
    owner_name: collection.collection_owner_name.clone(),
    owner_zone: collection.collection_owner_zone.clone(),
    data_size: 0,
    created_at: collection.created_at,
    modified_at: collection.modified_at,
    spec_col_type: collection.spec_col_type,
    special_object_path: collection.object_path.clone(),
    count: 0,
    is_last_result: false,
    total_records: 0,
  }
}

fn data_object_entry(object: &DataObject) -> ListingEntry {
  ListingEntry {
    id: object.id,
    path_or_name: object.name.clone(),
    parent_path: object.parent_path.clone(),
    object_type: ObjectType::DataObject,
    owner_name: object.owner_name.clone(),
    owner_zone: object.owner_zone.clone(),
    data_size: object.size,
    created_at: object.created_at,
    modified_at: object.modified_at,
    spec_col_type: SpecialCollectionType::Normal,
    special_object_path: None,
    count: 0,
    is_last_result: false,
    total_records: 0,
  }
}

fn insert_collection(state: &mut CatalogState, zone: &str, seed: &CollectionSeed) -> Collection {
  let now = Utc::now();
  let created_at = seed.created_at.unwrap_or(now);
  let id = match state.collections.get(&seed.path) {
    Some(existing) => existing.collection_id,
    None => state.allocate_id(),
  };
  let collection = Collection {
    collection_id: id,
    collection_name: leaf_of(&seed.path).to_string(),
    absolute_path: seed.path.clone(),
    collection_parent_name: parent_of(&seed.path).to_string(),
    collection_owner_name: seed.owner.clone(),
    collection_owner_zone: zone.to_string(),
    collection_inheritance: seed.inheritance,
    collection_map_id: "0".into(),
    comments: seed.comments.clone(),
    info1: seed.info1.clone(),
    info2: seed.info2.clone(),
    created_at,
    modified_at: seed.modified_at.unwrap_or(created_at),
    spec_col_type: seed.spec_col_type,
    object_path: seed.object_path.clone(),
  };
  state
    .collections
    .insert(seed.path.clone(), collection.clone());
  collection
}

fn ensure_ancestors(
  state: &mut CatalogState,
  zone: &str,
  path: &str,
  owner: &str,
) -> Result<(), StorageError> {
  let mut missing = Vec::new();
  let mut current = parent_of(path);
  while !current.is_empty() && !state.collections.contains_key(current) {
    if state.data_objects.contains_key(current) {
      return Err(StorageError::InvalidArgument(format!(
        "parent {} is a data object",
        current
      )));
    }
    missing.push(current.to_string());
    current = parent_of(current);
  }
  for ancestor in missing.into_iter().rev() {
    insert_collection(state, zone, &CollectionSeed::new(ancestor, owner));
  }
  Ok(())
}

fn check_absolute(path: &str) -> Result<(), StorageError> {
  let valid = path == "/"
    || (path.starts_with('/') && !path.ends_with('/') && !path.contains("//"));
  if valid {
    Ok(())
  } else {
    Err(StorageError::InvalidArgument(format!(
      "not a canonical absolute path: {}",
      path
    )))
  }
}

/// Parent of a canonical absolute path, empty for the root
fn parent_of(path: &str) -> &str {
  match path.rfind('/') {
    _ if path == "/" => "",
    Some(0) => "/",
    Some(i) => &path[..i],
    None => "",
  }
}

fn leaf_of(path: &str) -> &str {
  if path == "/" {
    return path;
  }
  path.rsplit('/').next().unwrap_or(path)
}
