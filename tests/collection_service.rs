//! Collection handler tests against a scripted backend
//!
//! The fake backend counts session opens and closes so every exit path can be
//! checked for exactly-once release.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use irods_rest::access::StorageAccess;
use irods_rest::auth::{BasicAuthResolver, Credentials};
use irods_rest::collection::CollectionService;
use irods_rest::error::ErrorCode;
use irods_rest::server::IrodsSection;
use irods_rest::storage::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Script {
  fail_open: Option<StorageError>,
  collection: Option<Collection>,
  fail_find: Option<StorageError>,
  children: Vec<ListingEntry>,
  fail_list: Option<StorageError>,
  panic_on_list: bool,
  fail_close: bool,

  opened: AtomicUsize,
  closed: AtomicUsize,
  found_paths: Mutex<Vec<String>>,
  listed: Mutex<Vec<(String, i32)>>,
  credentials: Mutex<Vec<Credentials>>,
}

#[derive(Clone)]
struct FakeBackend(Arc<Script>);

impl FakeBackend {
  fn new(script: Script) -> Self {
    Self(Arc::new(script))
  }

  fn opened(&self) -> usize {
    self.0.opened.load(Ordering::SeqCst)
  }

  fn closed(&self) -> usize {
    self.0.closed.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl SessionFactory for FakeBackend {
  async fn open(&self, credentials: &Credentials) -> Result<Box<dyn StorageSession>, StorageError> {
    self.0.credentials.lock().push(credentials.clone());
    if let Some(e) = &self.0.fail_open {
      return Err(e.clone());
    }
    self.0.opened.fetch_add(1, Ordering::SeqCst);
    Ok(Box::new(FakeSession(self.0.clone())))
  }
}

struct FakeSession(Arc<Script>);

#[async_trait]
impl StorageSession for FakeSession {
  async fn find_collection(
    &mut self,
    absolute_path: &str,
  ) -> Result<Option<Collection>, StorageError> {
    self.0.found_paths.lock().push(absolute_path.to_string());
    match &self.0.fail_find {
      Some(e) => Err(e.clone()),
      None => Ok(self.0.collection.clone()),
    }
  }

  async fn list_children(
    &mut self,
    absolute_path: &str,
    offset: i32,
  ) -> Result<Vec<ListingEntry>, StorageError> {
    self
      .0
      .listed
      .lock()
      .push((absolute_path.to_string(), offset));
    if self.0.panic_on_list {
      panic!("backend exploded");
    }
    match &self.0.fail_list {
      Some(e) => Err(e.clone()),
      None => Ok(self.0.children.clone()),
    }
  }

  async fn find_user(&mut self, _name: &str) -> Result<Option<User>, StorageError> {
    Ok(None)
  }

  fn close(&mut self) -> Result<(), StorageError> {
    self.0.closed.fetch_add(1, Ordering::SeqCst);
    if self.0.fail_close {
      Err(StorageError::Unavailable("connection reset during close".into()))
    } else {
      Ok(())
    }
  }
}

fn basic(user: &str, password: &str) -> String {
  format!(
    "Basic {}",
    base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, password))
  )
}

fn service(backend: &FakeBackend) -> CollectionService {
  let resolver = Arc::new(BasicAuthResolver::new(&IrodsSection::default()));
  CollectionService::new(StorageAccess::new(resolver, Arc::new(backend.clone())))
}

fn test1_collection() -> Collection {
  Collection {
    collection_id: 10010,
    collection_name: "test1".into(),
    absolute_path: "/tempZone/home/test1".into(),
    collection_parent_name: "/tempZone/home".into(),
    collection_owner_name: "test1".into(),
    collection_owner_zone: "tempZone".into(),
    collection_inheritance: false,
    collection_map_id: "0".into(),
    comments: "".into(),
    info1: "".into(),
    info2: "".into(),
    created_at: Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
    modified_at: Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap(),
    spec_col_type: SpecialCollectionType::Normal,
    object_path: None,
  }
}

fn entry(name: &str, count: i64) -> ListingEntry {
  ListingEntry {
    id: 20000 + count,
    path_or_name: name.into(),
    parent_path: "/tempZone/home/test1".into(),
    object_type: ObjectType::DataObject,
    owner_name: "test1".into(),
    owner_zone: "tempZone".into(),
    data_size: 100,
    created_at: Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
    modified_at: Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(),
    spec_col_type: SpecialCollectionType::Normal,
    special_object_path: None,
    count,
    is_last_result: false,
    total_records: 50,
  }
}

fn found_script() -> Script {
  Script {
    collection: Some(test1_collection()),
    ..Default::default()
  }
}

// =============================================================================
// Input Validation Tests
// =============================================================================

#[tokio::test]
async fn test_missing_authorization_never_opens_session() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);

  for auth in [None, Some("")] {
    let err = service
      .get_collection(auth, Some("tempZone/home/test1"), 0, false)
      .await
      .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert!(err.message.contains("authorization"));
  }

  assert_eq!(backend.opened(), 0);
  assert!(backend.0.credentials.lock().is_empty());
}

#[tokio::test]
async fn test_missing_path_never_opens_session() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "test");

  for path in [None, Some("")] {
    let err = service
      .get_collection(Some(&auth), path, 0, true)
      .await
      .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRequest);
    assert!(err.message.contains("path"));
  }

  assert_eq!(backend.opened(), 0);
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_authorization_fails_before_session() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);

  let err = service
    .get_collection(Some("Bearer abc"), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::AuthenticationFailed);
  assert_eq!(err.challenge.as_deref(), Some("irods-rest"));
  assert_eq!(backend.opened(), 0);
  assert_eq!(backend.closed(), 0);
}

#[tokio::test]
async fn test_rejected_login_reports_authentication_failure() {
  let backend = FakeBackend::new(Script {
    fail_open: Some(StorageError::AuthenticationFailed("bad password".into())),
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "wrong");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::AuthenticationFailed);
  assert_eq!(err.challenge.as_deref(), Some("irods-rest"));
  assert_eq!(backend.opened(), 0);
  assert_eq!(backend.closed(), 0);
}

#[tokio::test]
async fn test_credentials_combine_header_and_config() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "s3cr:et");

  service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap();

  let seen = backend.0.credentials.lock();
  assert_eq!(seen.len(), 1);
  assert_eq!(seen[0].user_name, "test1");
  assert_eq!(seen[0].password, "s3cr:et");
  assert_eq!(seen[0].host, "localhost");
  assert_eq!(seen[0].port, 1247);
  assert_eq!(seen[0].zone, "tempZone");
  assert_eq!(seen[0].default_resource, "demoResc");
  assert!(!format!("{:?}", seen[0]).contains("s3cr:et"));
}

// =============================================================================
// Session Release Tests
// =============================================================================

#[tokio::test]
async fn test_success_releases_session_once() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "test");

  service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, true)
    .await
    .unwrap();

  assert_eq!(backend.opened(), 1);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_not_found_still_releases_session() {
  let backend = FakeBackend::new(Script::default());
  let service = service(&backend);
  let auth = basic("test1", "test");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/nobody"), 0, true)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::NotFound);
  assert_eq!(err.resource.as_deref(), Some("/tempZone/home/nobody"));
  assert_eq!(backend.opened(), 1);
  assert_eq!(backend.closed(), 1);
  assert!(backend.0.listed.lock().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_releases_session() {
  let backend = FakeBackend::new(Script {
    fail_find: Some(StorageError::Unavailable("catalog down".into())),
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::BackendUnavailable);
  assert_eq!(backend.opened(), 1);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_listing_failure_releases_session() {
  let backend = FakeBackend::new(Script {
    fail_list: Some(StorageError::Timeout(Duration::from_secs(30))),
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, true)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::BackendUnavailable);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_internal_failure_is_storage_error() {
  let backend = FakeBackend::new(Script {
    fail_list: Some(StorageError::Internal("query engine crashed".into())),
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, true)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::StorageError);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_panic_still_releases_session() {
  let backend = FakeBackend::new(Script {
    panic_on_list: true,
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let join = tokio::spawn(async move {
    service
      .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, true)
      .await
  })
  .await;

  assert!(join.unwrap_err().is_panic());
  assert_eq!(backend.opened(), 1);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_close_error_does_not_fail_success() {
  let backend = FakeBackend::new(Script {
    fail_close: true,
    children: vec![entry("a.txt", 0)],
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let data = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, true)
    .await
    .unwrap();

  assert_eq!(data.children.len(), 1);
  assert_eq!(backend.closed(), 1);
}

#[tokio::test]
async fn test_close_error_does_not_mask_not_found() {
  let backend = FakeBackend::new(Script {
    fail_close: true,
    ..Default::default()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let err = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap_err();

  assert_eq!(err.code, ErrorCode::NotFound);
  assert_eq!(backend.closed(), 1);
}

// =============================================================================
// Path and Listing Tests
// =============================================================================

#[tokio::test]
async fn test_path_resolved_with_single_leading_separator() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "test");

  for path in ["a/b", "/a/b", "a/b/"] {
    service
      .get_collection(Some(&auth), Some(path), 0, false)
      .await
      .unwrap();
  }

  assert_eq!(*backend.0.found_paths.lock(), vec!["/a/b", "/a/b", "/a/b"]);
}

#[tokio::test]
async fn test_no_listing_unless_requested() {
  let backend = FakeBackend::new(Script {
    children: vec![entry("a.txt", 0)],
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let data = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap();

  assert!(data.children.is_empty());
  assert!(backend.0.listed.lock().is_empty());
}

#[tokio::test]
async fn test_listing_preserves_backend_order() {
  let backend = FakeBackend::new(Script {
    children: vec![entry("zeta", 7), entry("alpha", 8), entry("mid", 9)],
    ..found_script()
  });
  let service = service(&backend);
  let auth = basic("test1", "test");

  let data = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 7, true)
    .await
    .unwrap();

  let names: Vec<_> = data.children.iter().map(|c| c.path_or_name.as_str()).collect();
  assert_eq!(names, vec!["zeta", "alpha", "mid"]);
  let counts: Vec<_> = data.children.iter().map(|c| c.count).collect();
  assert_eq!(counts, vec![7, 8, 9]);
  assert!(data.children.iter().all(|c| c.total_records == 50));
}

#[tokio::test]
async fn test_listing_uses_collection_path_and_offset() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "test");

  service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 10, true)
    .await
    .unwrap();
  service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), -5, true)
    .await
    .unwrap();

  assert_eq!(
    *backend.0.listed.lock(),
    vec![
      ("/tempZone/home/test1".to_string(), 10),
      ("/tempZone/home/test1".to_string(), -5)
    ]
  );
}

#[tokio::test]
async fn test_collection_fields_copied() {
  let backend = FakeBackend::new(found_script());
  let service = service(&backend);
  let auth = basic("test1", "test");

  let data = service
    .get_collection(Some(&auth), Some("tempZone/home/test1"), 0, false)
    .await
    .unwrap();

  let expected = test1_collection();
  assert_eq!(data.collection_id, expected.collection_id);
  assert_eq!(data.collection_name, "test1");
  assert_eq!(data.absolute_path, expected.absolute_path);
  assert_eq!(data.collection_parent_name, expected.collection_parent_name);
  assert_eq!(data.created_at, expected.created_at);
  assert_eq!(data.modified_at, expected.modified_at);
  assert_eq!(data.spec_col_type, SpecialCollectionType::Normal);
  assert!(data.object_path.is_none());
}
