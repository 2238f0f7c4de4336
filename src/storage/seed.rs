use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::SpecialCollectionType;

/// Initial catalog contents, usually read from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
  #[serde(default)]
  pub users: Vec<UserSeed>,
  #[serde(default)]
  pub collections: Vec<CollectionSeed>,
  #[serde(default)]
  pub data_objects: Vec<DataObjectSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSeed {
  pub name: String,
  pub password: String,
  #[serde(default = "default_user_type")]
  pub user_type: String,
  #[serde(default)]
  pub info: String,
  #[serde(default)]
  pub comment: String,
}

fn default_user_type() -> String {
  "rodsuser".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionSeed {
  pub path: String,
  pub owner: String,
  #[serde(default)]
  pub inheritance: bool,
  #[serde(default)]
  pub comments: String,
  #[serde(default)]
  pub info1: String,
  #[serde(default)]
  pub info2: String,
  #[serde(default)]
  pub spec_col_type: SpecialCollectionType,
  #[serde(default)]
  pub object_path: Option<String>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub modified_at: Option<DateTime<Utc>>,
}

impl CollectionSeed {
  pub fn new(path: impl Into<String>, owner: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      owner: owner.into(),
      ..Default::default()
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataObjectSeed {
  pub path: String,
  pub owner: String,
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub modified_at: Option<DateTime<Utc>>,
}

impl DataObjectSeed {
  pub fn new(path: impl Into<String>, owner: impl Into<String>, size: u64) -> Self {
    Self {
      path: path.into(),
      owner: owner.into(),
      size,
      ..Default::default()
    }
  }
}

impl CatalogSeed {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_yaml::from_str(&content)?)
  }
}
