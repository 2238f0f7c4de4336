mod routes;

pub use routes::{get_user, put_user};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{require, StorageAccess};
use crate::error::{ErrorCode, ServiceError};
use crate::storage::User;
use crate::wire::{escape_xml, XML_NAMESPACE};

/// Wire representation of a catalog user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
  pub id: i64,
  pub name: String,
  pub zone: String,
  pub user_type: String,
  pub info: String,
  pub comment: String,
  pub created_at: DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

impl From<User> for UserData {
  fn from(user: User) -> Self {
    let User {
      id,
      name,
      zone,
      user_type,
      info,
      comment,
      created_at,
      modified_at,
    } = user;

    Self {
      id,
      name,
      zone,
      user_type,
      info,
      comment,
      created_at,
      modified_at,
    }
  }
}

impl UserData {
  pub fn to_xml(&self) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<user xmlns=\"{}\">\n", XML_NAMESPACE));
    xml.push_str(&format!("  <id>{}</id>\n", self.id));
    xml.push_str(&format!("  <name>{}</name>\n", escape_xml(&self.name)));
    xml.push_str(&format!("  <zone>{}</zone>\n", escape_xml(&self.zone)));
    xml.push_str(&format!(
      "  <userType>{}</userType>\n",
      escape_xml(&self.user_type)
    ));
    xml.push_str(&format!("  <info>{}</info>\n", escape_xml(&self.info)));
    xml.push_str(&format!(
      "  <comment>{}</comment>\n",
      escape_xml(&self.comment)
    ));
    xml.push_str(&format!(
      "  <createdAt>{}</createdAt>\n",
      self.created_at.to_rfc3339()
    ));
    xml.push_str(&format!(
      "  <modifiedAt>{}</modifiedAt>\n",
      self.modified_at.to_rfc3339()
    ));
    xml.push_str("</user>");
    xml
  }
}

/// User lookups, run under the caller's own credentials
#[derive(Clone)]
pub struct UserService {
  access: StorageAccess,
}

impl UserService {
  pub fn new(access: StorageAccess) -> Self {
    Self { access }
  }

  pub async fn find_user(
    &self,
    authorization: Option<&str>,
    name: Option<&str>,
  ) -> Result<UserData, ServiceError> {
    tracing::info!("find_user(name={:?})", name);

    let authorization = require(authorization, "authorization")?;
    let name = require(name, "userName")?;

    let credentials = self.access.resolve(authorization)?;
    let mut session = self.access.open_session(&credentials).await?;

    tracing::info!("looking up user with name: {}", name);
    let user = session
      .find_user(name)
      .await
      .map_err(|e| self.access.reject(e.into()))?
      .ok_or_else(|| {
        ServiceError::new(ErrorCode::NotFound, format!("No user named {}", name)).with_resource(name)
      })?;

    Ok(UserData::from(user))
  }
}
