use base64::Engine as _;

use super::{AuthError, CredentialResolver, Credentials};
use crate::server::IrodsSection;

/// Resolves HTTP Basic credentials against a fixed grid endpoint.
///
/// The header supplies user and password; host, port, zone and default
/// resource come from configuration.
#[derive(Debug, Clone)]
pub struct BasicAuthResolver {
  host: String,
  port: u16,
  zone: String,
  default_resource: String,
  realm: String,
}

impl BasicAuthResolver {
  pub fn new(section: &IrodsSection) -> Self {
    Self {
      host: section.host.clone(),
      port: section.port,
      zone: section.zone.clone(),
      default_resource: section.default_resource.clone(),
      realm: section.realm.clone(),
    }
  }
}

impl CredentialResolver for BasicAuthResolver {
  fn resolve(&self, authorization: &str) -> Result<Credentials, AuthError> {
    let (user_name, password) = parse_basic(authorization)?;
    Ok(Credentials {
      host: self.host.clone(),
      port: self.port,
      zone: self.zone.clone(),
      user_name,
      password,
      default_resource: self.default_resource.clone(),
    })
  }

  fn realm(&self) -> &str {
    &self.realm
  }
}

/// Split a `Basic <base64(user:password)>` header into its parts
fn parse_basic(header: &str) -> Result<(String, String), AuthError> {
  let header = header.trim();
  if header.is_empty() {
    return Err(AuthError::Empty);
  }

  let (scheme, encoded) = header
    .split_once(' ')
    .ok_or_else(|| AuthError::UnsupportedScheme(header.to_string()))?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return Err(AuthError::UnsupportedScheme(scheme.to_string()));
  }

  let decoded = base64::engine::general_purpose::STANDARD
    .decode(encoded.trim())
    .map_err(|_| AuthError::InvalidEncoding)?;
  let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidUtf8)?;

  // Passwords may contain ':', user names may not
  let (user, password) = decoded
    .split_once(':')
    .ok_or(AuthError::MissingSeparator)?;
  if user.is_empty() {
    return Err(AuthError::EmptyUserName);
  }

  Ok((user.to_string(), password.to_string()))
}
