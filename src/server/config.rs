use serde::{Deserialize, Serialize};
use std::path::Path;

/// Expand environment variables in a string.
/// Supports $VAR_NAME and ${VAR_NAME} syntax; unset variables expand to "".
fn expand_env_vars(input: &str) -> String {
  let mut result = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(pos) = rest.find('$') {
    result.push_str(&rest[..pos]);
    let after = &rest[pos + 1..];

    if let Some(braced) = after.strip_prefix('{') {
      match braced.find('}') {
        Some(end) => {
          result.push_str(&env_value(&braced[..end]));
          rest = &braced[end + 1..];
        }
        None => {
          // Unterminated, kept verbatim
          result.push_str("${");
          rest = braced;
        }
      }
      continue;
    }

    let name_len = after
      .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
      .unwrap_or(after.len());
    if name_len == 0 {
      result.push('$');
    } else {
      result.push_str(&env_value(&after[..name_len]));
    }
    rest = &after[name_len..];
  }

  result.push_str(rest);
  result
}

fn env_value(name: &str) -> String {
  std::env::var(name).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub irods: IrodsSection,
  #[serde(default)]
  pub catalog: CatalogSection,
  #[serde(default)]
  pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// CORS allowed origins.
  /// Use ["*"] for permissive mode, or list origins like ["http://localhost:3000"]
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
}

fn default_host() -> String {
  "0.0.0.0".into()
}
fn default_port() -> u16 {
  8080
}
fn default_cors_origins() -> Vec<String> {
  vec!["*".to_string()]
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      cors_origins: default_cors_origins(),
    }
  }
}

/// Grid endpoint that header credentials are bound to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrodsSection {
  #[serde(default = "default_irods_host")]
  pub host: String,
  #[serde(default = "default_irods_port")]
  pub port: u16,
  #[serde(default = "default_zone")]
  pub zone: String,
  #[serde(default = "default_resource")]
  pub default_resource: String,
  /// Realm sent in `WWW-Authenticate` challenges
  #[serde(default = "default_realm")]
  pub realm: String,
}

fn default_irods_host() -> String {
  "localhost".into()
}
fn default_irods_port() -> u16 {
  1247
}
fn default_zone() -> String {
  "tempZone".into()
}
fn default_resource() -> String {
  "demoResc".into()
}
fn default_realm() -> String {
  "irods-rest".into()
}

impl Default for IrodsSection {
  fn default() -> Self {
    Self {
      host: default_irods_host(),
      port: default_irods_port(),
      zone: default_zone(),
      default_resource: default_resource(),
      realm: default_realm(),
    }
  }
}

/// In-memory catalog backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
  /// YAML seed file; an empty catalog is served when unset
  #[serde(default)]
  pub seed_path: Option<String>,
  /// Maximum entries returned by one listing call
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

fn default_page_size() -> usize {
  5000
}

impl Default for CatalogSection {
  fn default() -> Self {
    Self {
      seed_path: None,
      page_size: default_page_size(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
  #[serde(default = "default_level")]
  pub level: String,
}
fn default_level() -> String {
  "info".into()
}
impl Default for LoggingSection {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

impl ServerConfig {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
    let content = std::fs::read_to_string(&path)?;
    Self::from_yaml(&content)
  }

  pub fn from_yaml(content: &str) -> Result<Self, anyhow::Error> {
    let expanded = expand_env_vars(content);
    Ok(serde_yaml::from_str(&expanded)?)
  }

  pub fn find_and_load() -> Result<Option<Self>, anyhow::Error> {
    for p in ["irods-rest.yaml", "irods-rest.yml"] {
      if Path::new(p).exists() {
        tracing::info!("Loading config from {}", p);
        return Ok(Some(Self::from_file(p)?));
      }
    }
    Ok(None)
  }

  pub fn address(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }
}
