use chrono::Duration as TtlDuration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Fatal configuration problems. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error(
    "No configuration file found. Create one at ~/.config/gorgias-cli/config.yaml\n\
     See the README for the format."
  )]
  NotFound,

  #[error("Config file not found: {}", .0.display())]
  MissingFile(PathBuf),

  #[error("Failed to read config file {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("Missing required config field `{0}`")]
  MissingField(&'static str),

  #[error(
    "cache.default_ttl_secs must be between 1 and {max}, got {0}",
    max = MAX_DEFAULT_TTL_SECS
  )]
  InvalidTtl(i64),

  #[error("Invalid base_url {url}: {source}")]
  InvalidBaseUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub gorgias: GorgiasConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GorgiasConfig {
  /// Account subdomain, as in `{domain}.gorgias.com`
  #[serde(default)]
  pub domain: String,
  #[serde(default)]
  pub email: String,
  /// Falls back to the GORGIAS_API_KEY environment variable when empty
  #[serde(default)]
  pub api_key: String,
  /// Override for the API root (defaults to https://{domain}.gorgias.com/api)
  pub base_url: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

/// Upper bound for `cache.default_ttl_secs` (one week)
pub const MAX_DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub namespace: String,
  /// TTL for entries stored without an explicit lifetime. The built-in
  /// operations all pass their own TTL, so this only covers other callers.
  pub default_ttl_secs: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      namespace: "gorgias".to_string(),
      default_ttl_secs: 300,
    }
  }
}

impl CacheConfig {
  pub fn default_ttl(&self) -> TtlDuration {
    TtlDuration::seconds(self.default_ttl_secs)
  }
}

impl GorgiasConfig {
  pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
    match &self.base_url {
      Some(url) => Url::parse(url),
      None => Url::parse(&format!("https://{}.gorgias.com/api", self.domain)),
    }
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./gorgias.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/gorgias-cli/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = match explicit_path {
      Some(p) if p.exists() => p.to_path_buf(),
      Some(p) => return Err(ConfigError::MissingFile(p.to_path_buf())),
      None => Self::find_config_file().ok_or(ConfigError::NotFound)?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
      path: path.clone(),
      source,
    })?;

    Self::from_yaml(&contents, |name| std::env::var(name).ok())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("gorgias.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("gorgias-cli").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  /// Parse and validate config text. `env` looks up environment variables.
  pub fn from_yaml<E>(contents: &str, env: E) -> Result<Self, ConfigError>
  where
    E: Fn(&str) -> Option<String>,
  {
    let mut config: Config = serde_yaml::from_str(contents)?;

    if config.gorgias.api_key.trim().is_empty() {
      config.gorgias.api_key = env("GORGIAS_API_KEY").unwrap_or_default();
    }

    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    let gorgias = &self.gorgias;

    if gorgias.domain.trim().is_empty() && gorgias.base_url.is_none() {
      return Err(ConfigError::MissingField("domain"));
    }
    if gorgias.email.trim().is_empty() {
      return Err(ConfigError::MissingField("email"));
    }
    if gorgias.api_key.trim().is_empty() {
      return Err(ConfigError::MissingField("api_key"));
    }

    let ttl = self.cache.default_ttl_secs;
    if !(1..=MAX_DEFAULT_TTL_SECS).contains(&ttl) {
      return Err(ConfigError::InvalidTtl(ttl));
    }

    gorgias
      .api_base_url()
      .map_err(|source| ConfigError::InvalidBaseUrl {
        url: gorgias.base_url.clone().unwrap_or_default(),
        source,
      })?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn no_env(_: &str) -> Option<String> {
    None
  }

  #[test]
  fn test_full_config() {
    let config = Config::from_yaml(
      r#"
gorgias:
  domain: acme
  email: agent@acme.com
  api_key: secret
  timeout_secs: 10
cache:
  enabled: false
  namespace: acme
  default_ttl_secs: 60
"#,
      no_env,
    )
    .unwrap();

    assert_eq!(
      config.gorgias.api_base_url().unwrap().as_str(),
      "https://acme.gorgias.com/api"
    );
    assert_eq!(config.gorgias.timeout(), Duration::from_secs(10));
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.namespace, "acme");
    assert_eq!(config.cache.default_ttl(), TtlDuration::minutes(1));
  }

  #[test]
  fn test_defaults() {
    let config = Config::from_yaml(
      "gorgias:\n  domain: acme\n  email: a@acme.com\n  api_key: k\n",
      no_env,
    )
    .unwrap();

    assert_eq!(config.gorgias.timeout_secs, 30);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.namespace, "gorgias");
    assert_eq!(config.cache.default_ttl(), TtlDuration::minutes(5));
  }

  #[test]
  fn test_api_key_from_env() {
    let config = Config::from_yaml("gorgias:\n  domain: acme\n  email: a@acme.com\n", |name| {
      (name == "GORGIAS_API_KEY").then(|| "from-env".to_string())
    })
    .unwrap();
    assert_eq!(config.gorgias.api_key, "from-env");
  }

  #[test]
  fn test_missing_fields() {
    let err = Config::from_yaml("gorgias:\n  domain: acme\n  email: a@acme.com\n", no_env)
      .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("api_key")));

    let err =
      Config::from_yaml("gorgias:\n  domain: acme\n  api_key: k\n", no_env).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("email")));

    let err =
      Config::from_yaml("gorgias:\n  email: a@acme.com\n  api_key: k\n", no_env).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("domain")));
  }

  #[test]
  fn test_missing_section_is_parse_error() {
    let err = Config::from_yaml("cache:\n  enabled: true\n", no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn test_base_url_override() {
    let config = Config::from_yaml(
      "gorgias:\n  email: a@acme.com\n  api_key: k\n  base_url: http://localhost:8080/api\n",
      no_env,
    )
    .unwrap();
    assert_eq!(
      config.gorgias.api_base_url().unwrap().as_str(),
      "http://localhost:8080/api"
    );

    let err = Config::from_yaml(
      "gorgias:\n  email: a@acme.com\n  api_key: k\n  base_url: not a url\n",
      no_env,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
  }

  #[test]
  fn test_default_ttl_out_of_range() {
    let base = "gorgias:\n  domain: acme\n  email: a@acme.com\n  api_key: k\n";
    for ttl in ["0", "-5", "9223372036854775807"] {
      let yaml = format!("{base}cache:\n  default_ttl_secs: {ttl}\n");
      let err = Config::from_yaml(&yaml, no_env).unwrap_err();
      assert!(matches!(err, ConfigError::InvalidTtl(_)), "ttl {ttl}: {err}");
    }

    let yaml = format!("{base}cache:\n  default_ttl_secs: {MAX_DEFAULT_TTL_SECS}\n");
    let config = Config::from_yaml(&yaml, no_env).unwrap();
    assert_eq!(config.cache.default_ttl(), TtlDuration::weeks(1));
  }

  #[test]
  fn test_explicit_missing_path() {
    let err = Config::load(Some(Path::new("/nonexistent/gorgias.yaml"))).unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile(_)));
  }
}
