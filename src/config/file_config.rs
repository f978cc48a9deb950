use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub output_dir: Option<String>,
    pub page_limit: Option<usize>,
    pub feature_batch_size: Option<usize>,
    pub request_timeout_sec: Option<u64>,
    pub artist_lookup_workers: Option<usize>,
    pub token_cache_path: Option<String>,
    pub api_base_url: Option<String>,
    pub accounts_base_url: Option<String>,

    pub credentials: Option<CredentialsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CredentialsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub redirect_uri: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
output_dir = "/data/exports"
page_limit = 20
feature_batch_size = 100
request_timeout_sec = 10
artist_lookup_workers = 8
token_cache_path = "/tmp/.cache-me"

[credentials]
client_id = "cid"
client_secret = "secret"
username = "me"
redirect_uri = "http://localhost:8888/callback"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("/data/exports"));
        assert_eq!(config.page_limit, Some(20));
        assert_eq!(config.feature_batch_size, Some(100));
        assert_eq!(config.request_timeout_sec, Some(10));
        assert_eq!(config.artist_lookup_workers, Some(8));
        assert!(config.api_base_url.is_none());

        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.client_id.as_deref(), Some("cid"));
        assert_eq!(credentials.username.as_deref(), Some("me"));
    }

    #[test]
    fn test_load_empty_config() {
        let file = NamedTempFile::new().unwrap();
        let config = FileConfig::load(file.path()).unwrap();
        assert!(config.output_dir.is_none());
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "page_limit = \"fifty\"").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
