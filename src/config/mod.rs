mod file_config;

pub use file_config::{CredentialsConfig, FileConfig};

use crate::features::MAX_FEATURE_BATCH;
use crate::library::MAX_PAGE_LIMIT;
use crate::oauth::{Credentials, SPOTIFY_ACCOUNTS_BASE};
use crate::pipeline::PipelineSettings;
use crate::spotify::SPOTIFY_API_BASE;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const DEFAULT_FEATURE_BATCH_SIZE: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_ARTIST_LOOKUP_WORKERS: usize = 4;
/// Upper bound on concurrent artist lookups against the rate-limited API.
pub const MAX_ARTIST_LOOKUP_WORKERS: usize = 16;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub redirect_uri: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub page_limit: usize,
    pub feature_batch_size: usize,
    pub request_timeout_sec: u64,
    pub artist_lookup_workers: usize,
    pub token_cache_path: Option<PathBuf>,
    pub api_base_url: String,
    pub accounts_base_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            redirect_uri: None,
            output_dir: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            feature_batch_size: DEFAULT_FEATURE_BATCH_SIZE,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            artist_lookup_workers: DEFAULT_ARTIST_LOOKUP_WORKERS,
            token_cache_path: None,
            api_base_url: SPOTIFY_API_BASE.to_string(),
            accounts_base_url: SPOTIFY_ACCOUNTS_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub output_dir: PathBuf,
    pub page_limit: usize,
    pub feature_batch_size: usize,
    pub request_timeout_sec: u64,
    pub artist_lookup_workers: usize,
    pub token_cache_path: PathBuf,
    pub api_base_url: String,
    pub accounts_base_url: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let file_credentials = file.credentials.unwrap_or_default();

        let credentials = Credentials {
            client_id: required_credential(
                file_credentials.client_id,
                &cli.client_id,
                "client_id",
                "SPOTIFY_CLIENT_ID",
            )?,
            client_secret: required_credential(
                file_credentials.client_secret,
                &cli.client_secret,
                "client_secret",
                "SPOTIFY_CLIENT_SECRET",
            )?,
            username: required_credential(
                file_credentials.username,
                &cli.username,
                "username",
                "SPOTIFY_USERNAME",
            )?,
            redirect_uri: required_credential(
                file_credentials.redirect_uri,
                &cli.redirect_uri,
                "redirect_uri",
                "SPOTIFY_REDIRECT_URI",
            )?,
        };

        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| cli.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        // Validate output_dir exists
        if !output_dir.exists() {
            bail!("Output directory does not exist: {:?}", output_dir);
        }
        if !output_dir.is_dir() {
            bail!("output_dir is not a directory: {:?}", output_dir);
        }

        let page_limit = file.page_limit.unwrap_or(cli.page_limit);
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            bail!(
                "page_limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT,
                page_limit
            );
        }

        let feature_batch_size = file.feature_batch_size.unwrap_or(cli.feature_batch_size);
        if feature_batch_size == 0 || feature_batch_size > MAX_FEATURE_BATCH {
            bail!(
                "feature_batch_size must be between 1 and {}, got {}",
                MAX_FEATURE_BATCH,
                feature_batch_size
            );
        }

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        let artist_lookup_workers = file
            .artist_lookup_workers
            .unwrap_or(cli.artist_lookup_workers)
            .max(1);
        if artist_lookup_workers > MAX_ARTIST_LOOKUP_WORKERS {
            bail!(
                "artist_lookup_workers must be at most {}, got {}",
                MAX_ARTIST_LOOKUP_WORKERS,
                artist_lookup_workers
            );
        }

        let token_cache_path = file
            .token_cache_path
            .map(PathBuf::from)
            .or_else(|| cli.token_cache_path.clone())
            .unwrap_or_else(|| PathBuf::from(format!(".cache-{}", credentials.username)));

        let api_base_url = file
            .api_base_url
            .unwrap_or_else(|| cli.api_base_url.clone());
        let accounts_base_url = file
            .accounts_base_url
            .unwrap_or_else(|| cli.accounts_base_url.clone());

        Ok(AppConfig {
            credentials,
            output_dir,
            page_limit,
            feature_batch_size,
            request_timeout_sec,
            artist_lookup_workers,
            token_cache_path,
            api_base_url,
            accounts_base_url,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            page_limit: self.page_limit,
            feature_batch_size: self.feature_batch_size,
            artist_lookup_workers: self.artist_lookup_workers,
            output_dir: self.output_dir.clone(),
        }
    }
}

fn required_credential(
    file_value: Option<String>,
    cli_value: &Option<String>,
    name: &str,
    env: &str,
) -> Result<String> {
    file_value
        .or_else(|| cli_value.clone())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "{} must be specified via --{}, {} or in config file",
                name,
                name.replace('_', "-"),
                env
            )
        })
}
