// src/config.rs
//! Process configuration: `.env`, optional YAML file, then environment variables.
//!
//! Everything is read once at startup and handed to the clients explicitly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_JSEARCH_URL: &str = "https://jsearch.p.rapidapi.com/search";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Rest,
    Mcp,
}

/// Where SEARCH sits relative to RANK when the caller supplies no job list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineOrder {
    #[default]
    RankFirst,
    SearchFirst,
}

impl std::str::FromStr for PipelineOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "rank-first" | "parse-rank-search-draft" => Ok(Self::RankFirst),
            "search-first" | "parse-search-rank-draft" => Ok(Self::SearchFirst),
            other => anyhow::bail!("Unknown pipeline order: {}", other),
        }
    }
}

impl std::str::FromStr for TransportMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "rest" | "" => Ok(Self::Rest),
            "mcp" => Ok(Self::Mcp),
            other => anyhow::bail!("Unknown MODE: {}. Use rest or mcp", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct JSearchConfig {
    pub api_key: String,
    pub url: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceUrls {
    pub resume_parser: String,
    pub ranker: String,
    pub job_search: String,
    pub cover_letter: String,
}

impl ServiceUrls {
    /// One service per process, each on its own port.
    pub fn standalone() -> Self {
        Self {
            resume_parser: "http://127.0.0.1:9000".to_string(),
            ranker: "http://127.0.0.1:9090".to_string(),
            job_search: "http://127.0.0.1:9100".to_string(),
            cover_letter: "http://127.0.0.1:9200".to_string(),
        }
    }

    /// Every service mounted in the same process on `port`.
    pub fn colocated(port: u16) -> Self {
        let base = format!("http://127.0.0.1:{}", port);
        Self {
            resume_parser: base.clone(),
            ranker: base.clone(),
            job_search: base.clone(),
            cover_letter: base,
        }
    }
}

/// Optional YAML overlay. API keys are deliberately not read from it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub services: Option<PartialServiceUrls>,
    pub output_dir: Option<PathBuf>,
    pub pipeline_order: Option<PipelineOrder>,
    pub timeout_seconds: Option<u64>,
    pub bind_address: Option<String>,
    pub gemini_model: Option<String>,
    pub jsearch_url: Option<String>,
    pub jsearch_country: Option<String>,
    pub save_cover_letter: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PartialServiceUrls {
    pub resume_parser: Option<String>,
    pub ranker: Option<String>,
    pub job_search: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: Option<GeminiConfig>,
    pub jsearch: Option<JSearchConfig>,
    pub services: ServiceUrls,
    pub output_dir: PathBuf,
    pub mode: TransportMode,
    pub pipeline_order: PipelineOrder,
    pub timeout_seconds: u64,
    pub bind_address: String,
    /// Ask the cover-letter stage to write a document during orchestration.
    pub save_cover_letter: bool,
}

impl AppConfig {
    /// Load `.env`, the YAML file (explicit path, else `config.yaml` if present)
    /// and the process environment.
    pub fn load(config_path: Option<&Path>, colocated_port: Option<u16>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment variables from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Failed to load .env file: {}", e),
        }

        let file = match config_path {
            Some(path) => Some(Self::read_file(path)?),
            None => {
                let default_path = PathBuf::from("config.yaml");
                if default_path.exists() {
                    Some(Self::read_file(&default_path)?)
                } else {
                    None
                }
            }
        };

        let base_services = match colocated_port {
            Some(port) => ServiceUrls::colocated(port),
            None => ServiceUrls::standalone(),
        };

        Self::from_sources(file.unwrap_or_default(), base_services, |key| {
            std::env::var(key).ok()
        })
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: FileConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded configuration file {}", path.display());
        Ok(file)
    }

    /// Layering: defaults, then file values, then environment variables.
    pub fn from_sources<F>(file: FileConfig, base_services: ServiceUrls, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let gemini = var("GEMINI_API_KEY")
            .or_else(|| var("GOOGLE_API_KEY"))
            .map(|api_key| GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL")
                    .or(file.gemini_model.clone())
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            });

        let jsearch = var("JSEARCH_API_KEY").map(|api_key| JSearchConfig {
            api_key,
            url: var("JSEARCH_URL")
                .or(file.jsearch_url.clone())
                .unwrap_or_else(|| DEFAULT_JSEARCH_URL.to_string()),
            country: var("JSEARCH_COUNTRY")
                .or(file.jsearch_country.clone())
                .unwrap_or_else(|| "us".to_string()),
        });

        let file_services = file.services.unwrap_or_default();
        let services = ServiceUrls {
            resume_parser: var("RESUME_PARSER_URL")
                .or(file_services.resume_parser)
                .unwrap_or(base_services.resume_parser),
            ranker: var("RANKER_URL")
                .or(file_services.ranker)
                .unwrap_or(base_services.ranker),
            job_search: var("JOB_SEARCH_URL")
                .or(file_services.job_search)
                .unwrap_or(base_services.job_search),
            cover_letter: var("COVER_LETTER_URL")
                .or(file_services.cover_letter)
                .unwrap_or(base_services.cover_letter),
        };

        let mode = match var("MODE") {
            Some(value) => value.parse()?,
            None => TransportMode::Rest,
        };

        let pipeline_order = match var("PIPELINE_ORDER") {
            Some(value) => value.parse()?,
            None => file.pipeline_order.unwrap_or_default(),
        };

        let timeout_seconds = match var("HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            None => file.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_seconds == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be at least 1 second");
        }

        let save_cover_letter = match var("SAVE_COVER_LETTER") {
            Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"),
            None => file.save_cover_letter.unwrap_or(false),
        };

        Ok(Self {
            gemini,
            jsearch,
            services,
            output_dir: var("OUTPUT_DIR")
                .map(PathBuf::from)
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from("output")),
            mode,
            pipeline_order,
            timeout_seconds,
            bind_address: var("BIND_ADDRESS")
                .or(file.bind_address)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            save_cover_letter,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Ensure the document output directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.output_dir.display()))
    }
}
