use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Environment variable still carries the `YOUR_..._HERE` template value.
    #[error("Environment variable {0} still has its placeholder value; fill it in before starting")]
    PlaceholderValue(String),
    /// Chunk overlap must stay strictly smaller than the chunk size.
    #[error("CHUNK_OVERLAP ({overlap}) must be smaller than CHUNK_SIZE ({chunk_size})")]
    OverlapTooLarge {
        /// Configured window size in characters.
        chunk_size: usize,
        /// Configured overlap in characters.
        overlap: usize,
    },
}

/// Runtime configuration for the gemdrive server.
#[derive(Debug)]
pub struct Config {
    /// Identifier of the Google Drive folder to load documents from.
    pub drive_folder_id: String,
    /// OAuth bearer token used for Drive API requests.
    pub drive_access_token: String,
    /// Optional override for the Drive API base URL.
    pub drive_api_url: Option<String>,
    /// API key used for Gemini requests.
    pub gemini_api_key: String,
    /// Preferred Gemini model identifier.
    pub gemini_model: String,
    /// Optional override for the Gemini API base URL.
    pub gemini_api_url: Option<String>,
    /// Window size, in characters, used when chunking documents.
    pub chunk_size: usize,
    /// Overlap, in characters, between consecutive chunks of one document.
    pub chunk_overlap: usize,
    /// Number of top-ranked chunks forwarded as context.
    pub top_k: usize,
    /// Maximum context length, in characters, sent to the completion backend.
    pub max_context_length: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Default model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

const DEFAULT_CHUNK_SIZE: usize = 10_000;
const DEFAULT_CHUNK_OVERLAP: usize = 500;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_MAX_CONTEXT_LENGTH: usize = 30_000;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            drive_folder_id: load_env_required("DRIVE_FOLDER_ID")?,
            drive_access_token: load_env_required("DRIVE_ACCESS_TOKEN")?,
            drive_api_url: load_env_optional("DRIVE_API_URL"),
            gemini_api_key: load_env_required("GEMINI_API_KEY")?,
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: load_env_optional("GEMINI_API_URL"),
            chunk_size: load_env_or("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: load_env_or("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: load_env_or("TOP_K", DEFAULT_TOP_K)?,
            max_context_length: load_env_or("MAX_CONTEXT_LENGTH", DEFAULT_MAX_CONTEXT_LENGTH)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        };

        if config.chunk_size == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_SIZE".into()));
        }
        validate_chunk_geometry(config.chunk_size, config.chunk_overlap)?;

        Ok(config)
    }
}

fn validate_chunk_geometry(chunk_size: usize, overlap: usize) -> Result<(), ConfigError> {
    if overlap >= chunk_size {
        return Err(ConfigError::OverlapTooLarge {
            chunk_size,
            overlap,
        });
    }
    Ok(())
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_required(key: &str) -> Result<String, ConfigError> {
    let value = load_env(key)?;
    if value.trim().is_empty() {
        return Err(ConfigError::MissingVariable(key.to_string()));
    }
    if is_placeholder(&value) {
        return Err(ConfigError::PlaceholderValue(key.to_string()));
    }
    Ok(value)
}

fn load_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Setup templates ship values like `YOUR_FOLDER_ID_HERE`; treat them as unset.
fn is_placeholder(value: &str) -> bool {
    value.starts_with("YOUR_") && value.ends_with("_HERE")
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        folder = %config.drive_folder_id,
        model = %config.gemini_model,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        top_k = config.top_k,
        max_context_length = config.max_context_length,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
