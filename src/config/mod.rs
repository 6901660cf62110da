//! Configuration management.

use crate::retrieval::FilterConfig;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for factsieve.
#[derive(Debug, Clone, Default)]
pub struct SieveConfig {
    /// Retrieval filter parameters.
    pub retrieval: FilterConfig,
    /// Embedding provider settings.
    pub embedding: EmbeddingSettings,
    /// Chunking parameters used when indexing files.
    pub splitter: SplitterSettings,
    /// Vector store persistence.
    pub store: StoreSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSettings {
    /// Which provider to build.
    pub provider: EmbeddingProviderKind,
    /// Model name (provider-specific).
    pub model: Option<String>,
    /// API key, already expanded from `${VAR}` references.
    pub api_key: Option<SecretString>,
    /// Base URL for the provider (for proxies and self-hosted endpoints).
    pub base_url: Option<String>,
    /// Embedding dimensions override.
    pub dimensions: Option<usize>,
}

/// Available embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProviderKind {
    /// Deterministic hash pseudo-embeddings (offline).
    #[default]
    Hash,
    /// `OpenAI` embeddings API.
    OpenAi,
    /// Local `FastEmbed` model.
    FastEmbed,
}

impl EmbeddingProviderKind {
    /// Parses a provider string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an unknown provider name.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "openai" => Ok(Self::OpenAi),
            "fastembed" | "fast_embed" | "fast-embed" => Ok(Self::FastEmbed),
            other => Err(Error::InvalidConfig(format!(
                "unknown embedding provider '{other}'"
            ))),
        }
    }
}

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterSettings {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 0,
        }
    }
}

/// Vector store persistence settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Path of the persisted JSON store.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".factsieve").join("store.json"),
        }
    }
}

/// Logging settings as written in the config file.
///
/// Environment overrides are applied by
/// [`LoggingConfig`](crate::observability::LoggingConfig).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Filter directive, e.g. `factsieve=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Retrieval section.
    pub retrieval: Option<FilterConfig>,
    /// Embedding section.
    pub embedding: Option<ConfigFileEmbedding>,
    /// Splitter section.
    pub splitter: Option<ConfigFileSplitter>,
    /// Store section.
    pub store: Option<ConfigFileStore>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Embedding section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEmbedding {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API key (can be environment variable reference like `${OPENAI_API_KEY}`).
    pub api_key: Option<String>,
    /// Base URL.
    pub base_url: Option<String>,
    /// Dimensions.
    pub dimensions: Option<usize>,
}

/// Splitter section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSplitter {
    /// Chunk size.
    pub chunk_size: Option<usize>,
    /// Chunk overlap.
    pub chunk_overlap: Option<usize>,
}

/// Store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStore {
    /// Store path.
    pub path: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Format.
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

impl SieveConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is rejected (unknown provider, invalid retrieval parameters).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::failed("read_config_file", e))?;
        Self::parse(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value is rejected.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::failed("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/factsieve/` on macOS)
    /// 2. XDG config dir (`~/.config/factsieve/` for Unix compatibility)
    ///
    /// Returns default configuration if no usable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("factsieve").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("factsieve")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `SieveConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(retrieval) = file.retrieval {
            retrieval.validate()?;
            config.retrieval = retrieval;
        }
        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                config.embedding.provider = EmbeddingProviderKind::parse(&provider)?;
            }
            config.embedding.model = embedding.model;
            config.embedding.api_key = embedding
                .api_key
                .map(|key| SecretString::from(expand_env_vars(&key)));
            config.embedding.base_url = embedding.base_url.map(|url| expand_env_vars(&url));
            config.embedding.dimensions = embedding.dimensions;
        }
        if let Some(splitter) = file.splitter {
            if let Some(v) = splitter.chunk_size {
                config.splitter.chunk_size = v;
            }
            if let Some(v) = splitter.chunk_overlap {
                config.splitter.chunk_overlap = v;
            }
        }
        if let Some(store) = file.store {
            if let Some(path) = store.path {
                config.store.path = PathBuf::from(expand_env_vars(&path));
            }
        }
        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                format: logging.format,
                filter: logging.filter,
                file: logging.file.map(|f| PathBuf::from(expand_env_vars(&f))),
            };
        }

        Ok(config)
    }

    /// Sets the store path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = path.into();
        self
    }
}

/// Expands `${VAR}` references from the environment.
///
/// Unset variables expand to an empty string; an unterminated `${` is kept
/// verbatim.
#[must_use]
pub fn expand_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };
        output.push_str(&std::env::var(&after[..end]).unwrap_or_default());
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    output
}
