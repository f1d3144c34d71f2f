//! SPOKG Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with defaults matching the document-scale extraction mode.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Segmentation and extraction policy
    pub extraction: ExtractionConfig,

    /// Dependency parser connection
    pub parser: ParserConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment variable names)
    pub fn override_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Extraction
        if let Some(mode) = lookup("SPOKG_SEGMENTATION_MODE") {
            self.extraction.segmentation_mode = mode.parse()?;
        }
        if let Some(words) = lookup("SPOKG_MIN_SENTENCE_WORDS") {
            self.extraction.min_sentence_words =
                words.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SPOKG_MIN_SENTENCE_WORDS".to_string(),
                    value: words,
                })?;
        }
        if let Some(policy) = lookup("SPOKG_EXTRACTION_POLICY") {
            self.extraction.extraction_policy = policy.parse()?;
        }
        if let Some(flag) = lookup("SPOKG_EXCLUDE_PRONOUNS") {
            self.extraction.exclude_pronouns = parse_flag("SPOKG_EXCLUDE_PRONOUNS", &flag)?;
        }
        if let Some(policy) = lookup("SPOKG_ON_PARSE_FAILURE") {
            self.extraction.on_parse_failure = policy.parse()?;
        }

        // Parser
        if let Some(url) = lookup("SPOKG_PARSER_URL") {
            self.parser.base_url = url;
        }
        if let Some(secs) = lookup("SPOKG_PARSER_TIMEOUT_SECS") {
            self.parser.timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SPOKG_PARSER_TIMEOUT_SECS".to_string(),
                value: secs,
            })?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.min_sentence_words == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_sentence_words".to_string(),
                value: "0".to_string(),
            });
        }
        if self.parser.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.parser.base_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("parser.base_url".to_string()));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Segmentation and extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How raw text is cut into sentences
    pub segmentation_mode: SegmentationMode,

    /// Sentences with fewer words are dropped (parser-driven mode only)
    pub min_sentence_words: usize,

    /// Which subject/object selection rules to apply
    pub extraction_policy: ExtractionPolicy,

    /// Drop personal pronouns as subject/object candidates
    pub exclude_pronouns: bool,

    /// What to do when the parser fails on a sentence
    pub on_parse_failure: ParseFailurePolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            segmentation_mode: SegmentationMode::Parser,
            min_sentence_words: 5,
            extraction_policy: ExtractionPolicy::RootAnchored,
            exclude_pronouns: false,
            on_parse_failure: ParseFailurePolicy::Skip,
        }
    }
}

/// Sentence segmentation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationMode {
    /// Sentence boundaries from the dependency parser, short fragments dropped
    #[serde(alias = "parser-driven")]
    Parser,
    /// Regex split on terminal punctuation and coordinating conjunctions
    RegexCompound,
}

impl std::str::FromStr for SegmentationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parser" | "parser-driven" => Ok(Self::Parser),
            "regex" | "regex-compound" => Ok(Self::RegexCompound),
            _ => Err(ConfigError::InvalidValue {
                key: "segmentation_mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Triple extraction policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionPolicy {
    /// One triple per root: last valid subject/object child of the root
    RootAnchored,
    /// One triple per subject token: first object child of its governor
    SubjectAnchored,
}

impl std::str::FromStr for ExtractionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" | "root-anchored" => Ok(Self::RootAnchored),
            "subject" | "subject-anchored" => Ok(Self::SubjectAnchored),
            _ => Err(ConfigError::InvalidValue {
                key: "extraction_policy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Handling of sentences the parser cannot process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Log, count, and continue with the next sentence
    Skip,
    /// Stop the document at the first failure
    Abort,
}

impl std::str::FromStr for ParseFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(ConfigError::InvalidValue {
                key: "on_parse_failure".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Dependency parse service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Base URL of the parse service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
