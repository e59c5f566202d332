//! Renamer configuration.
//!
//! This module loads optional settings from a TOML file:
//! - Entry ordering (sorted by name, or raw directory order)
//! - Extension overrides for each category
//! - Filters that keep files out of the run entirely
//!
//! # Configuration File Format
//!
//! ```toml
//! [renamer]
//! sort_entries = true
//!
//! [categories]
//! image = [".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".gif"]
//! video = [".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv"]
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["cover.jpg"]
//! patterns = ["thumb_*"]
//! extensions = ["gif"]
//! regex = []
//! ```

use crate::category::{Category, CategoryTable, normalize_extension};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".media-renamer.toml";

/// Why a configuration could not be used.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly requested file is missing.
    ConfigNotFound(PathBuf),
    /// The file is not valid TOML, or has fields of the wrong type.
    ConfigInvalid(String),
    /// An `exclude.patterns` entry is not a valid glob.
    InvalidGlobPattern(String),
    /// An `exclude.regex` entry does not compile.
    InvalidRegexPattern {
        pattern: String,
        reason: String,
    },
    /// The file exists but could not be read.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenamerConfig {
    #[serde(default)]
    pub renamer: RenamerSettings,

    #[serde(default)]
    pub categories: CategoryOverrides,

    #[serde(default)]
    pub filters: FilterRules,
}

/// General renamer behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamerSettings {
    /// Sort entries by name before numbering. Defaults to true.
    #[serde(default = "default_true")]
    pub sort_entries: bool,
}

impl Default for RenamerSettings {
    fn default() -> Self {
        Self { sort_entries: true }
    }
}

/// Extension lists that replace the built-in ones. Empty keeps the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryOverrides {
    #[serde(default)]
    pub image: Vec<String>,

    #[serde(default)]
    pub video: Vec<String>,
}

/// Rules deciding which files take part in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." are considered. Defaults to true.
    #[serde(default = "default_true")]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude: ExcludeRules::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Files matching any of these stay out of the run: never renamed, never
/// counted, but still able to block a new name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Whole file names, compared exactly.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Globs over the file name alone, e.g. `thumb_*`.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, any case, dot optional.
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub regex: Vec<String>,
}

impl RenamerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.media-renamer.toml` in the current directory
    /// 3. Look for `~/.config/media-renamer/config.toml`
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("media-renamer")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        log::debug!("loading configuration from {}", path.display());

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category table, applying any extension overrides.
    pub fn category_table(&self) -> CategoryTable {
        let mut table = CategoryTable::default();
        if !self.categories.image.is_empty() {
            table.set_extensions(Category::Image, &self.categories.image);
        }
        if !self.categories.video.is_empty() {
            table.set_extensions(Category::Video, &self.categories.video);
        }
        table
    }

    /// Compile the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Filters that let every file through.
    pub fn allow_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }

    /// Check if a file takes part in the run.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Hidden file filter
    /// 2. Exact filename match
    /// 3. File extension match
    /// 4. Glob pattern match
    /// 5. Regex pattern match
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext = normalize_extension(&ext.to_string_lossy());
            if self.exclude_extensions.contains(&ext) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}
