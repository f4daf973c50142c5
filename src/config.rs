//! Configuration handling for tugsort.
//!
//! Settings live in the `[tugsort]` table of `tugsort.toml`. Every field has
//! a default, so a missing file, an empty file and a file with only some
//! keys all load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tugsort_js::options::{default_import_order, DEFAULT_SKIP_MARKER};
use tugsort_js::{Dialect, SortOptions};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "tugsort.toml";

/// Errors loading or printing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize configuration: {message}")]
    Serialize { message: String },
}

impl ConfigError {
    /// The config file involved, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Serialize { .. } => None,
        }
    }
}

/// tugsort configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tugsort: SortConfig,
}

/// The `[tugsort]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Group patterns; an empty list keeps the original order.
    #[serde(default = "default_import_order")]
    pub import_order: Vec<String>,

    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default = "default_true")]
    pub sort_specifiers: bool,

    #[serde(default = "default_true")]
    pub merge_duplicates: bool,

    #[serde(default = "default_true")]
    pub combine_type_and_value: bool,

    /// Side-effect imports matching these patterns are sorted.
    #[serde(default)]
    pub side_effect_sortable: Vec<String>,

    #[serde(default = "default_skip_markers")]
    pub skip_markers: Vec<String>,

    /// File extensions (without the dot) picked up when walking directories.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_skip_markers() -> Vec<String> {
    vec![DEFAULT_SKIP_MARKER.to_string()]
}

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            import_order: default_import_order(),
            case_sensitive: false,
            sort_specifiers: true,
            merge_duplicates: true,
            combine_type_and_value: true,
            side_effect_sortable: Vec::new(),
            skip_markers: default_skip_markers(),
            extensions: default_extensions(),
        }
    }
}

impl SortConfig {
    /// Engine options for a file with the given path.
    pub fn sort_options(&self, path: &Path) -> SortOptions {
        SortOptions {
            import_order: self.import_order.clone(),
            case_sensitive: self.case_sensitive,
            sort_specifiers: self.sort_specifiers,
            merge_duplicates: self.merge_duplicates,
            combine_type_and_value: self.combine_type_and_value,
            side_effect_sortable: self.side_effect_sortable.clone(),
            skip_markers: self.skip_markers.clone(),
            dialect: dialect_for(path),
        }
    }

    /// Whether a directory walk should pick up `path`.
    pub fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}

/// Dialect for a file, by extension. Unknown extensions parse as TypeScript.
pub fn dialect_for(path: &Path) -> Dialect {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(Dialect::TypeScript, Dialect::from_extension)
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Load `explicit` if given, else `tugsort.toml` in `dir`, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Config::default())
        }
    }

    /// The configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}
