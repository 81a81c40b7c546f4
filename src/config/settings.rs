//! TOML-based configuration for Quarry.
//!
//! Supports a config file (quarry.toml) with environment variable expansion
//! in path-valued settings.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! fulltext_or_token = "or"
//! date_format = "%Y-%m-%d"
//! join_style = "inner"
//!
//! [compiler.scope]
//! key = { contains = "project.id" }
//! scope_type = "PROJECT"
//!
//! [sql]
//! dialect = "postgres"
//! catalog = "${QUARRY_HOME}/catalog.toml"
//! bindings = "bindings.toml"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::model::JoinStyle;
use crate::sql::dialect::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub sql: SqlSettings,
}

/// How the scope-restriction criterion is found among the form keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKey {
    /// Any key containing the name, tolerating per-screen prefixes.
    Contains(String),
    Exact(String),
}

impl ScopeKey {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            ScopeKey::Contains(name) => key.contains(name.as_str()),
            ScopeKey::Exact(name) => key == name,
        }
    }

    fn name(&self) -> &str {
        match self {
            ScopeKey::Contains(name) | ScopeKey::Exact(name) => name,
        }
    }
}

impl Default for ScopeKey {
    fn default() -> Self {
        ScopeKey::Contains("project.id".to_string())
    }
}

/// Scope-restriction settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeSettings {
    pub key: ScopeKey,

    /// Scope type handed to the security predicate.
    pub scope_type: String,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            key: ScopeKey::default(),
            scope_type: "PROJECT".to_string(),
        }
    }
}

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Token spliced between the words of a fulltext search.
    pub fulltext_or_token: String,

    /// strftime format of date literals.
    pub date_format: String,

    /// Join style of compiled models.
    #[serde(with = "join_style_name")]
    pub join_style: JoinStyle,

    pub scope: ScopeSettings,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            fulltext_or_token: "or".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            join_style: JoinStyle::Inner,
            scope: ScopeSettings::default(),
        }
    }
}

impl CompilerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.fulltext_or_token.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "compiler.fulltext_or_token is empty".into(),
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(SettingsError::InvalidConfig(format!(
                "compiler.date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        if self.scope.key.name().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "compiler.scope.key names no key".into(),
            ));
        }
        Ok(())
    }
}

/// `join_style = "inner" | "left"` in TOML.
mod join_style_name {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::model::JoinStyle;

    pub fn serialize<S: Serializer>(style: &JoinStyle, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(match style {
            JoinStyle::Inner => "inner",
            JoinStyle::Left => "left",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<JoinStyle, D::Error> {
        let name = String::deserialize(d)?;
        JoinStyle::from_str(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown join style '{}'", name)))
    }
}

/// SQL adapter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    pub dialect: Dialect,

    /// Catalog file replacing the built-in catalog (supports ${ENV_VAR} expansion).
    pub catalog: Option<String>,

    /// Bindings file replacing the preset bindings (supports ${ENV_VAR} expansion).
    pub bindings: Option<String>,
}

impl SqlSettings {
    /// Get the catalog path with environment variables expanded.
    pub fn catalog_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_path(self.catalog.as_deref())
    }

    /// Get the bindings path with environment variables expanded.
    pub fn bindings_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_path(self.bindings.as_deref())
    }
}

fn expand_path(path: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
    path.map(|p| expand_env_vars(p).map(PathBuf::from))
        .transpose()
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.compiler.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUARRY_CONFIG`
    /// 2. `./quarry.toml`
    /// 3. `~/.config/quarry/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("QUARRY_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("quarry.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quarry").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("env var pattern is valid")
});

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_VAR.replace_all(s, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
