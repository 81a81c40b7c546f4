//! Configuration module for Quarry.
//!
//! Handles compiler defaults, SQL adapter settings and environment variables.

mod settings;

pub use settings::{
    expand_env_vars, CompilerSettings, ScopeKey, ScopeSettings, Settings, SettingsError,
    SqlSettings,
};
