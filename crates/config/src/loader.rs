//! Settings loader
//!
//! Resolves the settings file (explicit path, then `BREAKWATER_CONFIG`),
//! parses it, layers environment overrides on top and validates the result.

use crate::settings::{parse_settings, ResilienceSettings};
use breakwater_core::{
    constants::{
        BREAKWATER_BREAK_DURATION_VAR, BREAKWATER_CONFIG_VAR, BREAKWATER_FAILURE_RATIO_VAR,
        BREAKWATER_MAX_RETRIES_VAR,
    },
    Error, Result,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads [`ResilienceSettings`] at startup
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
    use_env: bool,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            use_env: true,
        }
    }

    /// Read settings from this file instead of `BREAKWATER_CONFIG`
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Ignore the process environment entirely
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn load(&self) -> Result<ResilienceSettings> {
        let lookup = |name: &str| {
            if self.use_env {
                std::env::var(name).ok()
            } else {
                None
            }
        };
        self.load_with(lookup)
    }

    /// Load using `lookup` in place of the process environment
    pub fn load_with<L>(&self, lookup: L) -> Result<ResilienceSettings>
    where
        L: Fn(&str) -> Option<String>,
    {
        let path = self
            .path
            .clone()
            .or_else(|| lookup(BREAKWATER_CONFIG_VAR).map(PathBuf::from));

        let mut settings = match path {
            Some(path) => read_settings_file(&path)?,
            None => {
                tracing::debug!("no settings file given, using defaults");
                ResilienceSettings::default()
            }
        };

        apply_env_overrides(&mut settings, &lookup)?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_settings_file(path: &Path) -> Result<ResilienceSettings> {
    tracing::debug!(path = %path.display(), "reading settings file");
    let text =
        std::fs::read_to_string(path).map_err(|e| Error::file_system(path, "read", e))?;
    parse_settings(&text)
}

fn apply_env_overrides<L>(settings: &mut ResilienceSettings, lookup: &L) -> Result<()>
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = parse_override(lookup, BREAKWATER_MAX_RETRIES_VAR)? {
        settings.retry.max_retries = value;
    }
    if let Some(value) = parse_override(lookup, BREAKWATER_BREAK_DURATION_VAR)? {
        settings.breaker.break_duration_ms = value;
    }
    if let Some(value) = parse_override(lookup, BREAKWATER_FAILURE_RATIO_VAR)? {
        settings.breaker.failure_threshold_ratio = value;
    }
    Ok(())
}

fn parse_override<T, L>(lookup: &L, variable: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .map_err(|e| Error::environment(variable, format!("invalid value '{raw}': {e}")))?;
            tracing::debug!(variable, value = %raw.trim(), "applying environment override");
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
