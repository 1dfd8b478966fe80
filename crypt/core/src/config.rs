//! Configuration
//!
//! Centralized knobs for timing and atmosphere, loaded with the usual
//! priority (highest first):
//!
//! 1. Environment variables (`CRYPT_*`)
//! 2. TOML configuration file
//! 3. Default values
//!
//! The config file follows the XDG Base Directory layout:
//! `$XDG_CONFIG_HOME/code-crypt/crypt.toml` (typically
//! `~/.config/code-crypt/crypt.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [typing]
//! char_delay_ms = 50
//! stumble_chance = 0.1
//!
//! [flourish]
//! glitch_ms = 300
//! flicker_ms = 1000
//! mood_linger_ms = 3000
//!
//! [ambient]
//! enabled = true
//! glitch_min_ms = 15000
//! glitch_max_ms = 25000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where the effective configuration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Defaults only.
    Default,
    /// A TOML file was loaded.
    File,
}

/// Typing-replay behavior.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Base delay between typed characters, in milliseconds.
    pub char_delay_ms: u64,
    /// Probability (0.0–1.0) that a character takes twice as long.
    pub stumble_chance: f64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: 50,
            stumble_chance: 0.1,
        }
    }
}

/// Durations of the transient visual and emotional flourishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlourishConfig {
    /// Screen glitch duration, in milliseconds.
    pub glitch_ms: u64,
    /// Wrong-answer flicker duration, in milliseconds.
    pub flicker_ms: u64,
    /// Whisper apparition duration, in milliseconds.
    pub whisper_overlay_ms: u64,
    /// How long a ghost holds an error-reaction mood, in milliseconds.
    pub mood_linger_ms: u64,
    /// How long a typing quip stays on screen, in milliseconds.
    pub quip_linger_ms: u64,
    /// How long after the last keystroke the ghosts consider you "typing".
    pub typing_activity_ms: u64,
}

impl Default for FlourishConfig {
    fn default() -> Self {
        Self {
            glitch_ms: 300,
            flicker_ms: 1000,
            whisper_overlay_ms: 1000,
            mood_linger_ms: 3000,
            quip_linger_ms: 2000,
            typing_activity_ms: 2000,
        }
    }
}

/// Self-scheduled background behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Master switch for ambient glitches and spontaneous ghost antics.
    pub enabled: bool,
    /// Minimum gap between ambient glitches, in milliseconds.
    pub glitch_min_ms: u64,
    /// Maximum gap between ambient glitches, in milliseconds.
    pub glitch_max_ms: u64,
    /// Interval of the spontaneous ghost-antic tick, in milliseconds.
    pub ghost_tick_ms: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glitch_min_ms: 15_000,
            glitch_max_ms: 25_000,
            ghost_tick_ms: 5_000,
        }
    }
}

/// Demo availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Whether demo runs may be started at all.
    pub enabled: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// The complete crypt configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptConfig {
    /// Typing-replay behavior.
    pub typing: TypingConfig,
    /// Flourish durations.
    pub flourish: FlourishConfig,
    /// Ambient background behaviors.
    pub ambient: AmbientConfig,
    /// Demo availability.
    pub demo: DemoConfig,
}

impl CryptConfig {
    /// Apply `CRYPT_*` environment variable overrides on top of `self`.
    ///
    /// Unparseable values are ignored with a warning rather than failing
    /// the whole load.
    pub fn apply_env(&mut self) {
        fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
            let raw = std::env::var(name).ok()?;
            match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(var = name, value = %raw, "ignoring unparseable env override");
                    None
                }
            }
        }

        if let Some(v) = parse_env("CRYPT_TYPING_DELAY_MS") {
            self.typing.char_delay_ms = v;
        }
        if let Some(v) = parse_env("CRYPT_TYPING_STUMBLE_CHANCE") {
            self.typing.stumble_chance = v;
        }
        if let Some(v) = parse_env("CRYPT_GLITCH_MS") {
            self.flourish.glitch_ms = v;
        }
        if let Some(v) = parse_env("CRYPT_FLICKER_MS") {
            self.flourish.flicker_ms = v;
        }
        if let Some(v) = parse_env("CRYPT_MOOD_LINGER_MS") {
            self.flourish.mood_linger_ms = v;
        }
        if let Some(v) = parse_env::<String>("CRYPT_AMBIENT") {
            self.ambient.enabled = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = parse_env::<String>("CRYPT_DEMO") {
            self.demo.enabled = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }

    /// Sanity-check relationships between values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ambient.glitch_min_ms > self.ambient.glitch_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "ambient.glitch_min_ms ({}) exceeds ambient.glitch_max_ms ({})",
                self.ambient.glitch_min_ms, self.ambient.glitch_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.typing.stumble_chance) {
            return Err(ConfigError::ValidationError(format!(
                "typing.stumble_chance ({}) must be within 0.0..=1.0",
                self.typing.stumble_chance
            )));
        }
        if self.typing.char_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "typing.char_delay_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial TOML form of [`CryptConfig`]; every field optional so a config
/// file only needs to mention what it changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptToml {
    /// `[typing]` section.
    pub typing: Option<TypingToml>,
    /// `[flourish]` section.
    pub flourish: Option<FlourishToml>,
    /// `[ambient]` section.
    pub ambient: Option<AmbientToml>,
    /// `[demo]` section.
    pub demo: Option<DemoToml>,
}

/// `[typing]` section of the TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingToml {
    /// Overrides [`TypingConfig::char_delay_ms`].
    pub char_delay_ms: Option<u64>,
    /// Overrides [`TypingConfig::stumble_chance`].
    pub stumble_chance: Option<f64>,
}

/// `[flourish]` section of the TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlourishToml {
    /// Overrides [`FlourishConfig::glitch_ms`].
    pub glitch_ms: Option<u64>,
    /// Overrides [`FlourishConfig::flicker_ms`].
    pub flicker_ms: Option<u64>,
    /// Overrides [`FlourishConfig::whisper_overlay_ms`].
    pub whisper_overlay_ms: Option<u64>,
    /// Overrides [`FlourishConfig::mood_linger_ms`].
    pub mood_linger_ms: Option<u64>,
    /// Overrides [`FlourishConfig::quip_linger_ms`].
    pub quip_linger_ms: Option<u64>,
    /// Overrides [`FlourishConfig::typing_activity_ms`].
    pub typing_activity_ms: Option<u64>,
}

/// `[ambient]` section of the TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientToml {
    /// Overrides [`AmbientConfig::enabled`].
    pub enabled: Option<bool>,
    /// Overrides [`AmbientConfig::glitch_min_ms`].
    pub glitch_min_ms: Option<u64>,
    /// Overrides [`AmbientConfig::glitch_max_ms`].
    pub glitch_max_ms: Option<u64>,
    /// Overrides [`AmbientConfig::ghost_tick_ms`].
    pub ghost_tick_ms: Option<u64>,
}

/// `[demo]` section of the TOML file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoToml {
    /// Overrides [`DemoConfig::enabled`].
    pub enabled: Option<bool>,
}

impl CryptToml {
    /// Merge this file's values over `config`.
    pub fn apply(&self, config: &mut CryptConfig) {
        if let Some(typing) = &self.typing {
            if let Some(v) = typing.char_delay_ms {
                config.typing.char_delay_ms = v;
            }
            if let Some(v) = typing.stumble_chance {
                config.typing.stumble_chance = v;
            }
        }
        if let Some(flourish) = &self.flourish {
            if let Some(v) = flourish.glitch_ms {
                config.flourish.glitch_ms = v;
            }
            if let Some(v) = flourish.flicker_ms {
                config.flourish.flicker_ms = v;
            }
            if let Some(v) = flourish.whisper_overlay_ms {
                config.flourish.whisper_overlay_ms = v;
            }
            if let Some(v) = flourish.mood_linger_ms {
                config.flourish.mood_linger_ms = v;
            }
            if let Some(v) = flourish.quip_linger_ms {
                config.flourish.quip_linger_ms = v;
            }
            if let Some(v) = flourish.typing_activity_ms {
                config.flourish.typing_activity_ms = v;
            }
        }
        if let Some(ambient) = &self.ambient {
            if let Some(v) = ambient.enabled {
                config.ambient.enabled = v;
            }
            if let Some(v) = ambient.glitch_min_ms {
                config.ambient.glitch_min_ms = v;
            }
            if let Some(v) = ambient.glitch_max_ms {
                config.ambient.glitch_max_ms = v;
            }
            if let Some(v) = ambient.ghost_tick_ms {
                config.ambient.ghost_tick_ms = v;
            }
        }
        if let Some(demo) = &self.demo {
            if let Some(v) = demo.enabled {
                config.demo.enabled = v;
            }
        }
    }
}

/// Default config file location, XDG-compliant.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("code-crypt").join("crypt.toml"))
}

/// Load configuration from a specific TOML file, then apply env overrides
/// and validate.
pub fn load_config_from_path(path: &Path) -> Result<CryptConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CryptToml = toml::from_str(&raw)?;

    let mut config = CryptConfig::default();
    file.apply(&mut config);
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Load configuration from the default location.
///
/// A missing file is not an error — defaults plus env overrides apply. A
/// present-but-broken file is reported so the user notices, and defaults
/// are used.
#[must_use]
pub fn load_config() -> (CryptConfig, ConfigSource) {
    let path = default_config_path();
    if let Some(path) = path.filter(|p| p.exists()) {
        match load_config_from_path(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded configuration file");
                return (config, ConfigSource::File);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring broken config file");
            }
        }
    }

    let mut config = CryptConfig::default();
    config.apply_env();
    (config, ConfigSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = CryptConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.typing.char_delay_ms, 50);
        assert_eq!(config.flourish.glitch_ms, 300);
        assert_eq!(config.ambient.glitch_min_ms, 15_000);
        assert!(config.demo.enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults_elsewhere() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[typing]\nchar_delay_ms = 25\n").unwrap();
        writeln!(file, "[ambient]\nenabled = false\n").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.typing.char_delay_ms, 25);
        assert!(!config.ambient.enabled);
        // Untouched sections keep defaults.
        assert_eq!(config.flourish.flicker_ms, 1000);
        assert!((config.typing.stumble_chance - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_broken_toml_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[typing\nchar_delay_ms = ").unwrap();
        let result = load_config_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_errors_with_path() {
        let result = load_config_from_path(Path::new("/nonexistent/crypt.toml"));
        match result {
            Err(ConfigError::ReadError { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/crypt.toml"));
            }
            other => panic!("expected ReadError, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_inverted_glitch_range() {
        let mut config = CryptConfig::default();
        config.ambient.glitch_min_ms = 30_000;
        config.ambient.glitch_max_ms = 10_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_silly_stumble_chance() {
        let mut config = CryptConfig::default();
        config.typing.stumble_chance = 1.5;
        assert!(config.validate().is_err());
        config.typing.stumble_chance = 0.0;
        assert!(config.validate().is_ok());
    }
}
