//! Binder configuration.
//!
//! Limits applied while reading request bodies. Every field has a default,
//! so an empty TOML document is a valid configuration:
//!
//! ```toml
//! max_body_size = 1048576
//! strip_array_suffix = true
//!
//! [multipart]
//! max_fields = 100
//! max_field_size = 1048576
//! ```

use serde::{Deserialize, Serialize};

/// Default maximum body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default maximum size per multipart field (1 MiB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 1024 * 1024;

/// Default maximum number of multipart fields.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Errors loading a [`BindConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Multipart limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MultipartConfig {
    /// Maximum number of parts read; more is a bad request.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,

    /// Maximum size of one part in bytes.
    #[serde(default = "default_max_field_size")]
    pub max_field_size: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_fields: default_max_fields(),
            max_field_size: default_max_field_size(),
        }
    }
}

/// Binder settings.
///
/// # Example
///
/// ```rust
/// use bindery_extract::BindConfig;
///
/// let config = BindConfig::new().max_body_size(64 * 1024).max_fields(10);
/// assert_eq!(config.max_body_size, 64 * 1024);
/// assert_eq!(config.multipart.max_fields, 10);
///
/// let parsed = BindConfig::from_toml_str("max_body_size = 4096").unwrap();
/// assert_eq!(parsed.max_body_size, 4096);
/// assert!(parsed.strip_array_suffix);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindConfig {
    /// Bodies larger than this are rejected with 413.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Multipart limits.
    #[serde(default)]
    pub multipart: MultipartConfig,

    /// Treat query keys written `key[]` as `key`.
    #[serde(default = "default_true")]
    pub strip_array_suffix: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            multipart: MultipartConfig::default(),
            strip_array_suffix: default_true(),
        }
    }
}

impl BindConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "max_body_size",
                "must be greater than zero",
            ));
        }
        if self.multipart.max_fields == 0 {
            return Err(ConfigError::invalid_value(
                "multipart.max_fields",
                "must be greater than zero",
            ));
        }
        if self.multipart.max_field_size == 0 {
            return Err(ConfigError::invalid_value(
                "multipart.max_field_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Sets the maximum body size.
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the maximum number of multipart fields.
    pub fn max_fields(mut self, count: usize) -> Self {
        self.multipart.max_fields = count;
        self
    }

    /// Sets the maximum size of one multipart field.
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.multipart.max_field_size = size;
        self
    }

    /// Sets whether `key[]` query keys are read as `key`.
    pub fn strip_array_suffix(mut self, strip: bool) -> Self {
        self.strip_array_suffix = strip;
        self
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_max_fields() -> usize {
    DEFAULT_MAX_FIELDS
}

fn default_max_field_size() -> usize {
    DEFAULT_MAX_FIELD_SIZE
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.multipart.max_fields, 100);
        assert_eq!(config.multipart.max_field_size, 1024 * 1024);
        assert!(config.strip_array_suffix);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(BindConfig::from_toml_str("").unwrap(), BindConfig::default());
    }

    #[test]
    fn test_nested_table() {
        let config = BindConfig::from_toml_str(
            r#"
            strip_array_suffix = false

            [multipart]
            max_fields = 5
            "#,
        )
        .unwrap();
        assert!(!config.strip_array_suffix);
        assert_eq!(config.multipart.max_fields, 5);
        assert_eq!(config.multipart.max_field_size, DEFAULT_MAX_FIELD_SIZE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BindConfig::from_toml_str("max_body = 1").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = BindConfig::from_toml_str("max_body_size = 0").unwrap_err();
        assert!(err.to_string().contains("max_body_size"));
    }
}
