//! Parameter sources.

use std::fmt;
use std::str::FromStr;

/// The request channel a field is declared to bind from.
///
/// A field declared with [`ParamSource::Json`] accepts values from every
/// channel. Any other source restricts the field to that channel alone, so
/// a `path` field cannot be overridden by a same-named query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// JSON body, and the fallback for every other channel.
    Json,
    /// URL-encoded or multipart form body.
    Form,
    /// Route (path) parameters.
    Path,
    /// Query string.
    Query,
    /// Request headers.
    Header,
}

impl ParamSource {
    /// Every source, in the order declarations are scanned.
    pub const ALL: [ParamSource; 5] = [
        ParamSource::Json,
        ParamSource::Form,
        ParamSource::Path,
        ParamSource::Query,
        ParamSource::Header,
    ];

    /// Returns the attribute name for this source.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Form => "form",
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }

    /// Returns true if a value arriving on `channel` may set a field
    /// declared with this source.
    pub fn can_set_from(self, channel: ParamSource) -> bool {
        self == Self::Json || self == channel
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter source `{0}`")]
pub struct UnknownSource(pub String);

impl FromStr for ParamSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_accepts_every_channel() {
        for channel in ParamSource::ALL {
            assert!(ParamSource::Json.can_set_from(channel));
        }
    }

    #[test]
    fn test_specific_source_accepts_only_itself() {
        assert!(ParamSource::Path.can_set_from(ParamSource::Path));
        assert!(!ParamSource::Path.can_set_from(ParamSource::Query));
        assert!(!ParamSource::Header.can_set_from(ParamSource::Json));
    }

    #[test]
    fn test_round_trip_names() {
        for source in ParamSource::ALL {
            assert_eq!(source.to_string().parse::<ParamSource>(), Ok(source));
        }
        assert!("cookie".parse::<ParamSource>().is_err());
    }
}
