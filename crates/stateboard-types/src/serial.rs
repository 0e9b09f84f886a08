use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Version number of a snapshot within one state.
///
/// Serials are assigned by the store at write time and are strictly
/// increasing in capture order. Two snapshots of the same state never share
/// a serial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(u64);

impl Serial {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Serial {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Serial> for u64 {
    fn from(serial: Serial) -> Self {
        serial.0
    }
}

/// A caller-supplied version selector.
///
/// On the wire a token is a string: the empty string and the literal `0`
/// both select the latest snapshot, any other non-negative integer selects
/// that serial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VersionToken {
    #[default]
    Latest,
    Serial(Serial),
}

impl VersionToken {
    /// Parse a wire token.
    ///
    /// Anything that is neither empty nor a non-negative integer is rejected
    /// with [`TypeError::InvalidVersionToken`]. Whether the serial exists is
    /// not checked here.
    pub fn parse(token: &str) -> Result<Self, TypeError> {
        if token.is_empty() {
            return Ok(Self::Latest);
        }
        let value: u64 = token
            .parse()
            .map_err(|_| TypeError::InvalidVersionToken(token.to_string()))?;
        Ok(Self::from(value))
    }

    /// Parse an optional token, treating an absent one as `Latest`.
    pub fn parse_opt(token: Option<&str>) -> Result<Self, TypeError> {
        token.map_or(Ok(Self::Latest), Self::parse)
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl From<u64> for VersionToken {
    fn from(value: u64) -> Self {
        if value == 0 {
            Self::Latest
        } else {
            Self::Serial(Serial(value))
        }
    }
}

impl From<Serial> for VersionToken {
    fn from(serial: Serial) -> Self {
        Self::from(serial.0)
    }
}

impl FromStr for VersionToken {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Serial(serial) => write!(f, "{serial}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_latest() {
        assert_eq!(VersionToken::parse("").unwrap(), VersionToken::Latest);
        assert_eq!(VersionToken::parse_opt(None).unwrap(), VersionToken::Latest);
    }

    #[test]
    fn zero_token_is_latest() {
        assert_eq!(VersionToken::parse("0").unwrap(), VersionToken::Latest);
    }

    #[test]
    fn numeric_token_is_serial() {
        assert_eq!(
            VersionToken::parse("42").unwrap(),
            VersionToken::Serial(Serial::new(42))
        );
    }

    #[test]
    fn malformed_tokens_rejected() {
        for token in ["abc", "-1", "1.5", " 3", "0x10"] {
            assert_eq!(
                VersionToken::parse(token),
                Err(TypeError::InvalidVersionToken(token.to_string())),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn serial_ordering() {
        assert!(Serial::new(1) < Serial::new(7));
        assert_eq!(Serial::from(3u64).get(), 3);
    }

    #[test]
    fn serial_serializes_as_number() {
        let json = serde_json::to_string(&Serial::new(9)).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn token_display() {
        assert_eq!(VersionToken::Latest.to_string(), "latest");
        assert_eq!(VersionToken::from(5u64).to_string(), "5");
    }
}
