//! The describe output and its parsed `<tag>-<distance>-g<hash>` view.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Trimmed output of a describe query, as embedded in the firmware.
///
/// Created fresh per invocation. Both the log line and the build flag are
/// derived from the same instance, so they can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersionString(String);

impl BuildVersionString {
    /// Trim surrounding whitespace from raw query output.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into tag, distance, and hash.
    pub fn parts(&self) -> Result<DescribeParts, ParseError> {
        self.0.parse()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BuildVersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a describe string could not be split into its components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty describe output")]
    Empty,

    #[error("missing `-g<hash>` suffix")]
    MissingHash,

    #[error("invalid abbreviated hash {0:?}")]
    InvalidHash(String),

    #[error("missing commit distance")]
    MissingDistance,

    #[error("invalid commit distance {0:?}")]
    InvalidDistance(String),

    #[error("missing tag")]
    MissingTag,
}

/// Components of a long-format describe string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeParts {
    /// Nearest reachable tag. May itself contain hyphens.
    pub tag: String,
    /// Commits between the tag and `HEAD`.
    pub distance: u32,
    /// Abbreviated commit hash, without the `g` prefix.
    pub hash: String,
    /// Whether `--dirty` marked the worktree as modified.
    pub dirty: bool,
}

impl DescribeParts {
    /// Whether `HEAD` is exactly the tagged commit.
    pub fn is_exact(&self) -> bool {
        self.distance == 0
    }
}

const MIN_HASH_LEN: usize = 4;
const MAX_HASH_LEN: usize = 40;

impl FromStr for DescribeParts {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        // Split from the right: tags like `release-2024-01` contain hyphens.
        let (rest, dirty) = match s.strip_suffix("-dirty") {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let (rest, hash_part) = rest.rsplit_once('-').ok_or(ParseError::MissingHash)?;
        let hash = hash_part
            .strip_prefix('g')
            .ok_or_else(|| ParseError::InvalidHash(hash_part.to_string()))?;
        let hash_ok = (MIN_HASH_LEN..=MAX_HASH_LEN).contains(&hash.len())
            && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !hash_ok {
            return Err(ParseError::InvalidHash(hash.to_string()));
        }

        let (tag, distance) = rest.rsplit_once('-').ok_or(ParseError::MissingDistance)?;
        // git prints a plain decimal count; reject `+1` or `007`.
        let canonical = !distance.is_empty()
            && distance.bytes().all(|b| b.is_ascii_digit())
            && (distance == "0" || !distance.starts_with('0'));
        let distance = distance
            .parse::<u32>()
            .ok()
            .filter(|_| canonical)
            .ok_or_else(|| ParseError::InvalidDistance(distance.to_string()))?;
        if tag.is_empty() {
            return Err(ParseError::MissingTag);
        }

        Ok(Self {
            tag: tag.to_string(),
            distance,
            hash: hash.to_string(),
            dirty,
        })
    }
}

impl fmt::Display for DescribeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-g{}", self.tag, self.distance, self.hash)?;
        if self.dirty {
            f.write_str("-dirty")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw_trims() {
        let v = BuildVersionString::from_raw("  v1.2.0-14-gabc1234\r\n");
        assert_eq!(v.as_str(), "v1.2.0-14-gabc1234");
        assert!(!v.is_empty());
        assert!(BuildVersionString::from_raw(" \n\t").is_empty());
    }

    #[test]
    fn test_parse_simple() {
        let parts: DescribeParts = "v1.2.0-14-gabc1234".parse().unwrap();
        assert_eq!(
            parts,
            DescribeParts {
                tag: "v1.2.0".to_string(),
                distance: 14,
                hash: "abc1234".to_string(),
                dirty: false,
            }
        );
        assert!(!parts.is_exact());
    }

    #[test]
    fn test_parse_exact_tag() {
        let parts: DescribeParts = "v1.0.0-0-g0123abcd".parse().unwrap();
        assert!(parts.is_exact());
        assert_eq!(parts.hash, "0123abcd");
    }

    #[test]
    fn test_parse_hyphenated_tag_and_dirty() {
        let parts: DescribeParts = "release-2024-01-3-gdeadbeef-dirty".parse().unwrap();
        assert_eq!(parts.tag, "release-2024-01");
        assert_eq!(parts.distance, 3);
        assert_eq!(parts.hash, "deadbeef");
        assert!(parts.dirty);
        assert_eq!(parts.to_string(), "release-2024-01-3-gdeadbeef-dirty");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<DescribeParts>(), Err(ParseError::Empty));
        assert_eq!("v1.0.0".parse::<DescribeParts>(), Err(ParseError::MissingHash));
        assert_eq!(
            "v1.0.0-abc1234".parse::<DescribeParts>(),
            Err(ParseError::InvalidHash("abc1234".to_string()))
        );
        assert_eq!(
            "v1.0.0-gXYZ1234".parse::<DescribeParts>(),
            Err(ParseError::InvalidHash("XYZ1234".to_string()))
        );
        assert_eq!(
            "gabc1234".parse::<DescribeParts>(),
            Err(ParseError::MissingHash)
        );
        assert_eq!(
            "14-gabc1234".parse::<DescribeParts>(),
            Err(ParseError::MissingDistance)
        );
        assert_eq!(
            "v1.0.0-x-gabc1234".parse::<DescribeParts>(),
            Err(ParseError::InvalidDistance("x".to_string()))
        );
        assert_eq!(
            "-3-gabc1234".parse::<DescribeParts>(),
            Err(ParseError::MissingTag)
        );
    }

    #[test]
    fn test_non_canonical_distance_rejected() {
        for input in ["v1-+1-gabcd", "v1-01-gabcd", "v1--gabcd"] {
            assert!(
                matches!(input.parse::<DescribeParts>(), Err(ParseError::InvalidDistance(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_short_hash_rejected() {
        assert!("v1-0-gab".parse::<DescribeParts>().is_err());
    }
}
