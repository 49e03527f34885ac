//! Asset tag enumeration.

use serde::{Deserialize, Serialize};

/// Label attached to an asset so callers can filter the library.
///
/// The store never interprets tags itself.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetTag {
    /// Film reel frame shown on the drawing screen
    #[display("film")]
    Film,
    /// Idle screensaver image
    #[display("screensaver")]
    Screensaver,
    /// Prize photo
    #[display("prize")]
    Prize,
}

impl AssetTag {
    /// Convert to the string stored in the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetTag::Film => "film",
            AssetTag::Screensaver => "screensaver",
            AssetTag::Prize => "prize",
        }
    }
}

impl std::str::FromStr for AssetTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "film" => Ok(AssetTag::Film),
            "screensaver" => Ok(AssetTag::Screensaver),
            "prize" => Ok(AssetTag::Prize),
            _ => Err(format!("Unknown asset tag: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn display_matches_index_form() {
        for tag in AssetTag::iter() {
            assert_eq!(tag.to_string(), tag.as_str());
            assert_eq!(tag.as_str().parse::<AssetTag>().unwrap(), tag);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Prize".parse::<AssetTag>().unwrap(), AssetTag::Prize);
        assert!("poster".parse::<AssetTag>().is_err());
    }
}
