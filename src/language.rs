//! Language tags and region codes as they arrive from the front end.
//!
//! Both types normalize on parse so that the rest of the crate can compare
//! and substitute them without caring how the caller spelled them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A BCP-47 language tag in canonical case.
///
/// Canonical case follows RFC 5646 §2.1.1: the primary language and
/// variants are lowercase, a four letter script is title case and a region
/// is uppercase (`EN-us` becomes `en-US`, `zh_hant_tw` becomes `zh-Hant-TW`).
/// Underscores are accepted as separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag {
    canonical: String,
}

impl LanguageTag {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidLanguage(raw.to_string()));
        }

        let mut subtags = Vec::new();
        let mut private_use = false;

        for (position, subtag) in raw.split(['-', '_']).enumerate() {
            if subtag.is_empty()
                || subtag.len() > 8
                || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(Error::InvalidLanguage(raw.to_string()));
            }

            if position == 0 {
                if subtag.len() < 2
                    || !subtag.chars().all(|c| c.is_ascii_alphabetic())
                {
                    return Err(Error::InvalidLanguage(raw.to_string()));
                }
                subtags.push(subtag.to_ascii_lowercase());
                continue;
            }

            // Everything after a singleton keeps its lowercase form.
            if private_use || subtag.len() == 1 {
                private_use = true;
                subtags.push(subtag.to_ascii_lowercase());
                continue;
            }

            let alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
            let digits = subtag.chars().all(|c| c.is_ascii_digit());
            let canonical = match subtag.len() {
                4 if alpha => title_case_ascii(subtag),
                2 if alpha => subtag.to_ascii_uppercase(),
                3 if digits => subtag.to_string(),
                _ => subtag.to_ascii_lowercase(),
            };
            subtags.push(canonical);
        }

        Ok(Self {
            canonical: subtags.join("-"),
        })
    }

    pub fn english() -> Self {
        Self {
            canonical: "en".to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The primary language subtag (`pt` for `pt-BR`).
    pub fn primary(&self) -> &str {
        self.canonical
            .split('-')
            .next()
            .unwrap_or(&self.canonical)
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl std::str::FromStr for LanguageTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.canonical
    }
}

fn title_case_ascii(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// An ISO-3166-1 alpha-2 region, or no region at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    code: Option<String>,
}

impl Region {
    /// Parse a region code. An empty string means "no region".
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::none());
        }

        if raw.len() != 2 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidRegion(raw.to_string()));
        }

        Ok(Self {
            code: Some(raw.to_ascii_uppercase()),
        })
    }

    pub fn none() -> Self {
        Self { code: None }
    }

    pub fn is_none(&self) -> bool {
        self.code.is_none()
    }

    /// The lowercase key used to look up bang region templates.
    pub fn key(&self) -> Option<String> {
        self.code.as_ref().map(|c| c.to_ascii_lowercase())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code.as_deref().unwrap_or(""))
    }
}

impl std::str::FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_canonical_case() {
        assert_eq!(LanguageTag::parse("EN").unwrap().as_str(), "en");
        assert_eq!(LanguageTag::parse("en-us").unwrap().as_str(), "en-US");
        assert_eq!(
            LanguageTag::parse("zh_hant_tw").unwrap().as_str(),
            "zh-Hant-TW"
        );
        assert_eq!(LanguageTag::parse("es-419").unwrap().as_str(), "es-419");
    }

    #[test]
    fn language_private_use_stays_lowercase() {
        let tag = LanguageTag::parse("en-x-PIG-latn").unwrap();
        assert_eq!(tag.as_str(), "en-x-pig-latn");
    }

    #[test]
    fn language_rejects_garbage() {
        assert!(LanguageTag::parse("").is_err());
        assert!(LanguageTag::parse("e").is_err());
        assert!(LanguageTag::parse("en--us").is_err());
        assert!(LanguageTag::parse("en-toolongsubtag").is_err());
        assert!(LanguageTag::parse("1n").is_err());
    }

    #[test]
    fn language_primary() {
        assert_eq!(LanguageTag::parse("pt-BR").unwrap().primary(), "pt");
        assert_eq!(LanguageTag::english().primary(), "en");
    }

    #[test]
    fn language_serde_uses_canonical_string() {
        let tag: LanguageTag = serde_json::from_str("\"fr-ca\"").unwrap();
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"fr-CA\"");
        assert!(serde_json::from_str::<LanguageTag>("\"!\"").is_err());
    }

    #[test]
    fn region_key_is_lowercase() {
        let region = Region::parse("CA").unwrap();
        assert_eq!(region.key().as_deref(), Some("ca"));
        assert_eq!(region.to_string(), "CA");

        let mixed = Region::parse("fR").unwrap();
        assert_eq!(mixed.key().as_deref(), Some("fr"));
    }

    #[test]
    fn empty_region_has_no_key() {
        let region = Region::parse("  ").unwrap();
        assert!(region.is_none());
        assert_eq!(region.key(), None);
    }

    #[test]
    fn region_rejects_non_alpha2() {
        assert!(Region::parse("USA").is_err());
        assert!(Region::parse("1A").is_err());
    }
}
