//! Settings for the router and the command line.
//!
//! Read from a TOML file, then overridden by `QUERYROUTE_*` environment
//! variables. Every field has a default, so an empty file is valid.

use std::{path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    bangs::{Bang, Bangs, TermEncoding, defaults::default_bangs},
    error::{Error, Result},
    language::LanguageTag,
};

/// Prefix of the environment variables [`Settings::apply_env`] reads.
pub const ENV_PREFIX: &str = "QUERYROUTE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Request parameter holding the query.
    pub query_var: String,
    /// Deadline applied to requests that carry none. Zero disables it.
    pub timeout_ms: u64,
    /// Language used when the caller does not send one.
    pub default_language: LanguageTag,
    pub suggest: SuggestSettings,
    pub bangs: BangSettings,
    pub stock: StockSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestSettings {
    pub size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BangSettings {
    pub term_encoding: TermEncoding,
    /// Replace built-in bangs by name, or add new ones.
    #[serde(rename = "bang", skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Bang>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StockSettings {
    /// JSON array of quotes served by the stock answerer. Without it the
    /// stock answerer is not registered.
    pub quotes_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_var: "q".to_string(),
            timeout_ms: 5000,
            default_language: LanguageTag::english(),
            suggest: SuggestSettings::default(),
            bangs: BangSettings::default(),
            stock: StockSettings::default(),
        }
    }
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self { size: 10 }
    }
}

impl Settings {
    /// Read `path` if given, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("{}: {e}", path.display()))
                })?;
                tracing::debug!(path = %path.display(), "loaded settings");
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        settings.apply_env(std::env::vars())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `QUERYROUTE_*` overrides from `vars`. Unrelated variables are
    /// ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let invalid =
                |e: &dyn std::fmt::Display| Error::Config(format!("{key}={value:?}: {e}"));

            match name {
                "QUERY_VAR" => self.query_var = value.clone(),
                "TIMEOUT_MS" => {
                    self.timeout_ms = value.parse().map_err(|e| invalid(&e))?;
                }
                "DEFAULT_LANGUAGE" => {
                    self.default_language = LanguageTag::parse(&value)?;
                }
                "SUGGEST_SIZE" => {
                    self.suggest.size = value.parse().map_err(|e| invalid(&e))?;
                }
                "TERM_ENCODING" => {
                    self.bangs.term_encoding = match value.as_str() {
                        "literal" => TermEncoding::Literal,
                        "percent" => TermEncoding::Percent,
                        _ => return Err(invalid(&"expected literal or percent")),
                    };
                }
                "QUOTES_FILE" => {
                    self.stock.quotes_file = Some(PathBuf::from(&value));
                }
                _ => continue,
            }
            tracing::debug!(%key, "settings override from environment");
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.query_var.trim().is_empty() {
            return Err(Error::Config("query_var is empty".into()));
        }
        Ok(())
    }

    /// `None` when the timeout is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// The built-in bangs with this file's overrides applied.
    pub fn build_bangs(&self) -> Result<Bangs> {
        Ok(
            Bangs::with_overrides(default_bangs(), self.bangs.overrides.clone())?
                .with_encoding(self.bangs.term_encoding),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Region;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.query_var, "q");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(settings.suggest.size, 10);
        assert_eq!(settings.bangs.term_encoding, TermEncoding::Literal);
    }

    #[test]
    fn full_file() {
        let settings = Settings::from_toml(
            r#"
            query_var = "query"
            timeout_ms = 250
            default_language = "fr-ca"

            [suggest]
            size = 3

            [bangs]
            term_encoding = "percent"

            [[bangs.bang]]
            name = "Reddit"
            triggers = ["r", "reddit"]
            regions = { default = "https://old.reddit.com/search?q={{{term}}}" }

            [stock]
            quotes_file = "/srv/quotes.json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.query_var, "query");
        assert_eq!(settings.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(settings.default_language.as_str(), "fr-CA");
        assert_eq!(settings.suggest.size, 3);
        assert_eq!(settings.bangs.overrides.len(), 1);
        assert_eq!(
            settings.stock.quotes_file.as_deref(),
            Some(Path::new("/srv/quotes.json"))
        );

        let bangs = settings.build_bangs().unwrap();
        assert_eq!(bangs.encoding(), TermEncoding::Percent);
        assert_eq!(
            bangs.detect("!r rust lang", &Region::none(), &LanguageTag::english()),
            Some("https://old.reddit.com/search?q=rust%20lang".into())
        );
        assert_eq!(bangs.len(), default_bangs().len());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml("query_vr = \"q\"").is_err());
        assert!(Settings::from_toml("[suggest]\nlimit = 3").is_err());
    }

    #[test]
    fn invalid_override_fails_registry_build() {
        let settings = Settings::from_toml(
            r#"
            [[bangs.bang]]
            name = "Broken"
            triggers = ["broken"]
            regions = { ca = "https://example.com/?q={{{term}}}" }
            "#,
        )
        .unwrap();
        assert!(matches!(
            settings.build_bangs(),
            Err(Error::InvalidBang { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("QUERYROUTE_QUERY_VAR", "query"),
                ("QUERYROUTE_TIMEOUT_MS", "0"),
                ("QUERYROUTE_DEFAULT_LANGUAGE", "DE"),
                ("QUERYROUTE_SUGGEST_SIZE", "25"),
                ("QUERYROUTE_TERM_ENCODING", "percent"),
                ("QUERYROUTE_QUOTES_FILE", "quotes.json"),
                ("QUERYROUTE_LOG", "debug"),
                ("HOME", "/root"),
            ]))
            .unwrap();

        assert_eq!(settings.query_var, "query");
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.default_language.as_str(), "de");
        assert_eq!(settings.suggest.size, 25);
        assert_eq!(settings.bangs.term_encoding, TermEncoding::Percent);
        assert_eq!(
            settings.stock.quotes_file.as_deref(),
            Some(Path::new("quotes.json"))
        );
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.apply_env(env(&[("QUERYROUTE_TIMEOUT_MS", "soon")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            settings.apply_env(env(&[("QUERYROUTE_TERM_ENCODING", "base64")])),
            Err(Error::Config(_))
        ));
        assert!(
            settings
                .apply_env(env(&[("QUERYROUTE_DEFAULT_LANGUAGE", "not a tag")]))
                .is_err()
        );
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("queryroute.toml");
        std::fs::write(&path, "[suggest]\nsize = 4\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.suggest.size, 4);

        assert!(Settings::load(Some(&tmp.path().join("missing.toml"))).is_err());
    }
}
