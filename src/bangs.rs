//! `!bang` shortcuts: a query token such as `!g` or `wikipedia!` redirects the
//! rest of the query to another site's search page.
//!
//! The registry is an ordered list. Triggers may repeat across bangs; the
//! first bang in registry order wins, both for dispatch and for naming
//! autocomplete suggestions. [`Bangs::collisions`] reports the shadowed ones.

use std::collections::{BTreeMap, HashMap};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    language::{LanguageTag, Region},
};

pub mod defaults;
pub mod suggest;
pub mod tantivy_suggester;
pub mod transform;

pub use suggest::{MemorySuggester, Results, Suggester, Suggestion, rebuild};
pub use tantivy_suggester::TantivySuggester;
pub use transform::Transformation;

/// Region key every bang must define.
pub const DEFAULT_REGION: &str = "default";

/// Placeholder replaced with the (transformed) query remainder.
pub const TERM_PLACEHOLDER: &str = "{{{term}}}";

/// Placeholder replaced with the canonical language tag.
pub const LANG_PLACEHOLDER: &str = "{{{lang}}}";

/// RFC 3986 unreserved characters pass through, everything else is escaped.
const TERM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A single bang definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bang {
    pub name: String,
    pub triggers: Vec<String>,
    /// Lowercase region code -> URL template. Must contain [`DEFAULT_REGION`].
    pub regions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<Transformation>,
}

impl Bang {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidBang {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".into()));
        }

        if self.triggers.is_empty() {
            return Err(invalid("no triggers".into()));
        }

        for trigger in &self.triggers {
            if trigger.is_empty()
                || trigger.contains('!')
                || trigger.chars().any(char::is_whitespace)
            {
                return Err(invalid(format!("malformed trigger {trigger:?}")));
            }
            if *trigger != trigger.to_lowercase() {
                return Err(invalid(format!(
                    "trigger {trigger:?} is not lowercase"
                )));
            }
        }

        if !self.regions.contains_key(DEFAULT_REGION) {
            return Err(invalid(format!("missing '{DEFAULT_REGION}' region")));
        }

        for (region, template) in &self.regions {
            if *region != region.to_lowercase() {
                return Err(invalid(format!(
                    "region key {region:?} is not lowercase"
                )));
            }
            if template.trim().is_empty() {
                return Err(invalid(format!("empty template for {region:?}")));
            }

            let stripped =
                template.replace(TERM_PLACEHOLDER, "").replace(LANG_PLACEHOLDER, "");
            if stripped.contains("{{{") || stripped.contains("}}}") {
                return Err(invalid(format!(
                    "malformed placeholder in {region:?} template"
                )));
            }
        }

        Ok(())
    }

    /// Whether `key` (already lowercased, without `!`) is one of our triggers.
    pub fn answers_to(&self, key: &str) -> bool {
        self.triggers.iter().any(|t| t == key)
    }

    /// The template for `region`, falling back to the default region.
    pub fn template(&self, region: &Region) -> &str {
        region
            .key()
            .and_then(|key| self.regions.get(&key))
            .or_else(|| self.regions.get(DEFAULT_REGION))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// How the remainder is written into the URL template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermEncoding {
    /// Substitute the remainder as-is; escaping is left to the caller.
    #[default]
    Literal,
    /// Percent-encode everything except RFC 3986 unreserved characters.
    Percent,
}

impl TermEncoding {
    fn encode(self, term: &str) -> String {
        match self {
            TermEncoding::Literal => term.to_string(),
            TermEncoding::Percent => {
                utf8_percent_encode(term, TERM_COMPONENT).to_string()
            }
        }
    }
}

/// A trigger claimed by more than one bang.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub trigger: String,
    /// The bang that receives the trigger (first in registry order).
    pub winner: String,
    /// Bangs that also list the trigger but never see it.
    pub shadowed: Vec<String>,
}

/// The validated, read-only bang registry.
#[derive(Debug, Clone)]
pub struct Bangs {
    bangs: Vec<Bang>,
    encoding: TermEncoding,
}

impl Bangs {
    /// Validate `bangs` and build a registry in the given order.
    pub fn new(bangs: Vec<Bang>) -> Result<Self> {
        for bang in &bangs {
            bang.validate()?;
        }

        let registry = Self {
            bangs,
            encoding: TermEncoding::default(),
        };

        for collision in registry.collisions() {
            tracing::warn!(
                trigger = %collision.trigger,
                winner = %collision.winner,
                shadowed = ?collision.shadowed,
                "bang trigger is shadowed"
            );
        }

        Ok(registry)
    }

    /// The built-in catalog from [`defaults::default_bangs`].
    pub fn defaults() -> Result<Self> {
        Self::new(defaults::default_bangs())
    }

    /// Apply `overrides` on top of `base` and validate the result.
    ///
    /// An override whose name matches an existing bang replaces that bang in
    /// place; only that bang changes. Other overrides are appended.
    pub fn with_overrides(base: Vec<Bang>, overrides: Vec<Bang>) -> Result<Self> {
        let mut bangs = base;
        for bang in overrides {
            match bangs.iter_mut().find(|b| b.name == bang.name) {
                Some(existing) => *existing = bang,
                None => bangs.push(bang),
            }
        }
        Self::new(bangs)
    }

    pub fn with_encoding(mut self, encoding: TermEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> TermEncoding {
        self.encoding
    }

    pub fn bangs(&self) -> &[Bang] {
        &self.bangs
    }

    pub fn len(&self) -> usize {
        self.bangs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bangs.is_empty()
    }

    /// The first bang in registry order that lists `trigger`.
    pub fn owner(&self, trigger: &str) -> Option<&Bang> {
        self.bangs.iter().find(|b| b.answers_to(trigger))
    }

    /// Look for a bang token in `q` and build the redirect URL.
    ///
    /// Tokens are scanned left to right. A token is a candidate when it
    /// starts or ends with `!` (a lone `!` never is); its key is the token
    /// lowercased with every leading and trailing `!` removed. The first
    /// candidate whose key names a bang wins. The remaining tokens, joined by
    /// single spaces, form the search term, including any later bang tokens.
    pub fn detect(
        &self,
        q: &str,
        region: &Region,
        language: &LanguageTag,
    ) -> Option<String> {
        let fields: Vec<&str> = q.split_whitespace().collect();

        for (i, field) in fields.iter().enumerate() {
            if *field == "!" || (!field.starts_with('!') && !field.ends_with('!'))
            {
                continue;
            }

            let key = field.trim_matches('!').to_lowercase();
            let Some(bang) = self.owner(&key) else {
                continue;
            };

            let mut remainder = fields
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, f)| *f)
                .collect::<Vec<_>>()
                .join(" ");

            for transformation in &bang.transformations {
                remainder = transformation.apply(&remainder);
            }

            let term = self.encoding.encode(&remainder);
            let url = bang
                .template(region)
                .replace(TERM_PLACEHOLDER, &term)
                .replace(LANG_PLACEHOLDER, language.as_str());

            tracing::debug!(bang = %bang.name, trigger = %key, "bang matched");
            return Some(url);
        }

        None
    }

    /// Autocomplete bang triggers and fill in the owning bang's name.
    pub fn suggest<S>(
        &self,
        suggester: &S,
        term: &str,
        size: usize,
    ) -> Result<Results>
    where
        S: Suggester + ?Sized,
    {
        let mut results = suggester.suggest(term, size)?;
        for suggestion in &mut results.suggestions {
            if let Some(bang) = self.owner(&suggestion.trigger) {
                suggestion.name = bang.name.clone();
            }
        }
        Ok(results)
    }

    /// Triggers listed by more than one bang, in order of first appearance.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut collisions: Vec<Collision> = Vec::new();
        let mut seen: HashMap<&str, (usize, Option<usize>)> = HashMap::new();

        for (owner, bang) in self.bangs.iter().enumerate() {
            for trigger in &bang.triggers {
                match seen.get_mut(trigger.as_str()) {
                    None => {
                        seen.insert(trigger, (owner, None));
                    }
                    Some((first, _)) if *first == owner => {}
                    Some((first, slot)) => {
                        let at = match slot {
                            Some(at) => *at,
                            None => {
                                collisions.push(Collision {
                                    trigger: trigger.clone(),
                                    winner: self.bangs[*first].name.clone(),
                                    shadowed: Vec::new(),
                                });
                                *slot = Some(collisions.len() - 1);
                                collisions.len() - 1
                            }
                        };
                        let shadowed = &mut collisions[at].shadowed;
                        if !shadowed.contains(&bang.name) {
                            shadowed.push(bang.name.clone());
                        }
                    }
                }
            }
        }

        collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(tag: &str) -> LanguageTag {
        LanguageTag::parse(tag).unwrap()
    }

    fn region(code: &str) -> Region {
        Region::parse(code).unwrap()
    }

    fn registry() -> Bangs {
        Bangs::defaults().unwrap()
    }

    fn custom(name: &str, triggers: &[&str], template: &str) -> Bang {
        Bang {
            name: name.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            regions: BTreeMap::from([(
                DEFAULT_REGION.to_string(),
                template.to_string(),
            )]),
            transformations: Vec::new(),
        }
    }

    #[test]
    fn google_default_region() {
        let url = registry().detect("!g hello world", &region(""), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://encrypted.google.com/search?hl=en&q=hello world")
        );
    }

    #[test]
    fn amazon_regional_template() {
        let url = registry().detect("!a beach chair", &region("FR"), &lang("fr"));
        assert_eq!(
            url.as_deref(),
            Some(
                "https://www.amazon.fr/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords=beach chair"
            )
        );
    }

    #[test]
    fn unknown_region_falls_back_to_default() {
        let url = registry().detect("!a beach chair", &region("DE"), &lang("de"));
        assert_eq!(
            url.as_deref(),
            Some(
                "https://www.amazon.com/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords=beach chair"
            )
        );
    }

    #[test]
    fn bang_in_middle_of_query_with_wikipedia_title() {
        let url =
            registry().detect("hello !w bob marley", &region(""), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Hello_Bob_Marley")
        );
    }

    #[test]
    fn lone_exclamation_never_matches() {
        assert_eq!(
            registry().detect("just a ! standalone", &region(""), &lang("en")),
            None
        );
    }

    #[test]
    fn empty_query_is_no_match() {
        assert_eq!(registry().detect("", &region(""), &lang("en")), None);
        assert_eq!(registry().detect("   ", &region(""), &lang("en")), None);
    }

    #[test]
    fn all_leading_exclamations_are_stripped() {
        let url = registry().detect("!!w bob marley", &region(""), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Bob_Marley")
        );
    }

    #[test]
    fn trailing_and_surrounding_exclamations() {
        let bangs = registry();
        let expected = Some("https://www.bing.com/search?q=rust".to_string());
        assert_eq!(bangs.detect("rust b!", &region(""), &lang("en")), expected);
        assert_eq!(bangs.detect("!bing! rust", &region(""), &lang("en")), expected);
    }

    #[test]
    fn trigger_is_case_insensitive() {
        let url = registry().detect("!GH tokio", &region(""), &lang("en"));
        assert!(url.unwrap().starts_with("https://github.com/search?q=tokio&"));
    }

    #[test]
    fn mixed_case_region_is_lowercased() {
        let url = registry().detect("!g maple", &region("CA"), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://www.google.ca/search?q=maple")
        );

        let url = registry().detect("!g maple", &region("cA"), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://www.google.ca/search?q=maple")
        );
    }

    #[test]
    fn only_first_matching_bang_fires() {
        let url = registry().detect("!g !b rust", &region(""), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://encrypted.google.com/search?hl=en&q=!b rust")
        );
    }

    #[test]
    fn unknown_bang_is_skipped_for_a_later_one() {
        let url = registry().detect("!nope rust !b", &region(""), &lang("en"));
        assert_eq!(
            url.as_deref(),
            Some("https://www.bing.com/search?q=!nope rust")
        );
    }

    #[test]
    fn language_uses_canonical_form() {
        let url = registry().detect("!g chat", &region(""), &lang("FR-ca"));
        assert_eq!(
            url.as_deref(),
            Some("https://encrypted.google.com/search?hl=fr-CA&q=chat")
        );
    }

    #[test]
    fn every_placeholder_is_replaced() {
        let bangs = Bangs::new(vec![custom(
            "Twice",
            &["t"],
            "https://x.test/{{{lang}}}/{{{term}}}?again={{{term}}}&l={{{lang}}}",
        )])
        .unwrap();
        let url = bangs.detect("!t a b", &region(""), &lang("de")).unwrap();
        assert_eq!(url, "https://x.test/de/a b?again=a b&l=de");
        assert!(!url.contains(TERM_PLACEHOLDER));
        assert!(!url.contains(LANG_PLACEHOLDER));
    }

    #[test]
    fn default_catalog_fully_substitutes() {
        let bangs = registry();
        for bang in bangs.bangs() {
            for trigger in &bang.triggers {
                for code in ["", "CA", "FR", "UK", "RU", "ES", "DE", "US"] {
                    let q = format!("!{trigger} some query");
                    let url = bangs.detect(&q, &region(code), &lang("en")).unwrap();
                    assert!(!url.contains(TERM_PLACEHOLDER), "{url}");
                    assert!(!url.contains(LANG_PLACEHOLDER), "{url}");
                }
            }
        }
    }

    #[test]
    fn default_catalog_invariants() {
        for bang in registry().bangs() {
            assert!(!bang.triggers.is_empty(), "{}", bang.name);
            assert!(bang.regions.contains_key(DEFAULT_REGION), "{}", bang.name);
        }
    }

    #[test]
    fn detection_is_deterministic() {
        let bangs = registry();
        let first = bangs.detect("rust !so lifetimes", &region("US"), &lang("en"));
        for _ in 0..10 {
            assert_eq!(
                bangs.detect("rust !so lifetimes", &region("US"), &lang("en")),
                first
            );
        }
    }

    #[test]
    fn percent_encoding_hook() {
        let bangs = registry().with_encoding(TermEncoding::Percent);
        let url = bangs
            .detect("!b fish & chips #1", &region(""), &lang("en"))
            .unwrap();
        assert_eq!(url, "https://www.bing.com/search?q=fish%20%26%20chips%20%231");

        let url = bangs.detect("!w bob marley", &region(""), &lang("en")).unwrap();
        assert_eq!(url, "https://en.wikipedia.org/wiki/Bob_Marley");
    }

    #[test]
    fn missing_default_region_is_rejected() {
        let mut bang = custom("Broken", &["x"], "https://x.test/{{{term}}}");
        bang.regions = BTreeMap::from([(
            "fr".to_string(),
            "https://x.fr/{{{term}}}".to_string(),
        )]);

        let err = Bangs::new(vec![bang]).unwrap_err();
        assert!(matches!(err, Error::InvalidBang { ref name, .. } if name == "Broken"));
    }

    #[test]
    fn empty_triggers_are_rejected() {
        let bang = custom("Silent", &[], "https://x.test/{{{term}}}");
        assert!(Bangs::new(vec![bang]).is_err());
    }

    #[test]
    fn uppercase_trigger_is_rejected() {
        let bang = custom("Loud", &["X"], "https://x.test/{{{term}}}");
        assert!(Bangs::new(vec![bang]).is_err());
    }

    #[test]
    fn malformed_placeholder_is_rejected() {
        for template in [
            "https://x.test/{{{query}}}",
            "https://x.test/{{{term}}",
            "https://x.test/{{term}}}",
        ] {
            let bang = custom("Typo", &["t"], template);
            assert!(Bangs::new(vec![bang]).is_err(), "{template}");
        }
    }

    #[test]
    fn collisions_first_bang_wins() {
        let bangs = Bangs::new(vec![
            custom("First", &["x", "one"], "https://first.test/{{{term}}}"),
            custom("Second", &["x"], "https://second.test/{{{term}}}"),
            custom("Third", &["x", "one"], "https://third.test/{{{term}}}"),
        ])
        .unwrap();

        assert_eq!(
            bangs.detect("!x q", &region(""), &lang("en")).as_deref(),
            Some("https://first.test/q")
        );

        let collisions = bangs.collisions();
        assert_eq!(
            collisions,
            vec![
                Collision {
                    trigger: "x".into(),
                    winner: "First".into(),
                    shadowed: vec!["Second".into(), "Third".into()],
                },
                Collision {
                    trigger: "one".into(),
                    winner: "First".into(),
                    shadowed: vec!["Third".into()],
                },
            ]
        );
    }

    #[test]
    fn default_catalog_has_no_collisions() {
        assert!(registry().collisions().is_empty());
    }

    #[test]
    fn override_replaces_only_named_bang() {
        let replacement = custom("Bing", &["b", "bing"], "https://bing.test/?q={{{term}}}");
        let added = custom("Crates", &["crates"], "https://crates.io/search?q={{{term}}}");

        let bangs = Bangs::with_overrides(
            defaults::default_bangs(),
            vec![replacement, added],
        )
        .unwrap();

        assert_eq!(bangs.len(), defaults::default_bangs().len() + 1);
        assert_eq!(bangs.bangs()[1].name, "Bing");
        assert_eq!(
            bangs.detect("!b q", &region(""), &lang("en")).as_deref(),
            Some("https://bing.test/?q=q")
        );
        assert_eq!(
            bangs.detect("!crates serde", &region(""), &lang("en")).as_deref(),
            Some("https://crates.io/search?q=serde")
        );
        assert!(bangs.detect("!g q", &region(""), &lang("en")).is_some());
    }

    #[test]
    fn bang_deserializes_with_named_transformations() {
        let bang: Bang = serde_json::from_str(
            r#"{
                "name": "Wiki FR",
                "triggers": ["wfr"],
                "regions": {"default": "https://fr.wikipedia.org/wiki/{{{term}}}"},
                "transformations": ["wikipedia_canonical"]
            }"#,
        )
        .unwrap();
        let bangs = Bangs::new(vec![bang]).unwrap();
        assert_eq!(
            bangs.detect("!wfr victor hugo", &region(""), &lang("fr")).as_deref(),
            Some("https://fr.wikipedia.org/wiki/Victor_Hugo")
        );
    }
}
