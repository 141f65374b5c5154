//! The built-in bang catalog.
//!
//! Without a region the `default` template is used; with one, the regional
//! template wins when the bang has it:
//!
//! - region US, language fr, `!a` -> amazon.com
//! - region FR, language en, `!a` -> amazon.fr
//!
//! Some sites ignore the `{{{lang}}}` value or only understand the primary
//! subtag (`pt` but not `pt-BR`).

use std::collections::BTreeMap;

use super::{Bang, DEFAULT_REGION, Transformation};

fn bang(
    name: &str,
    triggers: &[&str],
    regions: &[(&str, &str)],
    transformations: &[Transformation],
) -> Bang {
    Bang {
        name: name.to_string(),
        triggers: triggers.iter().map(|t| t.to_string()).collect(),
        regions: regions
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        transformations: transformations.to_vec(),
    }
}

pub fn default_bangs() -> Vec<Bang> {
    vec![
        bang(
            "Amazon",
            &["a", "amazon"],
            &[
                (
                    DEFAULT_REGION,
                    "https://www.amazon.com/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords={{{term}}}",
                ),
                (
                    "ca",
                    "https://www.amazon.ca/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords={{{term}}}",
                ),
                (
                    "fr",
                    "https://www.amazon.fr/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords={{{term}}}",
                ),
                (
                    "uk",
                    "https://www.amazon.co.uk/s/ref=nb_sb_noss?url=search-alias%3Daps&field-keywords={{{term}}}",
                ),
            ],
            &[],
        ),
        bang(
            "Bing",
            &["b", "bing"],
            &[(DEFAULT_REGION, "https://www.bing.com/search?q={{{term}}}")],
            &[],
        ),
        bang(
            "GitHub",
            &["gh", "git", "github"],
            &[(
                DEFAULT_REGION,
                "https://github.com/search?q={{{term}}}&type=Everything&repo=&langOverride=&start_value=1",
            )],
            &[],
        ),
        bang(
            "Google",
            &["g", "google"],
            &[
                (
                    DEFAULT_REGION,
                    "https://encrypted.google.com/search?hl={{{lang}}}&q={{{term}}}",
                ),
                ("ca", "https://www.google.ca/search?q={{{term}}}"),
                ("fr", "https://www.google.fr/search?hl={{{lang}}}&q={{{term}}}"),
                ("ru", "https://www.google.ru/search?hl={{{lang}}}&q={{{term}}}"),
            ],
            &[],
        ),
        bang(
            "Google France",
            &["gfr", "googlefr"],
            &[(
                DEFAULT_REGION,
                "https://www.google.fr/search?hl={{{lang}}}&q={{{term}}}",
            )],
            &[],
        ),
        bang(
            "Google Images",
            &["gi"],
            &[(
                DEFAULT_REGION,
                "https://www.google.com/search?q={{{term}}}&source=lnms&tbm=isch",
            )],
            &[],
        ),
        bang(
            "Google Russia",
            &["gru", "googleru"],
            &[(
                DEFAULT_REGION,
                "https://www.google.ru/search?hl={{{lang}}}&q={{{term}}}",
            )],
            &[],
        ),
        bang(
            "Reddit",
            &["reddit"],
            &[(
                DEFAULT_REGION,
                "https://www.reddit.com/search?q={{{term}}}&restrict_sr=&sort=relevance&t=all",
            )],
            &[],
        ),
        bang(
            "Stack Overflow",
            &["so", "stackoverflow"],
            &[(DEFAULT_REGION, "https://stackoverflow.com/search?q={{{term}}}")],
            &[],
        ),
        // Keyed by region although Wikipedia editions are per language; the
        // es/de/fr keys only work because they coincide with language codes.
        bang(
            "Wikipedia",
            &["w", "wikipedia"],
            &[
                (DEFAULT_REGION, "https://en.wikipedia.org/wiki/{{{term}}}"),
                ("es", "https://es.wikipedia.org/wiki/{{{term}}}"),
                ("de", "https://de.wikipedia.org/wiki/{{{term}}}"),
                ("fr", "https://fr.wikipedia.org/wiki/{{{term}}}"),
            ],
            &[Transformation::WikipediaCanonical],
        ),
    ]
}
