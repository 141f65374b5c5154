use serde::{Deserialize, Serialize};

/// A pure rewrite of the bang remainder, applied before URL substitution.
///
/// Transformations belong to the bang that lists them and run in the order
/// they are listed. Configuration refers to them by their snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformation {
    /// Approximates a canonical Wikipedia article title.
    WikipediaCanonical,
}

impl Transformation {
    pub fn apply(self, remainder: &str) -> String {
        match self {
            Transformation::WikipediaCanonical => wikipedia_canonical(remainder),
        }
    }
}

/// "bob maRLey" -> "Bob_Marley"
///
/// Lowercases, capitalizes the first character of every word, then turns
/// spaces into underscores. Titles whose canonical form keeps lowercase
/// words (e.g. es.wikipedia's "De_la_Tierra_a_la_Luna") come out wrong.
pub fn wikipedia_canonical(remainder: &str) -> String {
    let lower = remainder.to_lowercase();
    let mut titled = String::with_capacity(lower.len());
    let mut at_word_start = true;

    for c in lower.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            titled.push(c);
        } else if at_word_start {
            at_word_start = false;
            titled.extend(c.to_uppercase());
        } else {
            titled.push(c);
        }
    }

    titled.replace(' ', "_")
}
