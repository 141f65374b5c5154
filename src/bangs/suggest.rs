use std::{cmp::Ordering, collections::BTreeSet};

use serde::{Deserialize, Serialize};

use super::Bang;
use crate::error::{Error, Result};

/// Autocomplete results. Always an object on the wire, never a bare array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub suggestions: Vec<Suggestion>,
}

/// A single trigger suggestion. `name` is filled in by
/// [`Bangs::suggest`](super::Bangs::suggest); backends leave it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub trigger: String,
    pub name: String,
}

/// A prefix autocomplete over bang triggers.
///
/// Callers usually run `delete_index` then `setup` at boot so the index
/// always mirrors the current registry.
pub trait Suggester: Send + Sync {
    fn index_exists(&self) -> Result<bool>;

    fn delete_index(&mut self) -> Result<()>;

    /// Load every trigger of `bangs`. Running it again replaces the content.
    fn setup(&mut self, bangs: &[Bang]) -> Result<()>;

    /// At most `size` triggers that start with `term`, ignoring case.
    fn suggest(&self, term: &str, size: usize) -> Result<Results>;
}

/// Drop any existing index and load `bangs` into a fresh one.
pub fn rebuild<S: Suggester + ?Sized>(
    suggester: &mut S,
    bangs: &[Bang],
) -> Result<()> {
    if suggester.index_exists()? {
        suggester.delete_index()?;
    }
    suggester.setup(bangs)
}

/// Shorter triggers first, then alphabetical.
pub(crate) fn trigger_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

pub(crate) fn into_results(mut triggers: Vec<String>, size: usize) -> Results {
    triggers.sort_by(|a, b| trigger_order(a, b));
    triggers.dedup();
    triggers.truncate(size);

    Results {
        suggestions: triggers
            .into_iter()
            .map(|trigger| Suggestion {
                trigger,
                name: String::new(),
            })
            .collect(),
    }
}

/// Keeps the triggers in an ordered set. Good for tests and for deployments
/// that do not want an on-disk index.
#[derive(Debug, Default)]
pub struct MemorySuggester {
    triggers: Option<BTreeSet<String>>,
}

impl MemorySuggester {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Suggester for MemorySuggester {
    fn index_exists(&self) -> Result<bool> {
        Ok(self.triggers.is_some())
    }

    fn delete_index(&mut self) -> Result<()> {
        self.triggers = None;
        Ok(())
    }

    fn setup(&mut self, bangs: &[Bang]) -> Result<()> {
        let triggers = bangs
            .iter()
            .flat_map(|b| b.triggers.iter().cloned())
            .collect::<BTreeSet<_>>();
        tracing::debug!(triggers = triggers.len(), "loaded bang triggers");
        self.triggers = Some(triggers);
        Ok(())
    }

    fn suggest(&self, term: &str, size: usize) -> Result<Results> {
        let triggers =
            self.triggers.as_ref().ok_or_else(|| Error::NotFound {
                kind: "suggester index",
                name: "memory".to_string(),
            })?;

        let prefix = term.to_lowercase();
        let matches = triggers
            .range(prefix.clone()..)
            .take_while(|t| t.starts_with(&prefix))
            .cloned()
            .collect();

        Ok(into_results(matches, size))
    }
}
