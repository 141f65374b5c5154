use std::path::{Path, PathBuf};

use tantivy::{
    Index,
    IndexReader,
    IndexWriter,
    TantivyDocument,
    collector::DocSetCollector,
    directory::MmapDirectory,
    doc,
    query::RegexQuery,
    schema::{Field, STORED, STRING, Schema, Value},
};

use super::{
    Bang,
    suggest::{Results, Suggester, into_results},
};
use crate::error::{Error, Result};

/// Field names used in the schema.
pub mod fields {
    pub const TRIGGER: &str = "trigger";
}

const WRITER_MEMORY_BUDGET: usize = 15_000_000;

/// Bang trigger autocomplete backed by a Tantivy index.
///
/// Triggers are indexed untokenized, so a prefix lookup is a regex query
/// over the term dictionary.
pub struct TantivySuggester {
    /// `None` keeps the index in RAM.
    dir: Option<PathBuf>,
    loaded: Option<Loaded>,
}

struct Loaded {
    reader: IndexReader,
    trigger: Field,
}

fn build_schema() -> (Schema, Field) {
    let mut builder = Schema::builder();
    let trigger = builder.add_text_field(fields::TRIGGER, STRING | STORED);
    (builder.build(), trigger)
}

fn mmap_directory(dir: &Path) -> Result<MmapDirectory> {
    MmapDirectory::open(dir).map_err(|e| {
        tantivy::TantivyError::SystemError(e.to_string()).into()
    })
}

impl TantivySuggester {
    /// A suggester whose index lives in `dir`. An index already present in
    /// `dir` is opened so it can answer without another `setup`.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut suggester = Self {
            dir: Some(dir.to_path_buf()),
            loaded: None,
        };

        if suggester.index_exists()? {
            let index = Index::open(mmap_directory(dir)?)?;
            suggester.loaded = Some(Self::load(&index)?);
        }

        Ok(suggester)
    }

    /// A suggester whose index lives in memory (for testing).
    pub fn in_ram() -> Self {
        Self {
            dir: None,
            loaded: None,
        }
    }

    fn load(index: &Index) -> Result<Loaded> {
        let trigger =
            index.schema().get_field(fields::TRIGGER).map_err(|_| {
                Error::Config(format!(
                    "suggester index has no '{}' field",
                    fields::TRIGGER
                ))
            })?;
        Ok(Loaded {
            reader: index.reader()?,
            trigger,
        })
    }

    fn create_index(&self) -> Result<Index> {
        let (schema, _) = build_schema();
        match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|_| Error::DataDir(dir.clone()))?;
                Ok(Index::open_or_create(mmap_directory(dir)?, schema)?)
            }
            None => Ok(Index::create_in_ram(schema)),
        }
    }
}

impl Suggester for TantivySuggester {
    fn index_exists(&self) -> Result<bool> {
        match &self.dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Ok(false);
                }
                let exists = Index::exists(&mmap_directory(dir)?).map_err(
                    |e| tantivy::TantivyError::SystemError(e.to_string()),
                )?;
                Ok(exists)
            }
            None => Ok(self.loaded.is_some()),
        }
    }

    fn delete_index(&mut self) -> Result<()> {
        self.loaded = None;
        if let Some(dir) = &self.dir
            && dir.exists()
        {
            std::fs::remove_dir_all(dir)?;
            tracing::info!(dir = %dir.display(), "deleted bang suggester index");
        }
        Ok(())
    }

    fn setup(&mut self, bangs: &[Bang]) -> Result<()> {
        let index = self.create_index()?;
        let loaded = Self::load(&index)?;

        let mut writer: IndexWriter = index.writer(WRITER_MEMORY_BUDGET)?;
        writer.delete_all_documents()?;

        let mut count = 0;
        let mut seen = std::collections::HashSet::new();
        for trigger in bangs.iter().flat_map(|b| &b.triggers) {
            if seen.insert(trigger.as_str()) {
                writer.add_document(doc!(loaded.trigger => trigger.as_str()))?;
                count += 1;
            }
        }
        writer.commit()?;
        loaded.reader.reload()?;

        tracing::info!(triggers = count, "indexed bang triggers");
        self.loaded = Some(loaded);
        Ok(())
    }

    fn suggest(&self, term: &str, size: usize) -> Result<Results> {
        let loaded = self.loaded.as_ref().ok_or_else(|| Error::NotFound {
            kind: "suggester index",
            name: self
                .dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "in-memory".to_string()),
        })?;

        let pattern = format!("{}.*", regex::escape(&term.to_lowercase()));
        let query = RegexQuery::from_pattern(&pattern, loaded.trigger)?;

        let searcher = loaded.reader.searcher();
        let hits = searcher.search(&query, &DocSetCollector)?;

        let mut triggers = Vec::with_capacity(hits.len());
        for address in hits {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(trigger) =
                doc.get_first(loaded.trigger).and_then(|v| v.as_str())
            {
                triggers.push(trigger.to_string());
            }
        }

        Ok(into_results(triggers, size))
    }
}

impl std::fmt::Debug for TantivySuggester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivySuggester")
            .field("dir", &self.dir)
            .field("loaded", &self.loaded.is_some())
            .finish()
    }
}
