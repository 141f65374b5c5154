use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "QUERYROUTE_DATA_DIR";

const XDG_PREFIX: &str = "queryroute";

/// Where the settings file and the bang suggester index live.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory and create it if needed. See
    /// [`DataDir::locate`] for the lookup order.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = Self::locate(explicit, std::env::var_os(DATA_DIR_ENV))?;
        Self::at(root)
    }

    /// Pick the root from `--data-dir`, then a non-empty `QUERYROUTE_DATA_DIR`,
    /// then the XDG data home (~/.local/share/queryroute/).
    fn locate(
        explicit: Option<&Path>,
        from_env: Option<OsString>,
    ) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Some(val) = from_env.filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(val));
        }

        xdg::BaseDirectories::with_prefix(XDG_PREFIX)
            .get_data_home()
            .ok_or_else(|| {
                Error::Config("could not determine XDG data home directory".into())
            })
    }

    /// Use `root` as the data directory.
    pub fn at(root: PathBuf) -> Result<Self> {
        if !root.is_dir() {
            std::fs::create_dir_all(&root)
                .map_err(|_| Error::DataDir(root.clone()))?;
            tracing::debug!(root = %root.display(), "created data directory");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Settings file read when no `--config` is given.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("queryroute.toml")
    }

    /// The settings file, if one has been written.
    pub fn existing_settings_file(&self) -> Option<PathBuf> {
        let path = self.settings_file();
        path.is_file().then_some(path)
    }

    /// Where the bang suggester keeps its index. Created on first setup and
    /// removed wholesale when the index is deleted.
    pub fn suggest_index_dir(&self) -> PathBuf {
        self.root.join("bangs")
    }
}
