//! Locating PROJ's data directory and `proj.db`.
//!
//! Mirrors the search libproj itself performs when unconfigured: an explicit
//! environment override first, then a fixed list of conventional install
//! prefixes. The search is plain filesystem inspection and never calls into
//! the native library.

use crate::error::{ProjError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// File name of the PROJ resource database.
pub const DATABASE_FILE: &str = "proj.db";

/// Override variables, most specific first. `PROJ_DATA` replaced `PROJ_LIB`
/// in PROJ 9.1; both are honoured.
pub const OVERRIDE_ENV: &[&str] = &["PROJ_DATA", "PROJ_LIB"];

/// Conventional data directories, in the order they are tried.
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/proj",
    "/usr/local/share/proj",
    "/opt/share/proj",
    "/opt/local/share/proj",
    "/opt/homebrew/share/proj",
    "c:/msys64/mingw64/share/proj",
    "c:/mingw64/share/proj",
    "/opt/local/lib/proj6/share/proj",
    "/opt/local/lib/proj5/share/proj",
    "/opt/local/lib/proj49/share/proj",
];

/// Ordered list of directories that may hold PROJ resource files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSearch {
    override_dir: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl DataSearch {
    /// Search `override_dir` (if any), then `candidates` in order.
    pub fn new(override_dir: Option<PathBuf>, candidates: Vec<PathBuf>) -> Self {
        Self {
            override_dir,
            candidates,
        }
    }

    /// Search honouring `PROJ_DATA`/`PROJ_LIB` and the default prefixes.
    pub fn from_env() -> Self {
        let override_dir = OVERRIDE_ENV
            .iter()
            .filter_map(|name| env::var_os(name))
            .find(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(
            override_dir,
            DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
        )
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Every directory considered, override first.
    pub fn searched(&self) -> Vec<PathBuf> {
        self.override_dir
            .iter()
            .chain(self.candidates.iter())
            .cloned()
            .collect()
    }

    /// First directory containing `proj.db`.
    pub fn database_dir(&self) -> Result<PathBuf> {
        self.searched()
            .into_iter()
            .find(|dir| dir.join(DATABASE_FILE).is_file())
            .ok_or_else(|| ProjError::DatabaseNotFound {
                searched: self.searched(),
            })
    }

    /// Full path of the first `proj.db` found.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.database_dir()?.join(DATABASE_FILE))
    }

    /// First directory that exists at all, whether or not it holds a database.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.searched()
            .into_iter()
            .find(|dir| dir.is_dir())
            .ok_or_else(|| ProjError::LibraryDataNotFound {
                searched: self.searched(),
            })
    }
}
