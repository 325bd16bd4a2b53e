//! On-disk checkpoints: newline-delimited word lists plus the raw entry archive.
//!
//! Every list is written in Esperanto order, one word per line, with no
//! trailing newline. Writes land in a temporary file next to the target and
//! are renamed into place, so a crash never leaves a truncated list behind.

use crate::collation::esort;
use crate::frontier::FrontierState;
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Words waiting to be fetched.
pub const PENDING_FILE: &str = "not_yet.txt";
/// Words fetched with an entry.
pub const DONE_FILE: &str = "done.txt";
/// Words fetched without an entry.
pub const NO_RESULTS_FILE: &str = "no_results.txt";
/// Directory holding one raw document per found word.
pub const HTML_DIR: &str = "html";
/// Completed words after the preprocess pass.
pub const PREPROCESSED_FILE: &str = "done_preprocessed.txt";
/// Derived roots.
pub const ROOTS_FILE: &str = "done_without_word_endings.txt";

const ARCHIVE_EXTENSION: &str = "html";
const UNSAFE_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Failures while reading or writing checkpoint data.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// A file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A file could not be written or moved into place.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A directory could not be created.
    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Reads a word list, keeping file order. A missing file is an empty list.
pub fn read_words(path: &Path) -> Result<Vec<String>, CheckpointError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(CheckpointError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes a word list in Esperanto order and returns the number of words.
pub fn save_words<I, S>(words: I, path: &Path) -> Result<usize, CheckpointError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let (staged, count) = stage_words(words, path)?;
    commit(staged, path)?;
    info!("saved {count} words into {}", path.display());
    Ok(count)
}

fn stage_words<I, S>(words: I, path: &Path) -> Result<(NamedTempFile, usize), CheckpointError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let write_error = |source| CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = parent_dir(path);
    ensure_dir(parent)?;

    let sorted = esort(words);
    let mut staged = NamedTempFile::new_in(parent).map_err(write_error)?;
    staged
        .write_all(sorted.join("\n").as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(write_error)?;
    Ok((staged, sorted.len()))
}

fn commit(staged: NamedTempFile, path: &Path) -> Result<(), CheckpointError> {
    staged
        .persist(path)
        .map(|_| ())
        .map_err(|err| CheckpointError::Write {
            path: path.to_path_buf(),
            source: err.error,
        })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), CheckpointError> {
    fs::create_dir_all(dir).map_err(|source| CheckpointError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// The three frontier files inside one result directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Uses `dir` as the result directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Result directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the pending-frontier file.
    pub fn pending_path(&self) -> PathBuf {
        self.dir.join(PENDING_FILE)
    }

    /// Path of the completed file.
    pub fn done_path(&self) -> PathBuf {
        self.dir.join(DONE_FILE)
    }

    /// Path of the unresolved file.
    pub fn no_results_path(&self) -> PathBuf {
        self.dir.join(NO_RESULTS_FILE)
    }

    /// Loads the persisted state; missing files count as empty sets.
    pub fn load(&self) -> Result<FrontierState, CheckpointError> {
        let pending = read_words(&self.pending_path())?;
        let completed = read_words(&self.done_path())?;
        let unresolved = read_words(&self.no_results_path())?;
        info!(
            "loaded checkpoint from {}: not_yet {}, done {}, no_results {}",
            self.dir.display(),
            pending.len(),
            completed.len(),
            unresolved.len()
        );
        Ok(FrontierState::from_parts(pending, completed, unresolved))
    }

    /// Persists all three sets.
    ///
    /// All three files are staged before any of them replaces its
    /// predecessor, so a failure while writing leaves the previous checkpoint
    /// untouched.
    pub fn save(&self, state: &FrontierState) -> Result<(), CheckpointError> {
        let staged = [
            (
                stage_words(state.pending(), &self.pending_path())?,
                self.pending_path(),
            ),
            (
                stage_words(state.completed().iter().map(String::as_str), &self.done_path())?,
                self.done_path(),
            ),
            (
                stage_words(
                    state.unresolved().iter().map(String::as_str),
                    &self.no_results_path(),
                )?,
                self.no_results_path(),
            ),
        ];
        for ((file, _), path) in staged {
            commit(file, &path)?;
        }
        info!(
            "saved checkpoint to {}: not_yet {}, done {}, no_results {}",
            self.dir.display(),
            state.pending_len(),
            state.completed_len(),
            state.unresolved_len()
        );
        Ok(())
    }

    /// The raw-document archive under this result directory.
    pub fn archive(&self) -> Archive {
        Archive::new(self.dir.join(HTML_DIR))
    }
}

/// One raw document per successfully fetched word.
#[derive(Debug, Clone)]
pub struct Archive {
    dir: PathBuf,
}

impl Archive {
    /// Uses `dir` as the archive directory; nothing is created until a store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the document for `word`.
    pub fn path_for(&self, word: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ARCHIVE_EXTENSION}", archive_file_stem(word)))
    }

    /// Writes the document for `word`, replacing an older copy.
    pub fn store(&self, word: &str, document: &str) -> Result<PathBuf, CheckpointError> {
        ensure_dir(&self.dir)?;
        let path = self.path_for(word);
        let write_error = |source| CheckpointError::Write {
            path: path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        staged.write_all(document.as_bytes()).map_err(write_error)?;
        commit(staged, &path)?;
        Ok(path)
    }

    /// Reads the document for `word`; `None` when it was never archived.
    pub fn load(&self, word: &str) -> Result<Option<String>, CheckpointError> {
        let path = self.path_for(word);
        match fs::read_to_string(&path) {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CheckpointError::Read { path, source }),
        }
    }
}

/// File-system safe stem for a word's archive file.
pub fn archive_file_stem(word: &str) -> String {
    word.chars()
        .map(|ch| {
            if ch.is_control() || UNSAFE_FILE_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn saved_lists_use_esperanto_order_without_trailing_newline() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("words.txt");
        let count = save_words(["dokolado", "ĉokolado", "cokolado"], &path).expect("save");

        assert_eq!(count, 3);
        let text = fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "cokolado\nĉokolado\ndokolado");
    }

    #[test]
    fn missing_list_reads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        assert!(read_words(&dir.path().join("absent.txt"))
            .expect("read")
            .is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("words.txt");
        fs::write(&path, "hundo\n\nkato\n").expect("write");
        assert_eq!(read_words(&path).expect("read"), vec!["hundo", "kato"]);
    }

    #[test]
    fn state_round_trips_through_store() {
        let dir = TempDir::new().expect("tempdir");
        let store = CheckpointStore::new(dir.path().join("results"));
        let mut state = FrontierState::new();
        state.seed_if_fresh("ktp");
        let seed = state.next_pending().expect("seed");
        state.mark_completed(seed, ["kaj".to_string(), "tiel".to_string()]);
        let kaj = state.next_pending().expect("kaj");
        state.mark_unresolved(kaj);

        store.save(&state).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded.pending().collect::<Vec<_>>(), vec!["tiel"]);
        assert_eq!(loaded.completed(), state.completed());
        assert_eq!(loaded.unresolved(), state.unresolved());
        assert!(loaded.is_consistent());
    }

    #[test]
    fn empty_store_loads_fresh_state() {
        let dir = TempDir::new().expect("tempdir");
        let store = CheckpointStore::new(dir.path());
        assert!(store.load().expect("load").is_fresh());
    }

    #[test]
    fn archive_sanitizes_file_names() {
        assert_eq!(archive_file_stem("kio?"), "kio_");
        assert_eq!(archive_file_stem("a/b:c"), "a_b_c");
        assert_eq!(archive_file_stem("ĉu"), "ĉu");
    }

    #[test]
    fn archive_stores_and_loads_documents() {
        let dir = TempDir::new().expect("tempdir");
        let archive = CheckpointStore::new(dir.path()).archive();

        assert_eq!(archive.load("hundo").expect("load"), None);
        let path = archive.store("hundo", "<p>hundo</p>").expect("store");
        assert_eq!(path, dir.path().join(HTML_DIR).join("hundo.html"));
        assert_eq!(
            archive.load("hundo").expect("load").as_deref(),
            Some("<p>hundo</p>")
        );
    }
}
