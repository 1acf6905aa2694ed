//! This module provides the `ChampionLoader` struct, responsible for loading champion
//! descriptors from files, directories, and strings.

use crate::parser::parse;
use crate::types::{Champion, StepError, DESCRIPTOR_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `ChampionLoader` is a utility struct for loading champion descriptors.
/// It provides methods to load descriptors from individual files, from string content,
/// and to discover and load all `.bb` files within a specified directory.
pub struct ChampionLoader;

impl ChampionLoader {
    /// Loads a single champion descriptor from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Champion)` if the file is successfully read and parsed.
    /// * `Err(StepError::FileError)` if the file cannot be read.
    /// * `Err(StepError::ParseError)` if the file content is not a valid descriptor.
    pub fn load_champion(path: &Path) -> Result<Champion, StepError> {
        debug!(path = %path.display(), "loading descriptor");

        let content = fs::read_to_string(path).map_err(|e| {
            StepError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single champion descriptor from the provided string content,
    /// e.g. a descriptor piped on standard input.
    pub fn load_champion_from_string(content: &str) -> Result<Champion, StepError> {
        parse(content)
    }

    /// Loads all champion descriptors (`.bb` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Entries are
    /// returned in file name order.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Champion), StepError>>` - one element per descriptor
    ///   file, holding either its path and the parsed `Champion` or the error that
    ///   occurred while loading it.
    pub fn load_champions(directory: &Path) -> Vec<Result<(PathBuf, Champion), StepError>> {
        if !directory.exists() {
            return vec![Err(StepError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(StepError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file()
                        && path
                            .extension()
                            .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
                    {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(StepError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();

        results.extend(paths.into_iter().map(|path| {
            Self::load_champion(&path)
                .map(|champion| (path.clone(), champion))
                .map_err(|e| {
                    StepError::FileError(format!(
                        "Failed to load descriptor from {}: {}",
                        path.display(),
                        e
                    ))
                })
        }));

        results
    }
}
