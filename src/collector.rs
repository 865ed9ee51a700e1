//! Directory listing for the organizer.
//!
//! Produces the flat set of file names the classifier consumes. Only regular
//! files directly inside the directory are listed; hidden files and names that
//! are not valid UTF-8 are left out.

use std::path::{Path, PathBuf};

use log::warn;
use tokio::fs::{ReadDir, read_dir};

use crate::error::{Error, Result};
use crate::path_utils::{is_hidden_file, natural_cmp};
use crate::types::ImageExtension;

/// Lists the files of one directory.
#[derive(Debug)]
pub struct Collector<'a> {
    base_directory: &'a Path,
}

impl<'a> Collector<'a> {
    /// Creates a new Collector for the specified directory.
    pub fn new(base_directory: &'a Path) -> Self {
        Self { base_directory }
    }

    /// Collects the names of all regular, non-hidden files in the directory.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<String>>` - File names (not paths), sorted lexicographically
    pub async fn collect_file_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Self::collect_files(self.base_directory)
            .await?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?;
                match name.to_str() {
                    Some(name) => Some(name.to_string()),
                    None => {
                        warn!("Skipping file with a non UTF-8 name: {:?}", path);
                        None
                    }
                }
            })
            .collect();

        names.sort();
        Ok(names)
    }

    /// Collects the paths of supported images in the directory, in natural file-name order.
    pub async fn collect_images(&self) -> Result<Vec<PathBuf>> {
        let mut images: Vec<PathBuf> = Self::collect_files(self.base_directory)
            .await?
            .into_iter()
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.parse::<ImageExtension>().is_ok())
            })
            .collect();

        images.sort_by(|a, b| natural_cmp(a, b));
        Ok(images)
    }

    /// Collects the regular, non-hidden files directly inside `directory`.
    pub async fn collect_files(directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.is_dir() {
            return Err(Error::NotFound(format!(
                "Directory does not exist: {:?}",
                directory
            )));
        }

        let mut entries: Vec<PathBuf> = Vec::new();
        let mut paths: ReadDir = read_dir(directory).await.map_err(Error::Io)?;

        while let Some(entry) = paths.next_entry().await.map_err(Error::Io)? {
            let path = entry.path();

            if is_hidden_file(&path) {
                continue;
            }

            // Symlinks to files count as files; directories are never listed.
            let file_type = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata.file_type(),
                Err(e) => {
                    warn!("Skipping unreadable entry {:?}: {}", path, e);
                    continue;
                }
            };
            if !file_type.is_file() {
                continue;
            }

            entries.push(path);
        }

        Ok(entries)
    }
}
