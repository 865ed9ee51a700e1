//! Generator module provides the archive writer interface and its CBZ implementation.
//!
//! Archives are produced from an already reorganized directory; generators
//! never rename or reorder anything on disk.

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod cbz;

pub use cbz::{Cbz, archive_directory, archive_plan};

/// Common interface for archive generators.
#[async_trait]
pub trait Generator {
    /// Creates a new generator instance.
    ///
    /// # Parameters
    /// * `output_dir` - Directory where the generated file will be saved
    /// * `base_filename` - Base name of the output file, without extension
    ///
    /// # Returns
    /// * `Result<Self>` - A new generator instance or an error if creation fails
    fn new(output_dir: &Path, base_filename: &str) -> Result<Self>
    where
        Self: Sized;

    /// Adds a page to the archive, in reading order.
    ///
    /// # Parameters
    /// * `image_path` - Path to the image file to add as a page
    ///
    /// # Returns
    /// * `Result<&mut Self>` - Self reference for method chaining, or an error if failed
    async fn add_page(&mut self, image_path: &Path) -> Result<&mut Self>
    where
        Self: Sized;

    /// Embeds descriptive metadata.
    ///
    /// # Parameters
    /// * `title` - Book title, usually the organized directory's name
    /// * `total_pages` - Number of pages in the archive, cover included
    async fn set_metadata(&mut self, title: &str, total_pages: usize) -> Result<&mut Self>
    where
        Self: Sized;

    /// Finalizes the archive and writes it to disk.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Location of the written archive
    async fn save(self) -> Result<PathBuf>;
}
