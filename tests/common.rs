//! Common test utilities and constants for the book-organizer crate.
//!
//! Provides functions for setting up test directories, creating dummy
//! image files and inspecting generated archives.

use book_organizer::error::Result;
use rand::{Rng, distributions::Alphanumeric};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paths of one isolated test run.
#[allow(dead_code)]
pub struct TestDirs {
    pub base_dir: PathBuf,
    /// Directory holding the book's pages, `<base_dir>/book`.
    pub book_dir: PathBuf,
}

/// Creates a clean, uniquely named test directory with an empty `book` subdirectory.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let base_dir = PathBuf::from(TEST_TMP_DIR).join(format!("{}-{}", sub_path, rand_string));
    if base_dir.exists() {
        fs::remove_dir_all(&base_dir).await.unwrap();
    }
    let book_dir = base_dir.join("book");
    fs::create_dir_all(&book_dir).await.unwrap();

    TestDirs { base_dir, book_dir }
}

/// Writes a small file whose content identifies it, so renames can be traced.
#[allow(dead_code)]
pub async fn create_dummy_image(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = format!("image:{}", path.file_name().unwrap().to_string_lossy());
    fs::write(path, content).await?;
    Ok(())
}

/// Creates every named file in `dir`.
#[allow(dead_code)]
pub async fn create_files(dir: &Path, names: &[&str]) -> Result<()> {
    for name in names {
        create_dummy_image(&dir.join(name)).await?;
    }
    Ok(())
}

/// Content written by [`create_dummy_image`] for a file originally called `original_name`.
#[allow(dead_code)]
pub fn content_of(original_name: &str) -> String {
    format!("image:{}", original_name)
}

/// Sorted names of the regular files in `dir`.
#[allow(dead_code)]
pub async fn list_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        if entry.file_type().await.unwrap().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    names
}

/// Checks that a ZIP file exists and contains at least one entry.
#[allow(dead_code)]
pub async fn assert_valid_zip_file(path: &Path) {
    assert!(path.exists(), "Output ZIP file does not exist: {:?}", path);
    assert!(path.is_file(), "Output ZIP path is not a file: {:?}", path);

    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let zip = zip::ZipArchive::new(file_std).unwrap();
    assert!(zip.len() > 0, "Output ZIP file is empty: {:?}", path);
}

/// Entry names of a ZIP file, in archive order.
#[allow(dead_code)]
pub async fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let mut archive = zip::ZipArchive::new(file_std).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads one entry of a ZIP file as text.
#[allow(dead_code)]
pub async fn read_zip_entry(path: &Path, entry: &str) -> String {
    let file = fs::File::open(path).await.unwrap();
    let file_std = file.into_std().await;
    let mut archive = zip::ZipArchive::new(file_std).unwrap();
    let mut file = archive.by_name(entry).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}
