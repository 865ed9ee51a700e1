use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::path_utils::{get_file_name_lossy, path_to_string_lossy};
use crate::types::{ImageExtension, RenamePlan};
use async_trait::async_trait;
use chrono::prelude::*;
use log::{info, warn};
use memmap2::MmapOptions;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::spawn_blocking;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const COMIC_INFO_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ComicInfo xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Title>%title%</Title>
  <PageCount>%pagecount%</PageCount>
  <Year>%year%</Year>
  <Month>%month%</Month>
  <Day>%day%</Day>
</ComicInfo>
"#;

/// A generator for creating CBZ (Comic Book ZIP) files.
///
/// Pages keep their file names inside the archive. The cover is stored as
/// `000_cover.<ext>` so that readers ordering entries by name still open it first.
pub struct Cbz {
    zip: Option<ZipWriter<File>>,
    options: SimpleFileOptions,
    output_path: PathBuf,
    page_count: usize,
    has_cover: bool,
}

impl Cbz {
    /// Adds the cover page. Must be called before any regular page.
    pub async fn add_cover_page(&mut self, cover_path: &Path) -> Result<&mut Self> {
        if self.has_cover {
            return Err(Error::Unsupported("Cover already set".to_string()));
        }
        if self.page_count > 0 {
            return Err(Error::Unsupported(
                "Cover must be added before the other pages".to_string(),
            ));
        }

        let extension = image_extension(cover_path)?;
        self.write_entry(cover_path, format!("000_cover.{}", extension))
            .await?;
        self.has_cover = true;
        self.page_count += 1;

        Ok(self)
    }

    async fn write_entry(&mut self, image_path: &Path, entry_name: String) -> Result<()> {
        let file = fs::File::open(image_path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to open image file '{}': {}",
                    path_to_string_lossy(image_path),
                    e
                ),
            ))
        })?;
        let length = file.metadata().await?.len();
        let file_std = file.into_std().await;
        let options = self.options;

        let zip = match self.zip.as_mut() {
            Some(z) => z,
            None => {
                return Err(Error::Unsupported("Zip writer not available".to_string()));
            }
        };

        zip.start_file(entry_name, options)?;

        // Zero-length files can't be mapped; the entry simply stays empty.
        if length > 0 {
            let mmap = spawn_blocking(move || unsafe { MmapOptions::new().map(&file_std) })
                .await
                .map_err(|e| Error::AsyncTaskError(e.to_string()))??;
            zip.write_all(&mmap[..])?;
        }

        Ok(())
    }
}

#[async_trait]
impl Generator for Cbz {
    fn new(output_dir: &Path, base_filename: &str) -> Result<Self> {
        let options: SimpleFileOptions = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir)?;
        }

        let output_path = output_dir.join(format!("{}.cbz", base_filename));
        let file = File::create(&output_path)?;

        Ok(Cbz {
            zip: Some(ZipWriter::new(file)),
            options,
            output_path,
            page_count: 0,
            has_cover: false,
        })
    }

    async fn add_page(&mut self, image_path: &Path) -> Result<&mut Self> {
        image_extension(image_path)?;
        self.write_entry(image_path, get_file_name_lossy(image_path))
            .await?;
        self.page_count += 1;

        Ok(self)
    }

    async fn set_metadata(&mut self, title: &str, total_pages: usize) -> Result<&mut Self> {
        let escape_xml = |text: &str| -> String {
            text.replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;")
                .replace('\'', "&apos;")
        };

        let now = Utc::now();
        let xml = COMIC_INFO_TEMPLATE
            .replace("%title%", &escape_xml(title))
            .replace("%pagecount%", &total_pages.to_string())
            .replace("%year%", &now.year().to_string())
            .replace("%month%", &now.month().to_string())
            .replace("%day%", &now.day().to_string());

        let zip = match self.zip.as_mut() {
            Some(z) => z,
            None => {
                return Err(Error::Unsupported("Zip writer not available".to_string()));
            }
        };

        zip.start_file("ComicInfo.xml", self.options)?;
        zip.write_all(xml.as_bytes())?;

        Ok(self)
    }

    async fn save(mut self) -> Result<PathBuf> {
        let zip = match self.zip.take() {
            Some(z) => z,
            None => {
                return Err(Error::Unsupported("Zip writer not available".to_string()));
            }
        };

        spawn_blocking(move || zip.finish().map(|_| ()).map_err(Error::Zip))
            .await
            .map_err(|e| Error::AsyncTaskError(e.to_string()))??;

        info!(
            "Wrote {} ({} page(s))",
            path_to_string_lossy(&self.output_path),
            self.page_count
        );
        Ok(self.output_path)
    }
}

fn image_extension(path: &Path) -> Result<ImageExtension> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            Error::Unsupported(format!(
                "Image format of '{}'",
                path_to_string_lossy(path)
            ))
        })?
        .parse()
}

/// Where the archive for `directory` goes: a sibling `<directory name>.cbz`.
fn archive_location(directory: &Path) -> Result<(PathBuf, String)> {
    // `.` and `..` have no file name of their own.
    let directory = match directory.file_name() {
        Some(_) => directory.to_path_buf(),
        None => directory.canonicalize()?,
    };
    let name = directory
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            Error::InvalidPath(
                directory.to_path_buf(),
                "Cannot archive a directory without a name".to_string(),
            )
        })?;
    let parent = directory
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((parent, name))
}

async fn write_archive(
    directory: &Path,
    cover: Option<PathBuf>,
    pages: Vec<PathBuf>,
    comic_info: bool,
) -> Result<PathBuf> {
    let (output_dir, base_filename) = archive_location(directory)?;
    let total_pages = pages.len() + usize::from(cover.is_some());
    if total_pages == 0 {
        return Err(Error::NotFound(format!(
            "No images to archive in {:?}",
            directory
        )));
    }

    let generator = Cbz::new(&output_dir, &base_filename)?;
    let output_path = output_dir.join(format!("{}.cbz", base_filename));

    let metadata = comic_info.then_some((base_filename.as_str(), total_pages));
    let result = fill_archive(generator, cover, &pages, metadata).await;
    if result.is_err() {
        // Never leave a truncated archive behind.
        if let Err(e) = fs::remove_file(&output_path).await {
            warn!("Could not remove incomplete archive {:?}: {}", output_path, e);
        }
    }
    result
}

async fn fill_archive(
    mut generator: Cbz,
    cover: Option<PathBuf>,
    pages: &[PathBuf],
    metadata: Option<(&str, usize)>,
) -> Result<PathBuf> {
    if let Some(cover) = &cover {
        generator.add_cover_page(cover).await?;
    }
    for page in pages {
        generator.add_page(page).await?;
    }
    if let Some((title, total_pages)) = metadata {
        generator.set_metadata(title, total_pages).await?;
    }
    generator.save().await
}

/// Archives a directory that a plan has just been applied to.
///
/// Entries follow plan order, reading files under their target names.
/// The archive is written next to the directory as `<directory name>.cbz`.
pub async fn archive_plan(directory: &Path, plan: &RenamePlan, comic_info: bool) -> Result<PathBuf> {
    let cover = plan.cover().map(|e| directory.join(&e.target));
    let pages = plan
        .iter()
        .filter(|e| !e.classification.is_cover())
        .map(|e| directory.join(&e.target))
        .collect();

    write_archive(directory, cover, pages, comic_info).await
}

/// Archives an arbitrary directory of images in natural file-name order.
///
/// A file whose stem equals `cover_name` (ignoring case) is stored as the cover.
pub async fn archive_directory(
    directory: &Path,
    cover_name: Option<&str>,
    comic_info: bool,
) -> Result<PathBuf> {
    let images = Collector::new(directory)
        .collect_images()
        .await?;

    let is_cover = |path: &PathBuf| match (cover_name, path.file_stem()) {
        (Some(cover), Some(stem)) => stem.to_string_lossy().to_lowercase() == cover.to_lowercase(),
        _ => false,
    };
    let cover = images.iter().find(|p| is_cover(*p)).cloned();
    let pages = images
        .into_iter()
        .filter(|p| Some(p) != cover.as_ref())
        .collect();

    write_archive(directory, cover, pages, comic_info).await
}
