//! Core data types, enums, and reports for book-organizer.
//!
//! This module defines the fundamental data structures used throughout the crate:
//! - Candidate files and their recognized image extensions (`CandidateFile`, `ImageExtension`)
//! - Classification results (`Classification`, `Ordinal`, `ClassifiedFile`)
//! - Rename plans (`PlanEntry`, `RenamePlan`, `PlanOutcome`)
//! - Reporting types (`SkippedFile`, `SkipReason`, `Notice`, `Analysis`, `ExecutionReport`)

use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};

/// Image extensions the organizer recognizes. Anything else is skipped.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
}

impl ImageExtension {
    /// Lowercase extension text, without the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
        }
    }
}

impl FromStr for ImageExtension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(ImageExtension::Jpg),
            "jpeg" => Ok(ImageExtension::Jpeg),
            "png" => Ok(ImageExtension::Png),
            other => Err(Error::Unsupported(format!("Image format {:?}", other))),
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file name discovered in the target directory. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CandidateFile {
    name: String,
    stem: String,
    raw_extension: String,
    extension: Option<ImageExtension>,
}

impl CandidateFile {
    /// Splits a bare file name into stem and extension.
    ///
    /// Follows [`Path::file_stem`] / [`Path::extension`] semantics, so a name like
    /// `.jpg` has the stem `.jpg` and no extension.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let path = Path::new(&name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let raw_extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = raw_extension.parse::<ImageExtension>().ok();

        Self {
            name,
            stem,
            raw_extension,
            extension,
        }
    }

    /// Original file name, as listed in the directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Extension exactly as written in the source name (may be empty).
    pub fn raw_extension(&self) -> &str {
        &self.raw_extension
    }

    /// Normalized extension, `None` when outside the recognized set.
    pub fn extension(&self) -> Option<ImageExtension> {
        self.extension
    }

    pub fn is_supported(&self) -> bool {
        self.extension.is_some()
    }
}

impl fmt::Display for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sequence number extracted from a page file name.
///
/// `width` is the number of digits the number was written with, leading zeros included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Ordinal {
    pub value: u64,
    pub width: usize,
}

/// Semantic role inferred for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Classification {
    Cover,
    Title,
    /// A content page. `None` only when unnumbered files are treated as pages.
    Page(Option<Ordinal>),
    Unrecognized,
}

impl Classification {
    pub fn is_cover(&self) -> bool {
        matches!(self, Classification::Cover)
    }
}

/// A candidate file paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ClassifiedFile {
    pub file: CandidateFile,
    pub classification: Classification,
}

impl ClassifiedFile {
    pub fn new(file: CandidateFile, classification: Classification) -> Self {
        Self {
            file,
            classification,
        }
    }
}

/// Informational findings produced during classification. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Notice {
    /// Several files matched a cover keyword; `chosen` won alphabetically.
    AmbiguousCover { chosen: String, others: Vec<String> },
    /// Several files matched a title keyword; `chosen` won alphabetically.
    AmbiguousTitle { chosen: String, others: Vec<String> },
    /// No keyword matched, but `file` was the only unnumbered image.
    InferredCover { file: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AmbiguousCover { chosen, others } => write!(
                f,
                "multiple cover candidates, using '{}' (ignored: {})",
                chosen,
                others.join(", ")
            ),
            Notice::AmbiguousTitle { chosen, others } => write!(
                f,
                "multiple title candidates, using '{}' (ignored: {})",
                chosen,
                others.join(", ")
            ),
            Notice::InferredCover { file } => {
                write!(f, "no cover keyword found, inferred '{}' as cover", file)
            }
        }
    }
}

/// Why a file was left out of the rename plan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SkipReason {
    /// Extension outside jpg/jpeg/png.
    UnsupportedFile { extension: String },
    /// Supported image with no cover/title keyword and no numeric run.
    Unrecognized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFile { extension } if extension.is_empty() => {
                f.write_str("unsupported file (no extension)")
            }
            SkipReason::UnsupportedFile { extension } => {
                write!(f, "unsupported file extension '.{}'", extension)
            }
            SkipReason::Unrecognized => f.write_str("no cover/title keyword and no page number"),
        }
    }
}

/// A file excluded from the plan, with the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SkippedFile {
    pub file: CandidateFile,
    pub reason: SkipReason,
}

/// One source → target rename.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PlanEntry {
    pub source: CandidateFile,
    pub classification: Classification,
    pub target: String,
}

impl PlanEntry {
    /// True when the file already carries its canonical name.
    pub fn is_identity(&self) -> bool {
        self.source.name() == self.target
    }
}

/// Ordered rename mapping for one run. Order is reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RenamePlan {
    pub entries: Vec<PlanEntry>,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanEntry> {
        self.entries.iter()
    }

    /// True when every entry maps a file onto itself.
    pub fn is_identity(&self) -> bool {
        self.entries.iter().all(PlanEntry::is_identity)
    }

    /// The cover entry, if the plan has one.
    pub fn cover(&self) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.classification.is_cover())
    }
}

impl<'a> IntoIterator for &'a RenamePlan {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Output of the planner: the plan plus everything it left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PlanOutcome {
    pub plan: RenamePlan,
    pub skipped: Vec<SkippedFile>,
}

/// Output of the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ClassificationReport {
    /// One entry per input name, sorted by name.
    pub files: Vec<ClassifiedFile>,
    pub notices: Vec<Notice>,
}

/// Full result of analyzing one directory listing: classification and plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Analysis {
    pub files: Vec<ClassifiedFile>,
    pub plan: RenamePlan,
    pub skipped: Vec<SkippedFile>,
    pub notices: Vec<Notice>,
}

/// A plan entry the executor could not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FailedEntry {
    pub entry: PlanEntry,
    pub error: String,
}

/// Per-entry outcome of applying a plan to a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ExecutionReport {
    /// Entries renamed to their target.
    pub applied: Vec<PlanEntry>,
    /// Identity entries, left untouched.
    pub unchanged: Vec<PlanEntry>,
    pub failed: Vec<FailedEntry>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
