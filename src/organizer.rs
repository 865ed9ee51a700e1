use log::{info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::classifier::{
    Classifier, CoverDetection, DEFAULT_COVER_KEYWORDS, DEFAULT_TITLE_KEYWORDS,
};
use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::generator;
use crate::path_utils::validate_file_stem;
use crate::planner::{DEFAULT_COVER_NAME, DEFAULT_MIN_WIDTH, DEFAULT_TITLE_NAME, Planner};
use crate::types::{Analysis, ExecutionReport, RenamePlan};

/// Upper bound for `min_width`; page numbers wider than this are never needed.
const MAX_MIN_WIDTH: usize = 20;

/// The organizer configuration, built declaratively using the builder pattern.
///
/// This struct holds every setting of one organizing run: the directory, the
/// classification keywords, the canonical names and the page-number padding.
/// Once built, it drives the pipeline:
///
/// - [`analyze`](OrganizerConfig::analyze): list the directory, classify and plan (no changes)
/// - [`analyze_names`](OrganizerConfig::analyze_names): classify and plan a supplied listing
/// - [`apply`](OrganizerConfig::apply): rename files according to a plan
/// - [`create_archive`](OrganizerConfig::create_archive): package the organized directory as CBZ
///
/// ## Builder Pattern
///
/// ```rust,no_run
/// # use book_organizer::prelude::*;
/// # use std::path::PathBuf;
/// let config = OrganizerConfig::builder()
///     .target_path(PathBuf::from("./scans/my_book"))
///     .cover_keywords(vec!["cover".to_string(), "表紙".to_string()])
///     .min_width(3usize)
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct OrganizerConfig {
    /// Directory holding the scanned images.
    #[builder(default)]
    pub target_path: PathBuf,

    /// Case-insensitive words marking the cover file. ASCII words must stand alone
    /// (`front_cover`, not `discovery`).
    #[builder(default = "DEFAULT_COVER_KEYWORDS.iter().map(|k| k.to_string()).collect()")]
    pub cover_keywords: Vec<String>,

    /// Case-insensitive words marking the title page.
    #[builder(default = "DEFAULT_TITLE_KEYWORDS.iter().map(|k| k.to_string()).collect()")]
    pub title_keywords: Vec<String>,

    /// Custom regex pattern for extracting page numbers from file stems.
    ///
    /// If not provided, the last run of ASCII digits is used. When the pattern has a
    /// capture group, group 1 holds the number.
    ///
    /// Example: `r"page[\s_-]*(\d+)"` to match "page_001", "page-01"
    #[builder(default)]
    pub page_name_regex_str: Option<String>,

    /// Pick the single unnumbered image as cover when no cover keyword matches.
    #[builder(default = "true")]
    pub infer_cover: bool,

    /// Magazine clippings: no cover detection, unnumbered images lead the page sequence.
    #[builder(default = "false")]
    pub magazine_mode: bool,

    /// Target stem for the cover.
    #[builder(default = "DEFAULT_COVER_NAME.to_string()")]
    pub cover_name: String,

    /// Target stem for the title page.
    #[builder(default = "DEFAULT_TITLE_NAME.to_string()")]
    pub title_name: String,

    /// Minimum zero-padded width of page numbers.
    #[builder(default = "DEFAULT_MIN_WIDTH")]
    pub min_width: usize,

    /// Let the widest source page number widen the padding.
    #[builder(default = "false")]
    pub preserve_source_width: bool,

    /// Embed a ComicInfo.xml when creating archives.
    #[builder(default = "false")]
    pub write_comic_info: bool,

    /// Compiled regex from `page_name_regex_str`. Internal use only.
    #[builder(setter(skip), default = "self.compile_page_name_regex()")]
    pub(crate) compiled_page_name_regex: Option<Regex>,
}

impl std::fmt::Debug for OrganizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizerConfig")
            .field("target_path", &self.target_path)
            .field("cover_keywords", &self.cover_keywords)
            .field("title_keywords", &self.title_keywords)
            .field("page_name_regex_str", &self.page_name_regex_str)
            .field("infer_cover", &self.infer_cover)
            .field("magazine_mode", &self.magazine_mode)
            .field("cover_name", &self.cover_name)
            .field("title_name", &self.title_name)
            .field("min_width", &self.min_width)
            .field("preserve_source_width", &self.preserve_source_width)
            .field("write_comic_info", &self.write_comic_info)
            .finish()
    }
}

impl OrganizerConfig {
    /// Creates a new builder for configuring `OrganizerConfig`.
    pub fn builder() -> OrganizerConfigBuilder {
        OrganizerConfigBuilder::default()
    }

    /// Checks that `target_path` is set and points to an existing directory.
    ///
    /// `analyze`, `apply` and `create_archive` run this themselves; calling it
    /// up front only surfaces problems earlier.
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.target_path.as_os_str().is_empty() {
            return Err(Error::Other("`target_path` must be set.".to_string()));
        }
        if !self.target_path.exists() {
            return Err(Error::NotFound(format!(
                "Target path does not exist: {:?}",
                self.target_path
            )));
        }
        if !self.target_path.is_dir() {
            return Err(Error::InvalidPath(
                self.target_path.clone(),
                "Target path is not a directory.".to_string(),
            ));
        }
        Ok(self)
    }

    /// The classifier described by this configuration.
    pub fn classifier(&self) -> Classifier<'_> {
        let cover_detection = match (self.magazine_mode, self.infer_cover) {
            (true, _) => CoverDetection::Disabled,
            (false, true) => CoverDetection::KeywordsOrInferred,
            (false, false) => CoverDetection::Keywords,
        };

        Classifier::new(
            &self.cover_keywords,
            &self.title_keywords,
            self.compiled_page_name_regex.as_ref(),
            cover_detection,
            self.magazine_mode,
        )
    }

    /// The planner described by this configuration.
    pub fn planner(&self) -> Planner {
        Planner::new(
            self.cover_name.clone(),
            self.title_name.clone(),
            self.min_width,
            self.preserve_source_width,
        )
    }

    /// Classifies and plans a supplied directory listing. Touches no files.
    ///
    /// # Arguments
    ///
    /// * `names` - Bare file names, in any order
    ///
    /// # Returns
    ///
    /// * `Ok(Analysis)` - Classification of every name, the plan, the skipped files and notices
    /// * `Err(Error::PlanningCollision)` - The listing can't be planned without overwriting
    pub fn analyze_names<I, S>(&self, names: I) -> Result<Analysis>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let report = self.classifier().classify(names);
        let outcome = self.planner().plan(&report.files)?;

        for skipped in &outcome.skipped {
            info!("Skipping '{}': {}", skipped.file, skipped.reason);
        }

        Ok(Analysis {
            files: report.files,
            plan: outcome.plan,
            skipped: outcome.skipped,
            notices: report.notices,
        })
    }

    /// Lists `target_path`, then classifies and plans it. Touches no files.
    pub async fn analyze(&self) -> Result<Analysis> {
        self.preflight_check()?;
        let names = Collector::new(&self.target_path)
            .collect_file_names()
            .await?;
        info!(
            "Found {} file(s) in {:?}",
            names.len(),
            self.target_path
        );
        self.analyze_names(names)
    }

    /// Renames files in `target_path` according to `plan`.
    ///
    /// Per-entry failures are reported in the returned [`ExecutionReport`], not as `Err`.
    pub async fn apply(&self, plan: &RenamePlan) -> Result<ExecutionReport> {
        self.preflight_check()?;
        let report = Executor::new(&self.target_path).apply(plan).await;
        if !report.is_success() {
            warn!("{} rename(s) failed", report.failed.len());
        }
        Ok(report)
    }

    /// Packages the organized directory as `<target_path>.cbz`, in plan order.
    ///
    /// Call after [`apply`](OrganizerConfig::apply) succeeded; the plan's target
    /// names are read from disk.
    pub async fn create_archive(&self, plan: &RenamePlan) -> Result<PathBuf> {
        self.preflight_check()?;
        if plan.is_empty() {
            return Err(Error::Other("Nothing to archive: the plan is empty".to_string()));
        }
        generator::archive_plan(&self.target_path, plan, self.write_comic_info).await
    }

    /// Packages an arbitrary directory of images in natural file-name order.
    ///
    /// Uses this configuration's cover name to pick the cover and its ComicInfo setting.
    pub async fn archive_directory(&self, directory: &Path) -> Result<PathBuf> {
        if !directory.is_dir() {
            return Err(Error::NotFound(format!(
                "Directory does not exist: {:?}",
                directory
            )));
        }
        generator::archive_directory(directory, Some(&self.cover_name), self.write_comic_info)
            .await
    }
}

impl OrganizerConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(Some(s)) = &self.page_name_regex_str {
            if Regex::new(s).is_err() {
                return Err(format!("Invalid page_name_regex: {}", s));
            }
        }

        let cover_name = self.cover_name.as_deref().unwrap_or(DEFAULT_COVER_NAME);
        let title_name = self.title_name.as_deref().unwrap_or(DEFAULT_TITLE_NAME);
        for name in [cover_name, title_name] {
            validate_file_stem(name).map_err(|e| e.to_string())?;
            if name.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!(
                    "Canonical name '{}' would collide with page names",
                    name
                ));
            }
        }
        if cover_name.eq_ignore_ascii_case(title_name) {
            return Err("Cover and title names must differ".to_string());
        }

        if let Some(width) = self.min_width {
            if width == 0 || width > MAX_MIN_WIDTH {
                return Err(format!(
                    "min_width must be between 1 and {}.",
                    MAX_MIN_WIDTH
                ));
            }
        }

        for keywords in [&self.cover_keywords, &self.title_keywords]
            .into_iter()
            .flatten()
        {
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err("Keywords must not be empty".to_string());
            }
        }

        Ok(())
    }
}

impl OrganizerConfigBuilder {
    /// Runs after `validate`, so an invalid pattern never reaches this point.
    fn compile_page_name_regex(&self) -> Option<Regex> {
        match &self.page_name_regex_str {
            Some(Some(s)) => Regex::new(s).ok(),
            _ => None,
        }
    }
}
