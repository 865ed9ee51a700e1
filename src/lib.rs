//! book-organizer - Scanned Book Page Organizer
//!
//! This crate reorganizes a directory of scanned page images (cover, title,
//! sequential pages) into a canonical naming scheme and can package the result
//! as a CBZ archive.
//!
//! The core is a pure, synchronous engine: the [`classifier`] infers each file's
//! role from its name and the [`planner`] turns the classification into a
//! deterministic rename plan. Listing the directory, applying the plan and
//! writing archives are thin async collaborators around that core.
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use book_organizer::prelude::*;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> book_organizer::error::Result<()> {
//!     // 1. Configure the run
//!     let config = OrganizerConfig::builder()
//!         .target_path(PathBuf::from("./scans/my_book"))
//!         .build()?;
//!
//!     // 2. Classify and plan, without touching any file
//!     let analysis = config.analyze().await?;
//!     for entry in &analysis.plan {
//!         println!("{} -> {}", entry.source, entry.target);
//!     }
//!     for skipped in &analysis.skipped {
//!         println!("skipped {}: {}", skipped.file, skipped.reason);
//!     }
//!
//!     // 3. Apply the plan and package the result
//!     let report = config.apply(&analysis.plan).await?;
//!     if report.is_success() {
//!         config.create_archive(&analysis.plan).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The classifier and planner can be used on their own, over plain names:
//!
//! ```rust
//! use book_organizer::prelude::*;
//!
//! let report = Classifier::default().classify(["表紙.jpg", "001.jpg", "002.jpg"]);
//! let outcome = Planner::default().plan(&report.files).unwrap();
//! assert_eq!(outcome.plan.entries[0].target, "cover.jpg");
//! ```

pub mod classifier;
pub mod collector;
pub mod error;
pub mod executor;
pub mod generator;
pub mod organizer;
pub mod path_utils;
pub mod planner;
pub mod types;

pub use organizer::OrganizerConfig;
pub use organizer::OrganizerConfigBuilder;

pub use types::{
    Analysis, CandidateFile, Classification, ClassificationReport, ClassifiedFile,
    ExecutionReport, FailedEntry, ImageExtension, Notice, Ordinal, PlanEntry, PlanOutcome,
    RenamePlan, SkipReason, SkippedFile,
};

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types so a single
/// `use book_organizer::prelude::*;` is enough for typical use.
pub mod prelude {
    pub use super::{
        Analysis, CandidateFile, Classification, ClassificationReport, ClassifiedFile,
        ExecutionReport, FailedEntry, ImageExtension, Notice, Ordinal, OrganizerConfig,
        OrganizerConfigBuilder, PlanEntry, PlanOutcome, RenamePlan, SkipReason, SkippedFile,
        error, generator, types,
    };
    pub use crate::classifier::{Classifier, CoverDetection};
    pub use crate::collector::Collector;
    pub use crate::executor::Executor;
    pub use crate::generator::Generator;
    pub use crate::planner::Planner;
    pub use regex::Regex;
    pub use std::path::{Path, PathBuf};
}
