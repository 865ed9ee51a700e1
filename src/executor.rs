//! Applies a [`RenamePlan`] to a directory.
//!
//! Renames run in two phases so that chains and swaps inside one plan
//! (`001.jpg → 002.jpg` while `002.jpg → 003.jpg`) never clobber each other:
//! every moving source is first parked under a temporary name, then each
//! parked file is moved to its target. Entries are independent. A failing
//! entry is restored to its original name where possible and reported; it
//! never stops the remaining entries, and no existing file is overwritten.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tokio::fs;

use crate::types::{ExecutionReport, FailedEntry, PlanEntry, RenamePlan};

/// Prefix of the temporary names used between the two phases.
const TEMP_PREFIX: &str = ".book-organizer-tmp";

/// Executes rename plans inside one directory.
#[derive(Debug)]
pub struct Executor<'a> {
    directory: &'a Path,
}

impl<'a> Executor<'a> {
    pub fn new(directory: &'a Path) -> Self {
        Self { directory }
    }

    /// Applies `plan` and reports the outcome of every entry.
    pub async fn apply(&self, plan: &RenamePlan) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        let (unchanged, moving): (Vec<&PlanEntry>, Vec<&PlanEntry>) =
            plan.iter().partition(|e| e.is_identity());
        report.unchanged = unchanged.into_iter().cloned().collect();

        let moving_sources: HashSet<&str> = moving.iter().map(|e| e.source.name()).collect();

        // Phase 1: park every source under a temporary name.
        let mut parked: Vec<(&PlanEntry, PathBuf)> = Vec::with_capacity(moving.len());
        for (index, entry) in moving.into_iter().enumerate() {
            let target = self.directory.join(&entry.target);
            // A case-only rename on a case-insensitive filesystem sees its own source as the target.
            let same_file = entry.target.to_lowercase() == entry.source.name().to_lowercase();
            if !same_file
                && !moving_sources.contains(entry.target.as_str())
                && path_exists(&target).await
            {
                Self::fail(&mut report, entry, "target already exists".to_string());
                continue;
            }

            let source = self.directory.join(entry.source.name());
            let temp = self.directory.join(format!("{}-{:04}-{}", TEMP_PREFIX, index, entry.target));
            match fs::rename(&source, &temp).await {
                Ok(()) => {
                    debug!("Parked '{}' as {:?}", entry.source, temp);
                    parked.push((entry, temp));
                }
                Err(e) => Self::fail(&mut report, entry, format!("failed to move source: {}", e)),
            }
        }

        // Phase 2: move parked files onto their targets.
        for (entry, temp) in parked {
            let target = self.directory.join(&entry.target);

            let outcome = if path_exists(&target).await {
                Err("target already exists".to_string())
            } else {
                fs::rename(&temp, &target)
                    .await
                    .map_err(|e| format!("failed to move to target: {}", e))
            };

            match outcome {
                Ok(()) => {
                    debug!("Renamed '{}' -> '{}'", entry.source, entry.target);
                    report.applied.push(entry.clone());
                }
                Err(reason) => {
                    let reason = match self.restore(entry, &temp).await {
                        Ok(()) => reason,
                        Err(restore_reason) => format!("{}; {}", reason, restore_reason),
                    };
                    Self::fail(&mut report, entry, reason);
                }
            }
        }

        info!(
            "Applied {} rename(s), {} unchanged, {} failed",
            report.applied.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        report
    }

    /// Moves a parked file back to its source name, or leaves it parked if that name is taken.
    async fn restore(&self, entry: &PlanEntry, temp: &Path) -> std::result::Result<(), String> {
        let source = self.directory.join(entry.source.name());
        if path_exists(&source).await {
            return Err(format!(
                "original name is taken, file left at {:?}",
                temp.file_name().unwrap_or_default()
            ));
        }
        fs::rename(temp, &source).await.map_err(|e| {
            format!(
                "could not restore original name ({}), file left at {:?}",
                e,
                temp.file_name().unwrap_or_default()
            )
        })
    }

    fn fail(report: &mut ExecutionReport, entry: &PlanEntry, error: String) {
        warn!("Could not rename '{}' -> '{}': {}", entry.source, entry.target, error);
        report.failed.push(FailedEntry {
            entry: entry.clone(),
            error,
        });
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}
