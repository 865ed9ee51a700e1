//! Rename planning.
//!
//! Turns classified files into an ordered, collision-free [`RenamePlan`]:
//! cover first, title second, then pages numbered sequentially from 1 in
//! (ordinal, file name) order. Files that can't be placed are returned in the
//! skipped list together with the reason.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::info;

use crate::error::{Error, Result};
use crate::types::{
    Classification, ClassifiedFile, Ordinal, PlanEntry, PlanOutcome, RenamePlan, SkipReason,
    SkippedFile,
};

/// Canonical stem for the cover.
pub const DEFAULT_COVER_NAME: &str = "cover";
/// Canonical stem for the title page. Sorts before the first page.
pub const DEFAULT_TITLE_NAME: &str = "000_title";
/// Minimum number of digits in page names.
pub const DEFAULT_MIN_WIDTH: usize = 3;

/// Produces rename plans from classified files. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct Planner {
    cover_name: String,
    title_name: String,
    min_width: usize,
    preserve_source_width: bool,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(DEFAULT_COVER_NAME, DEFAULT_TITLE_NAME, DEFAULT_MIN_WIDTH, false)
    }
}

impl Planner {
    /// Creates a new Planner.
    ///
    /// # Arguments
    ///
    /// * `cover_name` - Target stem for the cover (extension is kept from the source)
    /// * `title_name` - Target stem for the title page
    /// * `min_width` - Minimum zero-padded width of page numbers
    /// * `preserve_source_width` - Let the widest source page number widen the padding
    pub fn new(
        cover_name: impl Into<String>,
        title_name: impl Into<String>,
        min_width: usize,
        preserve_source_width: bool,
    ) -> Self {
        Self {
            cover_name: cover_name.into(),
            title_name: title_name.into(),
            min_width,
            preserve_source_width,
        }
    }

    /// Builds the rename plan for a full set of classified files.
    ///
    /// # Returns
    ///
    /// * `Ok(PlanOutcome)` - The plan (in reading order) and the skipped files.
    ///   `plan.len() + skipped.len()` always equals `classified.len()`.
    /// * `Err(Error::PlanningCollision)` - Two entries would share a target, one
    ///   source appears twice, or more than one file holds the cover or title role.
    pub fn plan(&self, classified: &[ClassifiedFile]) -> Result<PlanOutcome> {
        let mut covers: Vec<&ClassifiedFile> = Vec::new();
        let mut titles: Vec<&ClassifiedFile> = Vec::new();
        let mut pages: Vec<(Option<Ordinal>, &ClassifiedFile)> = Vec::new();
        let mut skipped: Vec<SkippedFile> = Vec::new();

        for classified_file in classified {
            let file = &classified_file.file;
            if !file.is_supported() {
                skipped.push(SkippedFile {
                    file: file.clone(),
                    reason: SkipReason::UnsupportedFile {
                        extension: file.raw_extension().to_string(),
                    },
                });
                continue;
            }

            match classified_file.classification {
                Classification::Cover => covers.push(classified_file),
                Classification::Title => titles.push(classified_file),
                Classification::Page(ordinal) => pages.push((ordinal, classified_file)),
                Classification::Unrecognized => skipped.push(SkippedFile {
                    file: file.clone(),
                    reason: SkipReason::Unrecognized,
                }),
            }
        }

        ensure_single_role(&covers, &self.cover_name)?;
        ensure_single_role(&titles, &self.title_name)?;

        // Unnumbered pages lead; ties on the ordinal fall back to the file name.
        pages.sort_by(|(a_ord, a), (b_ord, b)| {
            match a_ord.map(|o| o.value).cmp(&b_ord.map(|o| o.value)) {
                Ordering::Equal => a.file.name().cmp(b.file.name()),
                order => order,
            }
        });

        let width = self.page_width(&pages);
        let mut entries = Vec::with_capacity(covers.len() + titles.len() + pages.len());

        for cover in covers {
            entries.push(Self::entry(cover, &self.cover_name));
        }
        for title in titles {
            entries.push(Self::entry(title, &self.title_name));
        }
        for (number, (_, page)) in pages.into_iter().enumerate() {
            let stem = format!("{:0width$}", number + 1, width = width);
            entries.push(Self::entry(page, &stem));
        }

        check_collisions(&entries)?;

        skipped.sort_by(|a, b| a.file.name().cmp(b.file.name()));
        info!(
            "Planned {} file(s): {} rename(s), {} skipped",
            entries.len(),
            entries.iter().filter(|e| !e.is_identity()).count(),
            skipped.len()
        );

        Ok(PlanOutcome {
            plan: RenamePlan { entries },
            skipped,
        })
    }

    /// Zero-pad width for `pages`: enough digits for the page count, never below `min_width`.
    fn page_width(&self, pages: &[(Option<Ordinal>, &ClassifiedFile)]) -> usize {
        let count_width = digit_count(pages.len());
        let source_width = if self.preserve_source_width {
            pages
                .iter()
                .filter_map(|(ordinal, _)| ordinal.map(|o| o.width))
                .max()
                .unwrap_or(0)
        } else {
            0
        };

        self.min_width.max(count_width).max(source_width)
    }

    fn entry(classified: &ClassifiedFile, stem: &str) -> PlanEntry {
        let extension = classified
            .file
            .extension()
            .map(|e| e.as_str())
            .unwrap_or_default();

        PlanEntry {
            source: classified.file.clone(),
            classification: classified.classification,
            target: format!("{}.{}", stem, extension),
        }
    }
}

fn digit_count(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

fn ensure_single_role(holders: &[&ClassifiedFile], canonical: &str) -> Result<()> {
    if holders.len() > 1 {
        return Err(Error::PlanningCollision {
            target: canonical.to_string(),
            sources: holders.iter().map(|h| h.file.name().to_string()).collect(),
        });
    }
    Ok(())
}

/// Fails on the first target claimed twice, then on the first source listed twice.
fn check_collisions(entries: &[PlanEntry]) -> Result<()> {
    let mut by_target: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in entries {
        by_target
            .entry(entry.target.as_str())
            .or_default()
            .push(entry.source.name());
    }
    if let Some(entry) = entries.iter().find(|e| by_target[e.target.as_str()].len() > 1) {
        return Err(Error::PlanningCollision {
            target: entry.target.clone(),
            sources: by_target[entry.target.as_str()]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        });
    }

    let mut by_source: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in entries {
        by_source
            .entry(entry.source.name())
            .or_default()
            .push(entry.target.as_str());
    }
    if let Some(entry) = entries.iter().find(|e| by_source[e.source.name()].len() > 1) {
        return Err(Error::PlanningCollision {
            target: entry.source.name().to_string(),
            sources: vec![entry.source.name().to_string(); by_source[entry.source.name()].len()],
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::types::CandidateFile;

    fn plan_names(names: &[&str]) -> PlanOutcome {
        let report = Classifier::default().classify(names.iter().copied());
        Planner::default().plan(&report.files).unwrap()
    }

    fn pairs(outcome: &PlanOutcome) -> Vec<(String, String)> {
        outcome
            .plan
            .iter()
            .map(|e| (e.source.name().to_string(), e.target.clone()))
            .collect()
    }

    fn numbered(name: &str, value: u64) -> ClassifiedFile {
        ClassifiedFile::new(
            CandidateFile::new(name),
            Classification::Page(Some(Ordinal { value, width: 1 })),
        )
    }

    #[test]
    fn test_cover_then_pages() {
        let outcome = plan_names(&["表紙.jpg", "001.jpg", "002.jpg", "003.png"]);
        assert_eq!(
            pairs(&outcome),
            vec![
                ("表紙.jpg".to_string(), "cover.jpg".to_string()),
                ("001.jpg".to_string(), "001.jpg".to_string()),
                ("002.jpg".to_string(), "002.jpg".to_string()),
                ("003.png".to_string(), "003.png".to_string()),
            ]
        );
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_pages_sorted_by_extracted_ordinal() {
        let outcome = plan_names(&["IMG_003.jpg", "IMG_001.jpg", "IMG_002.jpg"]);
        assert_eq!(
            pairs(&outcome),
            vec![
                ("IMG_001.jpg".to_string(), "001.jpg".to_string()),
                ("IMG_002.jpg".to_string(), "002.jpg".to_string()),
                ("IMG_003.jpg".to_string(), "003.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_unsupported_file_is_skipped_with_reason() {
        let outcome = plan_names(&["notes.txt", "001.jpg"]);

        assert_eq!(outcome.plan.len(), 1);
        assert_eq!(outcome.plan.entries[0].target, "001.jpg");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].file.name(), "notes.txt");
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::UnsupportedFile {
                extension: "txt".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_source_is_a_collision() {
        let classified = vec![numbered("a.jpg", 1), numbered("a.jpg", 1)];
        let result = Planner::default().plan(&classified);

        match result {
            Err(Error::PlanningCollision { target, sources }) => {
                assert_eq!(target, "a.jpg");
                assert_eq!(sources, vec!["a.jpg".to_string(), "a.jpg".to_string()]);
            }
            other => panic!("expected a planning collision, got {:?}", other),
        }
    }

    #[test]
    fn test_same_canonical_name_for_cover_and_title_is_a_collision() {
        let classified = vec![
            ClassifiedFile::new(CandidateFile::new("front.jpg"), Classification::Cover),
            ClassifiedFile::new(CandidateFile::new("inner.jpg"), Classification::Title),
        ];
        let planner = Planner::new("front", "front", 3, false);

        assert!(matches!(
            planner.plan(&classified),
            Err(Error::PlanningCollision { target, .. }) if target == "front.jpg"
        ));
    }

    #[test]
    fn test_two_covers_are_a_collision() {
        let classified = vec![
            ClassifiedFile::new(CandidateFile::new("a.jpg"), Classification::Cover),
            ClassifiedFile::new(CandidateFile::new("b.png"), Classification::Cover),
        ];
        assert!(matches!(
            Planner::default().plan(&classified),
            Err(Error::PlanningCollision { .. })
        ));
    }

    #[test]
    fn test_ties_broken_by_file_name() {
        let classified = vec![numbered("p1b.jpg", 1), numbered("p1a.jpg", 1), numbered("p0.jpg", 0)];
        let outcome = Planner::default().plan(&classified).unwrap();

        assert_eq!(
            pairs(&outcome),
            vec![
                ("p0.jpg".to_string(), "001.jpg".to_string()),
                ("p1a.jpg".to_string(), "002.jpg".to_string()),
                ("p1b.jpg".to_string(), "003.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_title_follows_cover() {
        let outcome = plan_names(&["scan_02.jpg", "title.png", "scan_01.jpg", "Cover.JPG"]);
        assert_eq!(
            pairs(&outcome),
            vec![
                ("Cover.JPG".to_string(), "cover.jpg".to_string()),
                ("title.png".to_string(), "000_title.png".to_string()),
                ("scan_01.jpg".to_string(), "001.jpg".to_string()),
                ("scan_02.jpg".to_string(), "002.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_contiguous_ordinals_are_renumbered() {
        let outcome = plan_names(&["p10.jpg", "p40.jpg", "p7.jpg"]);
        let targets: Vec<&str> = outcome.plan.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["001.jpg", "002.jpg", "003.jpg"]);
        assert_eq!(outcome.plan.entries[0].source.name(), "p7.jpg");
    }

    #[test]
    fn test_width_grows_with_page_count() {
        let names: Vec<String> = (1..=1000).map(|i| format!("p{}.jpg", i)).collect();
        let report = Classifier::default().classify(names);
        let outcome = Planner::default().plan(&report.files).unwrap();

        assert_eq!(outcome.plan.entries[0].target, "0001.jpg");
        assert_eq!(outcome.plan.entries[999].target, "1000.jpg");
    }

    #[test]
    fn test_preserve_source_width() {
        let report = Classifier::default().classify(["00001.png", "00002.png"]);

        let widened = Planner::new(DEFAULT_COVER_NAME, DEFAULT_TITLE_NAME, 3, true)
            .plan(&report.files)
            .unwrap();
        assert!(widened.plan.is_identity());

        let default = Planner::default().plan(&report.files).unwrap();
        assert_eq!(default.plan.entries[0].target, "001.png");
    }

    #[test]
    fn test_unnumbered_pages_lead() {
        let classified = vec![
            numbered("manga_001.jpg", 1),
            ClassifiedFile::new(CandidateFile::new("manga.jpg"), Classification::Page(None)),
        ];
        let outcome = Planner::default().plan(&classified).unwrap();
        assert_eq!(
            pairs(&outcome),
            vec![
                ("manga.jpg".to_string(), "001.jpg".to_string()),
                ("manga_001.jpg".to_string(), "002.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_canonical_listing_plans_to_identity() {
        let outcome = plan_names(&["cover.jpg", "000_title.png", "001.jpg", "002.jpg", "003.png"]);
        assert_eq!(outcome.plan.len(), 5);
        assert!(outcome.plan.is_identity());
    }

    #[test]
    fn test_empty_input_is_an_empty_plan() {
        let outcome = Planner::default().plan(&[]).unwrap();
        assert!(outcome.plan.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_unrecognized_image_is_skipped() {
        let outcome = plan_names(&["a.jpg", "b.jpg", "001.jpg"]);
        assert_eq!(outcome.plan.len(), 1);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(
            outcome
                .skipped
                .iter()
                .all(|s| s.reason == SkipReason::Unrecognized)
        );
    }
}
