//! File-name classification for scanned book pages.
//!
//! The classifier inspects a flat set of file names (never their content) and
//! assigns each one a [`Classification`]: the cover, the title page, a numbered
//! content page, or unrecognized. It is a pure function over its input; the
//! order in which names are supplied does not affect the result.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::types::{CandidateFile, Classification, ClassificationReport, ClassifiedFile, Notice, Ordinal};

/// Cover keywords used when none are configured.
pub const DEFAULT_COVER_KEYWORDS: &[&str] = &["cover", "表紙"];
/// Title keywords used when none are configured.
pub const DEFAULT_TITLE_KEYWORDS: &[&str] = &["title", "扉"];

lazy_static! {
    /// Default Regex for extracting the page number from a file stem.
    /// ASCII digits only, so full-width numerals never produce an ordinal.
    pub static ref DEFAULT_PAGE_NUMBER_REGEX: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// How the cover file is picked.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum CoverDetection {
    /// No file is ever classified as the cover.
    Disabled,
    /// Only files whose stem contains a cover keyword.
    Keywords,
    /// Cover keywords first; otherwise the single unnumbered image, if there is exactly one.
    #[default]
    KeywordsOrInferred,
}

/// Assigns semantic roles to candidate file names.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    cover_keywords: Vec<Regex>,
    title_keywords: Vec<Regex>,
    page_name_regex: Option<&'a Regex>,
    cover_detection: CoverDetection,
    unnumbered_as_pages: bool,
}

impl Default for Classifier<'_> {
    fn default() -> Self {
        Self::new(
            DEFAULT_COVER_KEYWORDS,
            DEFAULT_TITLE_KEYWORDS,
            None,
            CoverDetection::default(),
            false,
        )
    }
}

impl<'a> Classifier<'a> {
    /// Creates a new Classifier.
    ///
    /// # Arguments
    ///
    /// * `cover_keywords` - Case-insensitive words marking the cover
    /// * `title_keywords` - Case-insensitive words marking the title page
    /// * `page_name_regex` - Optional custom regex for page numbers; group 1 is used when present
    /// * `cover_detection` - How the cover is picked
    /// * `unnumbered_as_pages` - Classify unnumbered images as `Page(None)` instead of unrecognized
    pub fn new<S: AsRef<str>>(
        cover_keywords: &[S],
        title_keywords: &[S],
        page_name_regex: Option<&'a Regex>,
        cover_detection: CoverDetection,
        unnumbered_as_pages: bool,
    ) -> Self {
        let normalize = |keywords: &[S]| -> Vec<Regex> {
            keywords
                .iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .filter_map(|k| match keyword_regex(&k) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!("Ignoring keyword '{}': {}", k, e);
                        None
                    }
                })
                .collect()
        };

        Self {
            cover_keywords: normalize(cover_keywords),
            title_keywords: normalize(title_keywords),
            page_name_regex,
            cover_detection,
            unnumbered_as_pages,
        }
    }

    /// Classifies every supplied name.
    ///
    /// The report holds exactly one [`ClassifiedFile`] per input name, sorted by
    /// name, plus any informational notices (ambiguous or inferred cover/title).
    pub fn classify<I, S>(&self, names: I) -> ClassificationReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<CandidateFile> = names.into_iter().map(CandidateFile::new).collect();
        files.sort_by(|a, b| a.name().cmp(b.name()));

        let mut tags: Vec<Option<Classification>> = files
            .iter()
            .map(|f| (!f.is_supported()).then_some(Classification::Unrecognized))
            .collect();
        let mut notices = Vec::new();

        if self.cover_detection != CoverDetection::Disabled {
            self.detect_cover(&files, &mut tags, &mut notices);
        }
        self.detect_title(&files, &mut tags, &mut notices);

        for (file, tag) in files.iter().zip(tags.iter_mut()) {
            if tag.is_some() {
                continue;
            }
            *tag = Some(match self.extract_ordinal(file.stem()) {
                Some(ordinal) => Classification::Page(Some(ordinal)),
                None if self.unnumbered_as_pages => Classification::Page(None),
                None => Classification::Unrecognized,
            });
        }

        let files: Vec<ClassifiedFile> = files
            .into_iter()
            .zip(tags)
            .map(|(file, tag)| {
                let classification = tag.unwrap_or(Classification::Unrecognized);
                debug!("Classified '{}' as {:?}", file.name(), classification);
                ClassifiedFile::new(file, classification)
            })
            .collect();

        ClassificationReport { files, notices }
    }

    /// Extracts the page ordinal from a file stem using the configured regex or the default.
    ///
    /// The last match wins. Returns `None` when nothing matches, when the match is not
    /// made of ASCII digits, or when the value does not fit in a `u64`.
    pub fn extract_ordinal(&self, stem: &str) -> Option<Ordinal> {
        let regex = self.page_name_regex.unwrap_or(&DEFAULT_PAGE_NUMBER_REGEX);

        regex.captures_iter(stem).last().and_then(|cap| {
            let digits = cap.get(1).or_else(|| cap.get(0))?.as_str();
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let value = digits.parse::<u64>().ok()?;
            Some(Ordinal {
                value,
                width: digits.len(),
            })
        })
    }

    fn detect_cover(
        &self,
        files: &[CandidateFile],
        tags: &mut [Option<Classification>],
        notices: &mut Vec<Notice>,
    ) {
        let matches = untagged_matching(files, tags, |f| {
            contains_keyword(f.stem(), &self.cover_keywords)
        });

        if let Some((&chosen, rest)) = matches.split_first() {
            tags[chosen] = Some(Classification::Cover);
            if !rest.is_empty() {
                let notice = Notice::AmbiguousCover {
                    chosen: files[chosen].name().to_string(),
                    others: rest.iter().map(|&i| files[i].name().to_string()).collect(),
                };
                warn!("{}", notice);
                notices.push(notice);
            }
            return;
        }

        if self.cover_detection != CoverDetection::KeywordsOrInferred {
            return;
        }

        let unnumbered = untagged_matching(files, tags, |f| {
            !contains_keyword(f.stem(), &self.title_keywords)
                && self.extract_ordinal(f.stem()).is_none()
        });
        if let [only] = unnumbered.as_slice() {
            tags[*only] = Some(Classification::Cover);
            let notice = Notice::InferredCover {
                file: files[*only].name().to_string(),
            };
            debug!("{}", notice);
            notices.push(notice);
        }
    }

    fn detect_title(
        &self,
        files: &[CandidateFile],
        tags: &mut [Option<Classification>],
        notices: &mut Vec<Notice>,
    ) {
        let matches = untagged_matching(files, tags, |f| {
            contains_keyword(f.stem(), &self.title_keywords)
        });

        if let Some((&chosen, rest)) = matches.split_first() {
            tags[chosen] = Some(Classification::Title);
            if !rest.is_empty() {
                let notice = Notice::AmbiguousTitle {
                    chosen: files[chosen].name().to_string(),
                    others: rest.iter().map(|&i| files[i].name().to_string()).collect(),
                };
                warn!("{}", notice);
                notices.push(notice);
            }
        }
    }
}

/// Indices of files that are still untagged and pass `test`, in name order.
fn untagged_matching<F>(files: &[CandidateFile], tags: &[Option<Classification>], test: F) -> Vec<usize>
where
    F: Fn(&CandidateFile) -> bool,
{
    files
        .iter()
        .enumerate()
        .filter(|(i, f)| tags[*i].is_none() && test(f))
        .map(|(i, _)| i)
        .collect()
}

/// Matches a lowercased keyword in a lowercased stem.
///
/// An edge of the keyword that is an ASCII letter must not touch another ASCII
/// letter, so `cover` matches `front_cover` and `cover01` but not `discovery`.
/// Keywords such as `表紙` keep plain substring matching.
fn keyword_regex(keyword: &str) -> Result<Regex, regex::Error> {
    let starts_with_letter = keyword.starts_with(|c: char| c.is_ascii_alphabetic());
    let ends_with_letter = keyword.ends_with(|c: char| c.is_ascii_alphabetic());

    Regex::new(&format!(
        "{}{}{}",
        if starts_with_letter { "(?:^|[^a-z])" } else { "" },
        regex::escape(keyword),
        if ends_with_letter { "(?:[^a-z]|$)" } else { "" },
    ))
}

fn contains_keyword(stem: &str, keywords: &[Regex]) -> bool {
    let stem = stem.to_lowercase();
    keywords.iter().any(|k| k.is_match(&stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_of(report: &ClassificationReport, name: &str) -> Classification {
        report
            .files
            .iter()
            .find(|f| f.file.name() == name)
            .map(|f| f.classification)
            .unwrap()
    }

    fn page(value: u64, width: usize) -> Classification {
        Classification::Page(Some(Ordinal { value, width }))
    }

    #[test]
    fn test_keyword_cover_and_pages() {
        let report = Classifier::default().classify(["表紙.jpg", "001.jpg", "002.jpg", "003.png"]);

        assert_eq!(tag_of(&report, "表紙.jpg"), Classification::Cover);
        assert_eq!(tag_of(&report, "001.jpg"), page(1, 3));
        assert_eq!(tag_of(&report, "003.png"), page(3, 3));
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_cover_keyword_is_case_insensitive() {
        let report = Classifier::default().classify(["Front_COVER.JPG", "p1.jpg"]);
        assert_eq!(tag_of(&report, "Front_COVER.JPG"), Classification::Cover);
    }

    #[test]
    fn test_keywords_inside_longer_words_do_not_match() {
        let report = Classifier::default().classify([
            "discovery_001.jpg",
            "discovery_002.jpg",
            "subtitle_01.jpg",
            "recovered_3.png",
        ]);

        assert_eq!(tag_of(&report, "discovery_001.jpg"), page(1, 3));
        assert_eq!(tag_of(&report, "discovery_002.jpg"), page(2, 3));
        assert_eq!(tag_of(&report, "subtitle_01.jpg"), page(1, 2));
        assert_eq!(tag_of(&report, "recovered_3.png"), page(3, 1));
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_keywords_next_to_digits_and_separators_match() {
        let report = Classifier::default().classify(["cover01.jpg", "vol1-title.jpg", "002.jpg"]);

        assert_eq!(tag_of(&report, "cover01.jpg"), Classification::Cover);
        assert_eq!(tag_of(&report, "vol1-title.jpg"), Classification::Title);
    }

    #[test]
    fn test_ambiguous_title_alphabetical_first_wins() {
        let report = Classifier::default().classify(["title_2.jpg", "title_1.jpg", "003.jpg"]);

        assert_eq!(tag_of(&report, "title_1.jpg"), Classification::Title);
        assert_eq!(tag_of(&report, "title_2.jpg"), page(2, 1));
        assert_eq!(
            report.notices,
            vec![Notice::AmbiguousTitle {
                chosen: "title_1.jpg".to_string(),
                others: vec!["title_2.jpg".to_string()],
            }]
        );
    }

    #[test]
    fn test_unsupported_extension_is_unrecognized() {
        let report = Classifier::default().classify(["notes.txt", "cover.gif", "README", "001.jpg"]);

        assert_eq!(tag_of(&report, "notes.txt"), Classification::Unrecognized);
        assert_eq!(tag_of(&report, "cover.gif"), Classification::Unrecognized);
        assert_eq!(tag_of(&report, "README"), Classification::Unrecognized);
        assert_eq!(tag_of(&report, "001.jpg"), page(1, 3));
    }

    #[test]
    fn test_ambiguous_cover_alphabetical_first_wins() {
        let report = Classifier::default().classify(["cover_b.jpg", "cover_a.jpg", "002.jpg"]);

        assert_eq!(tag_of(&report, "cover_a.jpg"), Classification::Cover);
        // No number in the losing stem, so it ends up unrecognized.
        assert_eq!(tag_of(&report, "cover_b.jpg"), Classification::Unrecognized);
        assert_eq!(
            report.notices,
            vec![Notice::AmbiguousCover {
                chosen: "cover_a.jpg".to_string(),
                others: vec!["cover_b.jpg".to_string()],
            }]
        );
    }

    #[test]
    fn test_losing_cover_candidate_falls_through_to_page() {
        let report = Classifier::default().classify(["cover.jpg", "cover_2.jpg", "001.jpg"]);

        assert_eq!(tag_of(&report, "cover.jpg"), Classification::Cover);
        assert_eq!(tag_of(&report, "cover_2.jpg"), page(2, 1));
    }

    #[test]
    fn test_inferred_cover_single_unnumbered_file() {
        let report = Classifier::default().classify(["manga.jpg", "manga_001.jpg", "manga_002.jpg"]);

        assert_eq!(tag_of(&report, "manga.jpg"), Classification::Cover);
        assert_eq!(
            report.notices,
            vec![Notice::InferredCover {
                file: "manga.jpg".to_string()
            }]
        );
    }

    #[test]
    fn test_no_inference_with_two_unnumbered_files() {
        let report = Classifier::default().classify(["a.jpg", "b.jpg", "001.jpg"]);

        assert_eq!(tag_of(&report, "a.jpg"), Classification::Unrecognized);
        assert_eq!(tag_of(&report, "b.jpg"), Classification::Unrecognized);
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_keywords_only_detection_does_not_infer() {
        let classifier = Classifier::new(
            DEFAULT_COVER_KEYWORDS,
            DEFAULT_TITLE_KEYWORDS,
            None,
            CoverDetection::Keywords,
            false,
        );
        let report = classifier.classify(["manga.jpg", "manga_001.jpg"]);
        assert_eq!(tag_of(&report, "manga.jpg"), Classification::Unrecognized);
    }

    #[test]
    fn test_title_keyword_is_not_inferred_as_cover() {
        let report = Classifier::default().classify(["扉.png", "01.png", "02.png"]);

        assert_eq!(tag_of(&report, "扉.png"), Classification::Title);
        assert!(report.files.iter().all(|f| !f.classification.is_cover()));
    }

    #[test]
    fn test_title_beats_page_number() {
        let report = Classifier::default().classify(["000_title.jpg", "001.jpg"]);
        assert_eq!(tag_of(&report, "000_title.jpg"), Classification::Title);
    }

    #[test]
    fn test_magazine_mode_unnumbered_become_pages() {
        let classifier = Classifier::new(
            DEFAULT_COVER_KEYWORDS,
            DEFAULT_TITLE_KEYWORDS,
            None,
            CoverDetection::Disabled,
            true,
        );
        let report = classifier.classify(["cover.jpg", "intro.jpg", "001.jpg"]);

        assert_eq!(tag_of(&report, "cover.jpg"), Classification::Page(None));
        assert_eq!(tag_of(&report, "intro.jpg"), Classification::Page(None));
        assert_eq!(tag_of(&report, "001.jpg"), page(1, 3));
    }

    #[test]
    fn test_extract_ordinal_takes_last_run() {
        let classifier = Classifier::default();

        assert_eq!(
            classifier.extract_ordinal("vol2_page_017"),
            Some(Ordinal { value: 17, width: 3 })
        );
        assert_eq!(
            classifier.extract_ordinal("0000"),
            Some(Ordinal { value: 0, width: 4 })
        );
        assert_eq!(classifier.extract_ordinal("no_number"), None);
        // Full-width digits are not page numbers.
        assert_eq!(classifier.extract_ordinal("ページ０１"), None);
        // Too large for u64.
        assert_eq!(classifier.extract_ordinal("99999999999999999999999"), None);
    }

    #[test]
    fn test_custom_page_regex_capture_group() {
        let regex = Regex::new(r"PAGE_(\d+)").unwrap();
        let classifier = Classifier::new(
            DEFAULT_COVER_KEYWORDS,
            DEFAULT_TITLE_KEYWORDS,
            Some(&regex),
            CoverDetection::Keywords,
            false,
        );

        assert_eq!(
            classifier.extract_ordinal("Book2_PAGE_007"),
            Some(Ordinal { value: 7, width: 3 })
        );
        assert_eq!(classifier.extract_ordinal("Book2_007"), None);
    }

    #[test]
    fn test_classification_ignores_input_order() {
        let classifier = Classifier::default();
        let a = classifier.classify(["c.jpg", "IMG_2.jpg", "cover.png", "IMG_1.jpg"]);
        let b = classifier.classify(["IMG_1.jpg", "cover.png", "IMG_2.jpg", "c.jpg"]);
        assert_eq!(a, b);
    }
}
