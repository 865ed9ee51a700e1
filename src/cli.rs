use std::path::PathBuf;

use book_organizer::OrganizerConfig;
use book_organizer::error::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "book-organizer", version)]
#[command(
    about = "Rename scanned book pages to cover / 000_title / 001... and optionally pack them as CBZ",
    long_about = None,
    after_help = "Examples:
  book-organizer                         organize the current directory
  book-organizer --dry-run ./book        preview only
  book-organizer --auto --cbz ./book     organize without asking, then create book.cbz
  book-organizer --magazine ./clippings  no cover detection, unnumbered files first
  book-organizer --to-cbz ./manga_dir    pack an existing directory as CBZ"
)]
pub struct Cli {
    /// Directory to organize
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Show the plan without changing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Apply the plan without asking for confirmation
    #[arg(long)]
    pub auto: bool,

    /// Create <directory>.cbz after organizing
    #[arg(long)]
    pub cbz: bool,

    /// Pack the given directory as CBZ in natural file order, without renaming anything
    #[arg(long, value_name = "DIRECTORY")]
    pub to_cbz: Option<PathBuf>,

    /// Magazine clippings: no cover detection, unnumbered images come first
    #[arg(long)]
    pub magazine: bool,

    /// Keyword marking the cover (repeatable, replaces the defaults)
    #[arg(long = "cover-keyword", value_name = "KEYWORD")]
    pub cover_keywords: Vec<String>,

    /// Keyword marking the title page (repeatable, replaces the defaults)
    #[arg(long = "title-keyword", value_name = "KEYWORD")]
    pub title_keywords: Vec<String>,

    /// Regex extracting the page number from a file stem (group 1 if present)
    #[arg(long, value_name = "REGEX")]
    pub page_regex: Option<String>,

    /// Target name for the cover, without extension [default: cover]
    ///
    /// `cover.jpg` sorts after `001.jpg` in a file listing. Archives still store
    /// the cover first (as `000_cover`); pick a name such as `000_cover` if the
    /// directory itself should list the cover first.
    #[arg(long, value_name = "NAME")]
    pub cover_name: Option<String>,

    /// Target name for the title page, without extension
    #[arg(long, value_name = "NAME")]
    pub title_name: Option<String>,

    /// Minimum number of digits in page names
    #[arg(long, default_value_t = 3)]
    pub min_width: usize,

    /// Keep the source page-number width when it is wider
    #[arg(long)]
    pub preserve_width: bool,

    /// Never guess the cover from the single unnumbered image
    #[arg(long)]
    pub no_infer_cover: bool,

    /// Embed ComicInfo.xml in created archives
    #[arg(long)]
    pub comic_info: bool,
}

impl Cli {
    /// Maps the arguments onto an organizer configuration for `target`.
    pub fn to_config(&self, target: PathBuf) -> Result<OrganizerConfig> {
        let mut builder = OrganizerConfig::builder();
        builder
            .target_path(target)
            .magazine_mode(self.magazine)
            .infer_cover(!self.no_infer_cover)
            .min_width(self.min_width)
            .preserve_source_width(self.preserve_width)
            .write_comic_info(self.comic_info);

        if !self.cover_keywords.is_empty() {
            builder.cover_keywords(self.cover_keywords.clone());
        }
        if !self.title_keywords.is_empty() {
            builder.title_keywords(self.title_keywords.clone());
        }
        if let Some(regex) = &self.page_regex {
            builder.page_name_regex_str(regex.clone());
        }
        if let Some(name) = &self.cover_name {
            builder.cover_name(name.clone());
        }
        if let Some(name) = &self.title_name {
            builder.title_name(name.clone());
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cover_name_help_explains_listing_order() {
        let command = Cli::command();
        let argument = command
            .get_arguments()
            .find(|a| a.get_id() == "cover_name")
            .unwrap();
        let help = argument.get_long_help().unwrap().to_string();

        assert!(help.contains("sorts after `001.jpg`"));
        assert!(help.contains("000_cover"));
    }

    #[test]
    fn test_arguments_map_onto_config() {
        let cli = Cli::parse_from([
            "book-organizer",
            "--magazine",
            "--cover-keyword",
            "front",
            "--cover-name",
            "000_cover",
            "--min-width",
            "4",
            "scans",
        ]);
        let config = cli.to_config(cli.directory.clone()).unwrap();

        assert_eq!(config.target_path, PathBuf::from("scans"));
        assert!(config.magazine_mode);
        assert_eq!(config.cover_keywords, vec!["front".to_string()]);
        assert_eq!(config.cover_name, "000_cover");
        assert_eq!(config.min_width, 4);
        assert_eq!(config.title_name, "000_title");
    }
}
