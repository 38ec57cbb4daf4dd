//! Picking-session configuration
//!
//! A [`Configurations`] value is immutable once built and describes one
//! picking session: which media types to show, where to look, what to skip,
//! and how selection is bounded. Construction goes through the fluent
//! [`ConfigurationsBuilder`], which compiles ignore patterns and enforces the
//! single-choice coupling rules at build time.

use regex::Regex;
use thiserror::Error;

use crate::media::MediaRecord;

/// Default document suffixes shown when `show_files` is enabled
pub const DEFAULT_SUFFIXES: &[&str] = &[
    "txt", "pdf", "html", "rtf", "csv", "xml", "zip", "tar", "gz", "rar", "7z", "torrent", "doc",
    "docx", "odt", "ott", "ppt", "pptx", "pps", "xls", "xlsx", "ods", "ots",
];

/// Default page size for windowed loads
pub const DEFAULT_PAGE_SIZE: usize = 120;
/// Default prefetch distance hint
pub const DEFAULT_PREFETCH_DISTANCE: usize = 40;

/// Errors raised while building a [`Configurations`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An ignore pattern failed to compile as a regex
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidIgnorePattern { pattern: String, reason: String },

    /// Page size must be at least one
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
}

/// A compiled ignore pattern with full-match semantics
///
/// The original pattern text is kept for display and comparison; matching
/// always runs against the anchored compilation, so a pattern matches a path
/// only when it covers the entire string.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    original: String,
    compiled: Regex,
}

impl IgnorePattern {
    /// Compile a pattern, anchoring it for full-match semantics
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidIgnorePattern`] when the pattern is not
    /// a valid regex.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{pattern})$");
        match Regex::new(&anchored) {
            Ok(compiled) => Ok(Self {
                original: pattern.to_string(),
                compiled,
            }),
            Err(err) => Err(ConfigError::InvalidIgnorePattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// True when the pattern matches the whole of `path`
    #[must_use]
    pub fn matches_fully(&self, path: &str) -> bool {
        self.compiled.is_match(path)
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl PartialEq for IgnorePattern {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
    }
}

impl Eq for IgnorePattern {}

/// Immutable configuration for one picking session
#[derive(Debug, Clone)]
pub struct Configurations {
    show_images: bool,
    show_videos: bool,
    show_audios: bool,
    show_files: bool,
    suffixes: Vec<String>,
    root_path: Option<String>,
    skip_zero_size_files: bool,
    ignore_hidden_directories: bool,
    ignore_no_media_marked_directories: bool,
    ignore_path_patterns: Vec<IgnorePattern>,
    max_selection: i32,
    single_choice_mode: bool,
    single_click_selection: bool,
    page_size: usize,
    prefetch_distance: usize,
    selected_records: Vec<MediaRecord>,
}

impl Configurations {
    #[must_use]
    pub fn builder() -> ConfigurationsBuilder {
        ConfigurationsBuilder::new()
    }

    #[must_use]
    pub fn show_images(&self) -> bool {
        self.show_images
    }

    #[must_use]
    pub fn show_videos(&self) -> bool {
        self.show_videos
    }

    #[must_use]
    pub fn show_audios(&self) -> bool {
        self.show_audios
    }

    #[must_use]
    pub fn show_files(&self) -> bool {
        self.show_files
    }

    /// True when at least one media type is enabled
    #[must_use]
    pub fn any_type_enabled(&self) -> bool {
        self.show_images || self.show_videos || self.show_audios || self.show_files
    }

    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    #[must_use]
    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    #[must_use]
    pub fn skip_zero_size_files(&self) -> bool {
        self.skip_zero_size_files
    }

    #[must_use]
    pub fn ignore_hidden_directories(&self) -> bool {
        self.ignore_hidden_directories
    }

    #[must_use]
    pub fn ignore_no_media_marked_directories(&self) -> bool {
        self.ignore_no_media_marked_directories
    }

    #[must_use]
    pub fn ignore_path_patterns(&self) -> &[IgnorePattern] {
        &self.ignore_path_patterns
    }

    /// True when any exclusion rule is active and a scan is worth running
    #[must_use]
    pub fn needs_exclusion_scan(&self) -> bool {
        self.ignore_hidden_directories
            || self.ignore_no_media_marked_directories
            || !self.ignore_path_patterns.is_empty()
    }

    /// Selection bound; zero or negative means unbounded
    #[must_use]
    pub fn max_selection(&self) -> i32 {
        self.max_selection
    }

    #[must_use]
    pub fn single_choice_mode(&self) -> bool {
        self.single_choice_mode
    }

    #[must_use]
    pub fn single_click_selection(&self) -> bool {
        self.single_click_selection
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn prefetch_distance(&self) -> usize {
        self.prefetch_distance
    }

    /// Records the selection session starts out with
    #[must_use]
    pub fn selected_records(&self) -> &[MediaRecord] {
        &self.selected_records
    }
}

impl Default for Configurations {
    fn default() -> Self {
        Self {
            show_images: true,
            show_videos: true,
            show_audios: false,
            show_files: false,
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
            root_path: None,
            skip_zero_size_files: true,
            ignore_hidden_directories: true,
            ignore_no_media_marked_directories: true,
            ignore_path_patterns: Vec::new(),
            max_selection: -1,
            single_choice_mode: false,
            single_click_selection: true,
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
            selected_records: Vec::new(),
        }
    }
}

/// Fluent builder for [`Configurations`]
///
/// Single-choice coupling follows the original picker's contract: enabling
/// single-choice forces the bound to one and clears any seeded selection, and
/// while it is enabled the `max_selection` and `selected_records` setters are
/// ignored rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationsBuilder {
    configs: Configurations,
    raw_patterns: Vec<String>,
}

impl ConfigurationsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn show_images(mut self, show: bool) -> Self {
        self.configs.show_images = show;
        self
    }

    #[must_use]
    pub fn show_videos(mut self, show: bool) -> Self {
        self.configs.show_videos = show;
        self
    }

    #[must_use]
    pub fn show_audios(mut self, show: bool) -> Self {
        self.configs.show_audios = show;
        self
    }

    #[must_use]
    pub fn show_files(mut self, show: bool) -> Self {
        self.configs.show_files = show;
        self
    }

    /// Replace the document suffix allowlist; an empty list falls back to the
    /// untyped-row clause instead of matching nothing
    #[must_use]
    pub fn suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.configs.suffixes = suffixes;
        self
    }

    #[must_use]
    pub fn root_path(mut self, root: impl Into<String>) -> Self {
        self.configs.root_path = Some(root.into());
        self
    }

    #[must_use]
    pub fn skip_zero_size_files(mut self, skip: bool) -> Self {
        self.configs.skip_zero_size_files = skip;
        self
    }

    #[must_use]
    pub fn ignore_hidden_directories(mut self, ignore: bool) -> Self {
        self.configs.ignore_hidden_directories = ignore;
        self
    }

    #[must_use]
    pub fn ignore_no_media_marked_directories(mut self, ignore: bool) -> Self {
        self.configs.ignore_no_media_marked_directories = ignore;
        self
    }

    /// Raw regex patterns, compiled (anchored) at `build()`
    #[must_use]
    pub fn ignore_path_patterns(mut self, patterns: Vec<String>) -> Self {
        self.raw_patterns = patterns;
        self
    }

    /// Ignored while single-choice mode is enabled
    #[must_use]
    pub fn max_selection(mut self, max: i32) -> Self {
        if !self.configs.single_choice_mode {
            self.configs.max_selection = max;
        }
        self
    }

    /// Single-choice forces `max_selection = 1` and clears any seed
    #[must_use]
    pub fn single_choice_mode(mut self, single: bool) -> Self {
        self.configs.single_choice_mode = single;
        if single {
            self.configs.max_selection = 1;
            self.configs.selected_records.clear();
        }
        self
    }

    #[must_use]
    pub fn single_click_selection(mut self, single_click: bool) -> Self {
        self.configs.single_click_selection = single_click;
        self
    }

    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.configs.page_size = size;
        self
    }

    #[must_use]
    pub fn prefetch_distance(mut self, distance: usize) -> Self {
        self.configs.prefetch_distance = distance;
        self
    }

    /// Seed the selection; ignored while single-choice mode is enabled
    #[must_use]
    pub fn selected_records(mut self, records: Vec<MediaRecord>) -> Self {
        if !self.configs.single_choice_mode {
            self.configs.selected_records = records;
        }
        self
    }

    /// Finalize the configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] when an ignore pattern fails to compile or the
    /// page size is zero.
    pub fn build(mut self) -> Result<Configurations, ConfigError> {
        if self.configs.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        self.configs.ignore_path_patterns = self
            .raw_patterns
            .iter()
            .map(|p| IgnorePattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        if self.configs.single_choice_mode {
            self.configs.max_selection = 1;
            self.configs.selected_records.clear();
        }
        Ok(self.configs)
    }
}
