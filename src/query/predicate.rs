//! Predicate composition for Store queries
//!
//! This module turns a [`Configurations`] into the filter expression and
//! positional argument list handed to the Store. Fragments and their
//! arguments are appended atomically through [`PredicateBuilder::push`],
//! which checks placeholder/argument parity at the append site. The
//! positional-binding contract is enforced by construction instead of by
//! convention.

use crate::config::Configurations;
use crate::store::{
    self, columns, SortOrder, StoreCapabilities, Table,
};

/// Columns projected for every record query
pub const FILE_PROJECTION: &[&str] = &[
    columns::ID,
    columns::DISPLAY_NAME,
    columns::PATH,
    columns::SIZE,
    columns::DATE_ADDED,
    columns::MIME_TYPE,
    columns::BUCKET_ID,
    columns::BUCKET_NAME,
    columns::HEIGHT,
    columns::WIDTH,
    columns::DURATION,
];

/// Columns projected for directory listings
pub const DIR_PROJECTION: &[&str] = &[
    columns::ID,
    columns::PATH,
    columns::DATE_ADDED,
    columns::BUCKET_ID,
    columns::BUCKET_NAME,
];

/// A filter expression plus its positional arguments
///
/// An empty expression matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    expression: String,
    args: Vec<String>,
}

impl Predicate {
    /// The predicate that matches everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// Number of `?` placeholders in the expression
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.expression)
    }
}

/// Incremental predicate assembly with fragment/argument pairing
///
/// Fragments are joined with the builder's connective (`and` by default,
/// `or` via [`PredicateBuilder::any_of`]). Every append goes through
/// [`push`](Self::push), so an argument can never drift away from its
/// placeholder.
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    fragments: Vec<String>,
    args: Vec<String>,
    connective: &'static str,
}

impl PredicateBuilder {
    /// A builder whose fragments are joined with `and`
    #[must_use]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            args: Vec::new(),
            connective: " and ",
        }
    }

    /// A builder whose fragments are joined with `or`
    #[must_use]
    pub fn any_of() -> Self {
        Self {
            fragments: Vec::new(),
            args: Vec::new(),
            connective: " or ",
        }
    }

    /// Append one fragment together with the arguments for its placeholders
    ///
    /// # Panics
    /// Panics if the number of `?` placeholders in `fragment` does not equal
    /// the number of supplied arguments. All fragments are crate-internal, so
    /// a mismatch is a construction bug, never an input error.
    pub fn push(
        &mut self,
        fragment: impl Into<String>,
        args: impl IntoIterator<Item = String>,
    ) -> &mut Self {
        let fragment = fragment.into();
        let args: Vec<String> = args.into_iter().collect();
        assert_eq!(
            count_placeholders(&fragment),
            args.len(),
            "fragment '{fragment}' placeholder/argument mismatch"
        );
        self.fragments.push(fragment);
        self.args.extend(args);
        self
    }

    /// Append another builder's output as one parenthesized group
    ///
    /// Empty groups are skipped entirely.
    pub fn push_group(&mut self, group: Self) -> &mut Self {
        if !group.is_empty() {
            let inner = group.build();
            self.push(format!("({})", inner.expression), inner.args);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn build(self) -> Predicate {
        Predicate {
            expression: self.fragments.join(self.connective),
            args: self.args,
        }
    }
}

impl Default for PredicateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn count_placeholders(fragment: &str) -> usize {
    fragment.bytes().filter(|&b| b == b'?').count()
}

/// A complete record query: table, projection, filter, and sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub table: Table,
    pub projection: Vec<&'static str>,
    pub predicate: Predicate,
    pub sort: SortOrder,
}

/// A complete directory-listing query
///
/// `grouped` records whether the store computes bucket counts itself; when
/// false the caller aggregates in a single pass over the raw rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirQuery {
    pub table: Table,
    pub projection: Vec<&'static str>,
    pub predicate: Predicate,
    pub sort: SortOrder,
    pub grouped: bool,
}

/// Build the record query for a configuration
///
/// Returns `None`, the empty-query signal, when no show-flag is enabled;
/// callers must then short-circuit to an empty result without touching the
/// Store.
///
/// Clause order (and therefore argument order) is: root-path prefix,
/// directory equality, the OR-group of type clauses, the zero-size guard,
/// and one NOT-LIKE constraint per excluded folder prefix.
#[must_use]
pub fn build_file_query(
    configs: &Configurations,
    caps: StoreCapabilities,
    dir_id: Option<i64>,
    excluded_folders: &[String],
) -> Option<FileQuery> {
    if !configs.any_type_enabled() {
        return None;
    }

    let others = configs.show_images() || configs.show_videos() || configs.show_files();
    let audio_only = configs.show_audios() && !others;
    let use_media_type = caps.has_unified_media_table || (!configs.show_audios() && others);
    let use_album_id = caps.has_unified_media_table || audio_only;
    let table = if !caps.has_unified_media_table && audio_only {
        Table::Audio
    } else {
        Table::Files
    };

    let mut builder = PredicateBuilder::new();

    if let Some(root) = configs.root_path() {
        builder.push(
            format!("{} LIKE ?", columns::PATH),
            [root_prefix_arg(root)],
        );
    }

    if let Some(dir) = dir_id {
        builder.push(format!("{} = ?", columns::BUCKET_ID), [dir.to_string()]);
    }

    if use_media_type {
        builder.push_group(type_clause_group(configs));
    }

    if configs.skip_zero_size_files() {
        builder.push(format!("{} > 0", columns::SIZE), []);
    }

    if !excluded_folders.is_empty() {
        let mut group = PredicateBuilder::new();
        for folder in excluded_folders {
            group.push(
                format!("{} NOT LIKE ?", columns::PATH),
                [format!("{folder}%")],
            );
        }
        builder.push_group(group);
    }

    let mut projection = FILE_PROJECTION.to_vec();
    if use_media_type {
        projection.push(columns::MEDIA_TYPE);
    }
    if use_album_id {
        projection.push(columns::ALBUM_ID);
    }

    Some(FileQuery {
        table,
        projection,
        predicate: builder.build(),
        sort: SortOrder::DateAddedDesc,
    })
}

/// Build the directory-listing query for a configuration
///
/// Directory listings always run against the unified table with media-type
/// clauses; only the counting strategy depends on store capabilities.
#[must_use]
pub fn build_dir_query(configs: &Configurations, caps: StoreCapabilities) -> Option<DirQuery> {
    if !configs.any_type_enabled() {
        return None;
    }

    let mut builder = PredicateBuilder::new();

    if let Some(root) = configs.root_path() {
        builder.push(
            format!("{} LIKE ?", columns::PATH),
            [root_prefix_arg(root)],
        );
    }

    builder.push_group(type_clause_group(configs));

    if configs.skip_zero_size_files() {
        builder.push(format!("{} > 0", columns::SIZE), []);
    }

    builder.push(format!("{} IS NOT NULL", columns::BUCKET_ID), []);

    let grouped = caps.supports_grouped_directory_query;
    let mut projection = DIR_PROJECTION.to_vec();
    if grouped {
        projection.push(columns::COUNT);
    }

    Some(DirQuery {
        table: Table::Files,
        projection,
        predicate: builder.build(),
        sort: SortOrder::DateAddedDesc,
        grouped,
    })
}

/// The OR-group of enabled type clauses
fn type_clause_group(configs: &Configurations) -> PredicateBuilder {
    let mut group = PredicateBuilder::any_of();

    if configs.show_images() {
        group.push(
            format!("{} = ?", columns::MEDIA_TYPE),
            [store::MEDIA_TYPE_IMAGE.to_string()],
        );
    }
    if configs.show_videos() {
        group.push(
            format!("{} = ?", columns::MEDIA_TYPE),
            [store::MEDIA_TYPE_VIDEO.to_string()],
        );
    }
    if configs.show_audios() {
        group.push(
            format!("{} = ?", columns::MEDIA_TYPE),
            [store::MEDIA_TYPE_AUDIO.to_string()],
        );
    }
    if configs.show_files() {
        if configs.suffixes().is_empty() {
            push_default_file_clause(&mut group);
        } else {
            group.push_group(suffix_clause(configs.suffixes()));
        }
    }

    group
}

/// Suffix allowlist: filename ends with any of the given extensions
fn suffix_clause(suffixes: &[String]) -> PredicateBuilder {
    let mut group = PredicateBuilder::any_of();
    for suffix in suffixes {
        let bare = suffix.replace('.', "");
        group.push(
            format!("{} LIKE ?", columns::DISPLAY_NAME),
            [format!("%.{bare}")],
        );
    }
    group
}

/// Default file clause: store-reported type is none or out of the known
/// range, and the mime type is neither a directory marker nor any media type
fn push_default_file_clause(group: &mut PredicateBuilder) {
    let mt = columns::MEDIA_TYPE;
    let mime = columns::MIME_TYPE;
    group.push(
        format!(
            "(({mt} = ? or {mt} > ?) and {mime} <> ? \
             and {mime} NOT LIKE ? and {mime} NOT LIKE ? and {mime} NOT LIKE ?)"
        ),
        [
            store::MEDIA_TYPE_NONE.to_string(),
            store::MEDIA_TYPE_VIDEO.to_string(),
            "resource/folder".to_string(),
            "image/%".to_string(),
            "video/%".to_string(),
            "audio/%".to_string(),
        ],
    );
}

/// Root path as a LIKE prefix, with exactly one trailing separator
fn root_prefix_arg(root: &str) -> String {
    if root.ends_with('/') {
        format!("{root}%")
    } else {
        format!("{root}/%")
    }
}
