//! Query construction
//!
//! Turns a [`Configurations`](crate::config::Configurations) and the store's
//! capabilities into concrete, positional-argument queries, and resolves the
//! folder exclusions that feed into them.

pub mod exclusion;
pub mod predicate;

pub use exclusion::{
    file_name_of, parent_of, resolve_excluded_folders, ExclusionContext, MEDIA_IGNORE_FILENAME,
};
pub use predicate::{
    build_dir_query, build_file_query, DirQuery, FileQuery, Predicate, PredicateBuilder,
};
