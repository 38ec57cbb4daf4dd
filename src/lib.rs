//! pickr: a filterable, paginated media picker core
//!
//! `pickr` turns a declarative [`Configurations`] into windowed, classified,
//! diffable lists of media records drawn from an external metadata
//! [`Store`](store::Store), and maintains a bounded multi-selection over
//! those lists. It owns no UI and opens no files: rendering and content
//! access go through opaque [`ContentRef`](media::ContentRef) locators.
//!
//! The pipeline: a configuration is compiled into a positional-argument
//! query ([`query`]), folder exclusions are resolved once per session
//! ([`query::exclusion`]), windows of raw rows are fetched and classified
//! ([`media`], [`source`]), and a [`SelectionSession`] tracks what the user
//! picked across every loaded window ([`selection`]).

pub mod config;
pub mod media;
pub mod query;
pub mod selection;
pub mod source;
pub mod store;

#[cfg(test)]
pub mod testing;

use thiserror::Error;

/// Top-level error type aggregating the module errors
#[derive(Debug, Error)]
pub enum PickrError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub use config::{ConfigError, Configurations, ConfigurationsBuilder};
pub use media::{aggregate_directories, ContentRef, Directory, MediaRecord, MediaType};
pub use selection::{NullListener, SelectionListener, SelectionSession, SelectionSnapshot};
pub use source::{DirectorySource, ListUpdate, LoadBatch, LoadTicket, MediaDataSource};
pub use store::{Store, StoreCapabilities, StoreError};
