//! Keep a marker-delimited section of a repository README up to date.
//!
//! A section is the text between `<!--START_SECTION:<name>-->` and
//! `<!--END_SECTION:<name>-->`. [`ReadmeBox`] fetches the README through the
//! GitHub contents API, replaces the section and commits the result only when
//! the document actually changed.

pub mod agents;
pub mod config;
pub mod error;
pub mod github;
pub mod repository;

pub use agents::{
    Document, ReadmeBox, ReadmeUpdate, ReplaceSection, SectionEditor, SectionMarker,
    SectionUpdate, UpdateRequest,
};
pub use config::ReadmeBoxConfig;
pub use error::{ReadmeBoxError, RemoteError, Result};
pub use repository::{CommitResult, RepositoryClient};
