use crate::error::RemoteError;
use serde::Deserialize;

pub mod factory;
pub use factory::RepositoryFactory;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// A file as stored on the remote, with its content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
    pub content: String,
}

/// Parameters of a single content write.
#[derive(Debug, Clone)]
pub struct PutFile<'a> {
    pub content: &'a str,
    pub sha: Option<&'a str>,
    pub message: &'a str,
    pub branch: &'a str,
}

/// Metadata the remote returns for a commit that was created.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitResult {
    #[serde(default)]
    pub content: Option<ContentInfo>,
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentInfo {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Remote repository collaborator, bound to a single owner/repo.
pub trait RepositoryClient: Send + Sync {
    /// Fetch the repository's default README as resolved by the remote.
    fn fetch_readme(&self, reference: &str) -> RemoteResult<RemoteFile>;

    fn fetch_file(&self, path: &str, reference: &str) -> RemoteResult<RemoteFile>;

    fn put_file(&self, path: &str, request: &PutFile<'_>) -> RemoteResult<CommitResult>;
}
