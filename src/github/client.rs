use crate::config::ReadmeBoxConfig;
use crate::error::{ReadmeBoxError, RemoteError, Result};
use crate::repository::{CommitResult, PutFile, RemoteFile, RemoteResult, RepositoryClient};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("readme-box/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub REST client bound to one repository.
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(config: &ReadmeBoxConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|_| RemoteError::InvalidUrl(config.api_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.api_url.clone()).into());
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReadmeBoxError::Remote(RemoteError::Request(e)))?;

        Ok(Self {
            client,
            base_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    /// `{api}/repos/{owner}/{repo}/{segments...}`
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> RemoteResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    fn get_contents(&self, mut url: Url, path: &str, reference: &str) -> RemoteResult<RemoteFile> {
        url.query_pairs_mut().append_pair("ref", reference);
        debug!(%url, "fetching file");

        let response = self.authorized(self.client.get(url)).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            debug!(%status, path, "fetch failed");
            return Err(status_error(status, body, path, reference));
        }

        let contents: ContentsResponse = serde_json::from_str(&body)?;
        let content = decode_content(&contents)?;
        debug!(path = %contents.path, sha = %contents.sha, bytes = content.len(), "fetched file");

        Ok(RemoteFile {
            path: contents.path,
            sha: contents.sha,
            content,
        })
    }
}

impl RepositoryClient for GitHubClient {
    fn fetch_readme(&self, reference: &str) -> RemoteResult<RemoteFile> {
        let url = self.endpoint(["readme"])?;
        self.get_contents(url, "README", reference)
    }

    fn fetch_file(&self, path: &str, reference: &str) -> RemoteResult<RemoteFile> {
        let url = self.endpoint(contents_segments(path))?;
        self.get_contents(url, path, reference)
    }

    fn put_file(&self, path: &str, request: &PutFile<'_>) -> RemoteResult<CommitResult> {
        let url = self.endpoint(contents_segments(path))?;
        let body = PutFileBody {
            message: request.message,
            content: STANDARD.encode(request.content),
            sha: request.sha,
            branch: request.branch,
        };
        debug!(%url, branch = request.branch, "committing file");

        let response = self.authorized(self.client.put(url)).json(&body).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            debug!(%status, path, "commit failed");
            return Err(status_error(status, text, path, request.branch));
        }

        let result: CommitResult = serde_json::from_str(&text)?;
        debug!(commit = %result.commit.sha, "commit created");
        Ok(result)
    }
}

fn contents_segments(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty()))
}

fn status_error(status: StatusCode, body: String, path: &str, reference: &str) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound {
            path: path.to_string(),
            reference: reference.to_string(),
        },
        StatusCode::CONFLICT => RemoteError::Conflict {
            path: path.to_string(),
            body,
        },
        _ => RemoteError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

fn decode_content(contents: &ContentsResponse) -> RemoteResult<String> {
    let decode_error = |reason: String| RemoteError::Decode {
        path: contents.path.clone(),
        reason,
    };

    if let Some(encoding) = contents.encoding.as_deref() {
        if encoding != "base64" {
            return Err(decode_error(format!("unsupported encoding '{encoding}'")));
        }
    }

    // GitHub wraps base64 payloads at 60 columns.
    let compact: String = contents
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| decode_error(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}
