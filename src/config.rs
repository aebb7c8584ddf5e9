use crate::error::{ReadmeBoxError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_CONFIG_FILE: &str = ".readme-box.toml";

static REPO_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("repository slug pattern is valid")
});

/// Immutable repository binding shared by every call made through a `ReadmeBox`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeBoxConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub branch: String,
    /// Section used when a command does not name one.
    pub section: Option<String>,
    pub api_url: String,
}

impl ReadmeBoxConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            branch: DEFAULT_BRANCH.to_string(),
            section: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Contents of a `.readme-box.toml` file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `owner/repo`
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub section: Option<String>,
    pub api_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReadmeBoxError::Config(format!(
                "Failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ReadmeBoxError::Config(format!(
                "Failed to parse config '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load an explicitly requested file, or the default file when it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(&default).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Values taken from command-line flags or their environment variables.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub api_url: Option<String>,
}

/// Merge overrides over the file config and fill in defaults.
pub fn resolve(overrides: &ConfigOverrides, file: Option<FileConfig>) -> Result<ReadmeBoxConfig> {
    let file = file.unwrap_or_default();

    let slug = overrides.repo.clone().or(file.repo).ok_or_else(|| {
        ReadmeBoxError::Config(
            "Repository is required (--repo, GITHUB_REPOSITORY or `repo` in config)".into(),
        )
    })?;
    let (owner, repo) = parse_repo_slug(&slug)?;

    let token = overrides
        .token
        .clone()
        .or(file.token)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ReadmeBoxError::Config(
                "Token is required (--token, GITHUB_TOKEN or `token` in config)".into(),
            )
        })?;

    let api_url = overrides
        .api_url
        .clone()
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    validate_api_url(&api_url)?;

    let branch = overrides
        .branch
        .clone()
        .or(file.branch)
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

    Ok(ReadmeBoxConfig {
        owner,
        repo,
        token,
        branch,
        section: file.section,
        api_url,
    })
}

pub fn parse_repo_slug(slug: &str) -> Result<(String, String)> {
    let captures = REPO_SLUG.captures(slug.trim()).ok_or_else(|| {
        ReadmeBoxError::Config(format!(
            "Invalid repository '{}'. Expected format owner/repo",
            slug
        ))
    })?;

    Ok((captures[1].to_string(), captures[2].to_string()))
}

pub fn validate_api_url(url: &str) -> Result<()> {
    let parsed =
        Url::parse(url).map_err(|_| ReadmeBoxError::Config(format!("Invalid API URL: {url}")))?;

    match parsed.scheme() {
        "https" | "http" => Ok(()),
        scheme => Err(ReadmeBoxError::Config(format!(
            "Unsupported API URL scheme: {scheme}"
        ))),
    }
}
