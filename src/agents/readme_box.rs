use crate::agents::section_editor::{ReplaceSection, SectionEditor};
use crate::config::ReadmeBoxConfig;
use crate::error::{ReadmeBoxError, Result};
use crate::repository::{CommitResult, PutFile, RepositoryClient, RepositoryFactory};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_README_PATH: &str = "README.md";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update README";

/// A fetched README together with the handle needed to commit over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub sha: String,
    pub branch: String,
    pub content: String,
}

/// Everything needed for one `ReadmeBox::update_section` call.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub config: ReadmeBoxConfig,
    pub section: String,
    /// Defaults to the repository README.
    pub path: Option<String>,
    pub message: Option<String>,
    /// Commit even when the section already holds the new content.
    pub empty_commits: bool,
}

impl UpdateRequest {
    pub fn new(config: ReadmeBoxConfig, section: impl Into<String>) -> Self {
        Self {
            config,
            section: section.into(),
            path: None,
            message: None,
            empty_commits: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_empty_commits(mut self, empty_commits: bool) -> Self {
        self.empty_commits = empty_commits;
        self
    }

    pub fn section_update(&self) -> SectionUpdate<'_> {
        SectionUpdate {
            section: Some(&self.section),
            path: self.path.as_deref(),
            message: self.message.as_deref(),
            empty_commits: self.empty_commits,
        }
    }
}

/// Per-call options of a section update on an existing `ReadmeBox`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionUpdate<'a> {
    /// Falls back to the configured section when `None`.
    pub section: Option<&'a str>,
    pub path: Option<&'a str>,
    pub message: Option<&'a str>,
    pub empty_commits: bool,
}

impl<'a> SectionUpdate<'a> {
    pub fn new(section: &'a str) -> Self {
        Self {
            section: Some(section),
            ..Self::default()
        }
    }
}

/// Arguments for [`ReadmeBox::update_readme`].
#[derive(Debug, Clone, Copy)]
pub struct ReadmeUpdate<'a> {
    pub path: Option<&'a str>,
    pub content: &'a str,
    pub sha: &'a str,
    pub message: Option<&'a str>,
}

/// ReadmeBox fetches a README, rewrites one section and commits the result
/// only when something changed.
pub struct ReadmeBox {
    config: ReadmeBoxConfig,
    client: Arc<dyn RepositoryClient>,
}

impl ReadmeBox {
    pub fn new(config: ReadmeBoxConfig) -> Result<Self> {
        let client = RepositoryFactory::create_github(&config)?;
        Ok(Self { config, client })
    }

    pub fn with_client(config: ReadmeBoxConfig, client: Arc<dyn RepositoryClient>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ReadmeBoxConfig {
        &self.config
    }

    /// One-shot update without keeping a `ReadmeBox` around.
    ///
    /// Returns `Ok(None)` when the README already contains `new_content` and
    /// `empty_commits` is not set; nothing is written in that case.
    pub fn update_section(
        new_content: &str,
        request: &UpdateRequest,
    ) -> Result<Option<CommitResult>> {
        let readme_box = Self::new(request.config.clone())?;
        readme_box.update_section_with(new_content, &request.section_update())
    }

    pub fn update_section_with(
        &self,
        new_content: &str,
        update: &SectionUpdate<'_>,
    ) -> Result<Option<CommitResult>> {
        let section = self.section(update.section)?;
        let document = self.get_readme(update.path)?;

        let updated = self.replace_section(ReplaceSection {
            old_contents: &document.content,
            new_contents: new_content,
            section,
        })?;

        if updated == document.content {
            if !update.empty_commits {
                info!(
                    section,
                    path = %document.path,
                    "section unchanged, skipping commit"
                );
                return Ok(None);
            }
            debug!(section, "section unchanged, committing anyway");
        }

        let result = self.update_readme(ReadmeUpdate {
            path: Some(update.path.unwrap_or(&document.path)),
            content: &updated,
            sha: &document.sha,
            message: update.message,
        })?;

        info!(
            section,
            commit = %result.commit.sha,
            "section committed"
        );
        Ok(Some(result))
    }

    /// The section a call operates on: `explicit` when given, otherwise the
    /// one from the config.
    pub fn section<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .or(self.config.section.as_deref())
            .filter(|section| !section.trim().is_empty())
            .ok_or_else(|| {
                ReadmeBoxError::Config(
                    "no section named and none configured (set `section` in the config)"
                        .to_string(),
                )
            })
    }

    /// Fetch `path`, or the repository README when no path is given.
    pub fn get_readme(&self, path: Option<&str>) -> Result<Document> {
        let branch = &self.config.branch;
        let file = match path {
            Some(path) => self.client.fetch_file(path, branch)?,
            None => self.client.fetch_readme(branch)?,
        };

        Ok(Document {
            path: file.path,
            sha: file.sha,
            branch: branch.clone(),
            content: file.content,
        })
    }

    /// Commit `content` verbatim. Always writes.
    pub fn update_readme(&self, update: ReadmeUpdate<'_>) -> Result<CommitResult> {
        let path = update.path.unwrap_or(DEFAULT_README_PATH);
        let request = PutFile {
            content: update.content,
            sha: Some(update.sha),
            message: update.message.unwrap_or(DEFAULT_COMMIT_MESSAGE),
            branch: &self.config.branch,
        };

        Ok(self.client.put_file(path, &request)?)
    }

    pub fn get_section(&self, name: &str, document: &str) -> Option<String> {
        SectionEditor::get_section(name, document)
    }

    pub fn replace_section(&self, args: ReplaceSection<'_>) -> Result<String> {
        SectionEditor::replace_section(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::repository::{CommitInfo, RemoteFile, RemoteResult};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use indoc::indoc;
    use mockito::{Matcher, Mock, Server};
    use serde_json::json;
    use std::sync::Mutex;

    const README: &str = indoc! {"
        # readme-box

        <!--START_SECTION:example-->
        Old stuff...
        <!--END_SECTION:example-->
    "};

    const OWNER: &str = "andatoshiki";
    const REPO: &str = "readme-box";

    fn config_for(server: &Server) -> ReadmeBoxConfig {
        ReadmeBoxConfig::new(OWNER, REPO, "123abc")
            .with_branch("master")
            .with_section("example")
            .with_api_url(server.url())
    }

    fn request_for(server: &Server) -> UpdateRequest {
        UpdateRequest::new(config_for(server), "example")
    }

    fn mock_get_readme(server: &mut Server) -> Mock {
        server
            .mock("GET", "/repos/andatoshiki/readme-box/readme")
            .match_query(Matcher::UrlEncoded("ref".into(), "master".into()))
            .with_status(200)
            .with_body(
                json!({
                    "path": "README.md",
                    "sha": "readme-sha",
                    "content": STANDARD.encode(README),
                    "encoding": "base64"
                })
                .to_string(),
            )
            .create()
    }

    fn mock_put(server: &mut Server, path: &str, body: serde_json::Value) -> Mock {
        server
            .mock("PUT", format!("/repos/andatoshiki/readme-box/contents/{path}").as_str())
            .match_body(Matcher::PartialJson(body))
            .with_status(200)
            .with_body(
                json!({
                    "content": { "path": path, "sha": "new-sha" },
                    "commit": { "sha": "commit-sha", "message": "Update README" }
                })
                .to_string(),
            )
    }

    #[test]
    fn update_section_commits_replaced_section() {
        let mut server = Server::new();
        let get = mock_get_readme(&mut server);
        let put = mock_put(
            &mut server,
            "README.md",
            json!({
                "content": STANDARD.encode(README.replace("Old stuff...", "New content!")),
                "sha": "readme-sha",
                "branch": "master",
                "message": DEFAULT_COMMIT_MESSAGE
            }),
        )
        .expect(1)
        .create();

        let result = ReadmeBox::update_section("New content!", &request_for(&server)).unwrap();

        assert_eq!(result.unwrap().commit.sha, "commit-sha");
        get.assert();
        put.assert();
    }

    #[test]
    fn update_section_uses_custom_message() {
        let mut server = Server::new();
        let _get = mock_get_readme(&mut server);
        let put = mock_put(
            &mut server,
            "README.md",
            json!({ "message": "Custom commit message!" }),
        )
        .expect(1)
        .create();

        let request = request_for(&server).with_message("Custom commit message!");
        ReadmeBox::update_section("New content!", &request).unwrap();

        put.assert();
    }

    #[test]
    fn update_section_skips_commit_without_changes() {
        let mut server = Server::new();
        let get = mock_get_readme(&mut server);
        let put = mock_put(&mut server, "README.md", json!({})).expect(0).create();

        let result = ReadmeBox::update_section("Old stuff...", &request_for(&server)).unwrap();

        assert!(result.is_none());
        get.assert();
        put.assert();
    }

    #[test]
    fn update_section_commits_unchanged_content_with_empty_commits() {
        let mut server = Server::new();
        let _get = mock_get_readme(&mut server);
        let put = mock_put(
            &mut server,
            "README.md",
            json!({ "content": STANDARD.encode(README) }),
        )
        .expect(1)
        .create();

        let request = request_for(&server).with_empty_commits(true);
        let result = ReadmeBox::update_section("Old stuff...", &request).unwrap();

        assert!(result.is_some());
        put.assert();
    }

    #[test]
    fn update_section_honours_path_override() {
        let mut server = Server::new();
        let get = server
            .mock("GET", "/repos/andatoshiki/readme-box/contents/readme.markdown")
            .match_query(Matcher::UrlEncoded("ref".into(), "master".into()))
            .with_status(200)
            .with_body(
                json!({
                    "path": "readme.markdown",
                    "sha": "md-sha",
                    "content": STANDARD.encode(README)
                })
                .to_string(),
            )
            .expect(1)
            .create();
        let put = mock_put(&mut server, "readme.markdown", json!({ "sha": "md-sha" }))
            .expect(1)
            .create();

        let request = request_for(&server).with_path("readme.markdown");
        ReadmeBox::update_section("New content!", &request).unwrap();

        get.assert();
        put.assert();
    }

    #[test]
    fn missing_section_aborts_before_writing() {
        let mut server = Server::new();
        let _get = mock_get_readme(&mut server);
        let put = mock_put(&mut server, "README.md", json!({})).expect(0).create();

        let request = UpdateRequest::new(config_for(&server), "nope");
        let err = ReadmeBox::update_section("New content!", &request).unwrap_err();

        assert!(err.is_section_not_found());
        assert_eq!(
            err.to_string(),
            "Contents do not contain start/end comments for section \"nope\""
        );
        put.assert();
    }

    #[test]
    fn remote_failures_pass_through() {
        let mut server = Server::new();
        let _get = server
            .mock("GET", "/repos/andatoshiki/readme-box/readme")
            .match_query(Matcher::Any)
            .with_status(404)
            .create();

        let err = ReadmeBox::update_section("x", &request_for(&server)).unwrap_err();
        assert!(matches!(
            err,
            ReadmeBoxError::Remote(RemoteError::NotFound { .. })
        ));
        assert!(!err.is_section_not_found());
    }

    #[test]
    fn update_readme_writes_verbatim() {
        let mut server = Server::new();
        let put = mock_put(
            &mut server,
            "README.md",
            json!({ "content": STANDARD.encode("yep"), "sha": "123abc" }),
        )
        .expect(1)
        .create();

        let readme_box = ReadmeBox::new(config_for(&server)).unwrap();
        readme_box
            .update_readme(ReadmeUpdate {
                path: None,
                content: "yep",
                sha: "123abc",
                message: None,
            })
            .unwrap();

        put.assert();
    }

    #[test]
    fn update_readme_uses_provided_path() {
        let mut server = Server::new();
        let put = mock_put(&mut server, "readme.markdown", json!({}))
            .expect(1)
            .create();

        let readme_box = ReadmeBox::new(config_for(&server)).unwrap();
        readme_box
            .update_readme(ReadmeUpdate {
                path: Some("readme.markdown"),
                content: "yep",
                sha: "123abc",
                message: None,
            })
            .unwrap();

        put.assert();
    }

    /// In-memory remote that records every write.
    struct FakeRepository {
        file: RemoteFile,
        writes: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeRepository {
        fn seeded(content: &str) -> Arc<Self> {
            Arc::new(Self {
                file: RemoteFile {
                    path: DEFAULT_README_PATH.to_string(),
                    sha: "seed".to_string(),
                    content: content.to_string(),
                },
                writes: Mutex::new(Vec::new()),
            })
        }

        fn writes(&self) -> Vec<(String, String, String)> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl RepositoryClient for FakeRepository {
        fn fetch_readme(&self, _reference: &str) -> RemoteResult<RemoteFile> {
            Ok(self.file.clone())
        }

        fn fetch_file(&self, path: &str, reference: &str) -> RemoteResult<RemoteFile> {
            if path == self.file.path {
                Ok(self.file.clone())
            } else {
                Err(RemoteError::NotFound {
                    path: path.to_string(),
                    reference: reference.to_string(),
                })
            }
        }

        fn put_file(&self, path: &str, request: &PutFile<'_>) -> RemoteResult<CommitResult> {
            self.writes.lock().unwrap().push((
                path.to_string(),
                request.content.to_string(),
                request.message.to_string(),
            ));
            Ok(CommitResult {
                content: None,
                commit: CommitInfo {
                    sha: "fake".to_string(),
                    message: Some(request.message.to_string()),
                    html_url: None,
                },
            })
        }
    }

    fn fake_box(repository: &Arc<FakeRepository>) -> ReadmeBox {
        let config = ReadmeBoxConfig::new(OWNER, REPO, "t");
        ReadmeBox::with_client(config, repository.clone())
    }

    #[test]
    fn repeated_updates_with_current_content_never_write() {
        let documents = [
            README,
            "<!--START_SECTION:s-->\nmulti\nline\n<!--END_SECTION:s-->",
            "prefix <!--START_SECTION:s-->\n\tx\n<!--END_SECTION:s--> suffix",
        ];

        for document in documents {
            let section = if document.contains("example") { "example" } else { "s" };
            let repository = FakeRepository::seeded(document);
            let readme_box = fake_box(&repository);
            let current = readme_box.get_section(section, document).unwrap();

            for _ in 0..2 {
                let result = readme_box
                    .update_section_with(&current, &SectionUpdate::new(section))
                    .unwrap();
                assert!(result.is_none());
            }
            assert!(repository.writes().is_empty());
        }
    }

    #[test]
    fn empty_commit_writes_unchanged_payload_once() {
        let repository = FakeRepository::seeded(README);
        let readme_box = fake_box(&repository);

        let update = SectionUpdate {
            empty_commits: true,
            message: Some("chore: refresh"),
            ..SectionUpdate::new("example")
        };
        let result = readme_box
            .update_section_with("Old stuff...", &update)
            .unwrap();

        assert!(result.is_some());
        assert_eq!(
            repository.writes(),
            vec![(
                DEFAULT_README_PATH.to_string(),
                README.to_string(),
                "chore: refresh".to_string()
            )]
        );
    }

    #[test]
    fn update_falls_back_to_configured_section() {
        let repository = FakeRepository::seeded(README);
        let config = ReadmeBoxConfig::new(OWNER, REPO, "t").with_section("example");
        let readme_box = ReadmeBox::with_client(config, repository.clone());

        let result = readme_box
            .update_section_with("New content!", &SectionUpdate::default())
            .unwrap();

        assert!(result.is_some());
        let writes = repository.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, README.replace("Old stuff...", "New content!"));
    }

    #[test]
    fn named_section_wins_over_configured() {
        let document = "<!--START_SECTION:s-->\nold\n<!--END_SECTION:s-->";
        let repository = FakeRepository::seeded(document);
        let config = ReadmeBoxConfig::new(OWNER, REPO, "t").with_section("example");
        let readme_box = ReadmeBox::with_client(config, repository.clone());

        readme_box
            .update_section_with("new", &SectionUpdate::new("s"))
            .unwrap();

        assert_eq!(
            repository.writes()[0].1,
            "<!--START_SECTION:s-->\nnew\n<!--END_SECTION:s-->"
        );
    }

    #[test]
    fn update_without_any_section_fails_before_fetching() {
        let repository = FakeRepository::seeded(README);
        let readme_box = fake_box(&repository);

        let err = readme_box
            .update_section_with("New content!", &SectionUpdate::default())
            .unwrap_err();

        assert!(matches!(err, ReadmeBoxError::Config(_)));
        assert!(repository.writes().is_empty());
        assert!(readme_box.section(Some(" ")).is_err());
    }

    #[test]
    fn get_readme_carries_branch() {
        let repository = FakeRepository::seeded(README);
        let readme_box = ReadmeBox::with_client(
            ReadmeBoxConfig::new(OWNER, REPO, "t").with_branch("docs"),
            repository,
        );

        let document = readme_box.get_readme(None).unwrap();
        assert_eq!(document.branch, "docs");
        assert_eq!(document.sha, "seed");
        assert_eq!(document.content, README);
    }
}
