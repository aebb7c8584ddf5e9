use crate::config::ReadmeBoxConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::repository::RepositoryClient;
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub fn create_github(config: &ReadmeBoxConfig) -> Result<Arc<dyn RepositoryClient>> {
        let client = GitHubClient::new(config)?;
        Ok(Arc::new(client))
    }
}
