use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "readme-box",
    about = "Readme Box - Update a marked section of a repository README through the GitHub API",
    version
)]
pub struct Cli {
    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY", global = true, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// GitHub token used for the API calls
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Branch to read from and commit to (defaults to config file, then "main")
    #[arg(short, long, global = true)]
    pub branch: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file (defaults to .readme-box.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace a section of the README and commit it if it changed
    Update {
        /// Section name (defaults to `section` from the config file)
        section: Option<String>,

        #[command(flatten)]
        content: ContentArgs,

        /// Commit message (defaults to "Update README")
        #[arg(short, long)]
        message: Option<String>,

        /// File to update instead of the repository README
        #[arg(long)]
        path: Option<String>,

        /// Commit even when the section already holds the content
        #[arg(long)]
        empty_commits: bool,
    },

    /// Print the current content of a section
    Get {
        /// Section name (defaults to `section` from the config file)
        section: Option<String>,

        /// File to read instead of the repository README
        #[arg(long)]
        path: Option<String>,
    },

    /// Commit a complete file as the new README
    Put {
        /// Local file holding the full new contents
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Blob sha of the version being replaced (fetched when omitted)
        #[arg(long)]
        sha: Option<String>,

        /// Remote path to write (defaults to README.md)
        #[arg(long)]
        path: Option<String>,

        /// Commit message (defaults to "Update README")
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Replace a section in a local file without touching the remote
    Replace {
        /// Section name (defaults to `section` from the config file)
        section: Option<String>,

        /// Local document to rewrite
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[command(flatten)]
        content: ContentArgs,

        /// Write the result back to the input file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
}

/// New section content; read from stdin when neither flag is given.
#[derive(Args, Debug, Clone, Default)]
pub struct ContentArgs {
    /// Section content as literal text
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read section content from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}
