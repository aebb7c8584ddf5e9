mod cli;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use readme_box::ReadmeBoxConfig;
use readme_box::config::{self, ConfigOverrides, FileConfig};
use std::process;
use tracing_subscriber::EnvFilter;
use workflow::UpdateOptions;

fn main() {
    let cli = Cli::parse();

    // --verbose enables debug logs for this crate, otherwise RUST_LOG or warn
    let filter = if cli.verbose {
        EnvFilter::new("readme_box=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = FileConfig::discover(cli.config.as_deref())?;
    // replace runs without a token, so it reads the section from the file directly
    let replace_section = file_config.as_ref().and_then(|f| f.section.clone());
    let overrides = ConfigOverrides {
        repo: cli.repo,
        token: cli.token,
        branch: cli.branch,
        api_url: cli.api_url,
    };
    let load = move || -> anyhow::Result<ReadmeBoxConfig> {
        Ok(config::resolve(&overrides, file_config)?)
    };

    match cli.command {
        Commands::Update {
            section,
            content,
            message,
            path,
            empty_commits,
        } => {
            let config = load()?;
            let content = workflow::read_content(content)?;
            workflow::execute_update(
                config,
                UpdateOptions {
                    section,
                    content,
                    path,
                    message,
                    empty_commits,
                },
                cli.verbose,
            )
        }
        Commands::Get { section, path } => {
            workflow::execute_get(load()?, section.as_deref(), path.as_deref(), cli.verbose)
        }
        Commands::Put {
            file,
            sha,
            path,
            message,
        } => workflow::execute_put(load()?, &file, sha, path, message, cli.verbose),
        Commands::Replace {
            section,
            input,
            content,
            in_place,
        } => {
            let section = workflow::resolve_section(section, replace_section.as_deref())?;
            let content = workflow::read_content(content)?;
            workflow::execute_replace(&section, &input, &content, in_place)
        }
    }
}
