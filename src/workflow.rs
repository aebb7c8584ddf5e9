use anyhow::{Context, Result, bail};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use readme_box::{
    ReadmeBox, ReadmeBoxConfig, ReadmeUpdate, ReplaceSection, SectionEditor, SectionUpdate,
};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use crate::cli::ContentArgs;

/// Options of the `update` command.
pub struct UpdateOptions {
    /// Falls back to the configured section when `None`.
    pub section: Option<String>,
    pub content: String,
    pub path: Option<String>,
    pub message: Option<String>,
    pub empty_commits: bool,
}

/// Execute the update workflow
pub fn execute_update(
    config: ReadmeBoxConfig,
    options: UpdateOptions,
    verbose: bool,
) -> Result<()> {
    let readme_box = ReadmeBox::new(config)?;
    let section = readme_box.section(options.section.as_deref())?;
    let config = readme_box.config();
    println!(
        "{}",
        format!(
            "Updating section '{}' in {}@{}...",
            section,
            config.slug(),
            config.branch
        )
        .cyan()
        .bold()
    );

    let update = SectionUpdate {
        section: Some(section),
        path: options.path.as_deref(),
        message: options.message.as_deref(),
        empty_commits: options.empty_commits,
    };

    let pb = spinner("Fetching README and computing changes", verbose);
    let result = readme_box.update_section_with(&options.content, &update);
    pb.finish_and_clear();

    match result? {
        Some(commit) => {
            println!(
                "{}",
                format!("✓ Committed {}", short_sha(&commit.commit.sha)).green()
            );
            if let Some(url) = commit.commit.html_url.as_deref() {
                println!("   {}", url.dimmed());
            }
        }
        None => {
            println!("{}", "No changes to section, nothing committed".yellow());
        }
    }

    Ok(())
}

/// Print the current content of a section to stdout
pub fn execute_get(
    config: ReadmeBoxConfig,
    section: Option<&str>,
    path: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let readme_box = ReadmeBox::new(config)?;
    let section = readme_box.section(section)?;

    let pb = spinner("Fetching README", verbose);
    let document = readme_box.get_readme(path);
    pb.finish_and_clear();
    let document = document?;

    match readme_box.get_section(section, &document.content) {
        Some(content) => println!("{content}"),
        None => eprintln!(
            "{}",
            format!(
                "Section '{}' is empty or missing in {}",
                section, document.path
            )
            .yellow()
        ),
    }

    Ok(())
}

/// Commit a complete local file as the new README
pub fn execute_put(
    config: ReadmeBoxConfig,
    file: &Path,
    sha: Option<String>,
    path: Option<String>,
    message: Option<String>,
    verbose: bool,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    let readme_box = ReadmeBox::new(config)?;

    let (sha, path) = match sha {
        Some(sha) => (sha, path),
        None => {
            println!("{}", "1. Fetching current sha...".yellow());
            let pb = spinner("Fetching README", verbose);
            let document = readme_box.get_readme(path.as_deref());
            pb.finish_and_clear();
            let document = document?;
            println!(
                "   {} {}",
                document.path.bright_cyan(),
                short_sha(&document.sha).dimmed()
            );
            (document.sha, path.or(Some(document.path)))
        }
    };

    println!("{}", "2. Committing file...".yellow());
    let pb = spinner("Committing", verbose);
    let result = readme_box.update_readme(ReadmeUpdate {
        path: path.as_deref(),
        content: &content,
        sha: &sha,
        message: message.as_deref(),
    });
    pb.finish_and_clear();
    let commit = result?;

    println!(
        "{}",
        format!("✓ Committed {}", short_sha(&commit.commit.sha)).green()
    );
    Ok(())
}

/// Replace a section in a local file
pub fn execute_replace(section: &str, input: &Path, content: &str, in_place: bool) -> Result<()> {
    let old_contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    let updated = SectionEditor::replace_section(ReplaceSection {
        old_contents: &old_contents,
        new_contents: content,
        section,
    })?;

    if !in_place {
        print!("{updated}");
        return Ok(());
    }

    if updated == old_contents {
        eprintln!("{}", "No changes to section".yellow());
        return Ok(());
    }

    fs::write(input, &updated)
        .with_context(|| format!("Failed to write '{}'", input.display()))?;
    eprintln!(
        "{}",
        format!("✓ Section '{}' updated in {}", section, input.display()).green()
    );
    Ok(())
}

/// Pick the section named on the command line, falling back to the config file.
///
/// Only `replace` uses this; it never builds a `ReadmeBoxConfig`.
pub fn resolve_section(explicit: Option<String>, configured: Option<&str>) -> Result<String> {
    match explicit.or_else(|| configured.map(str::to_string)) {
        Some(section) if !section.trim().is_empty() => Ok(section),
        _ => bail!("Section is required (argument or `section` in config)"),
    }
}

/// Read new section content from `--content`, `--file` or stdin.
pub fn read_content(args: ContentArgs) -> Result<String> {
    if let Some(content) = args.content {
        return Ok(content);
    }

    let raw = match args.file {
        Some(path) => read_file(&path)?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read section content from stdin")?;
            buffer
        }
    };

    Ok(strip_trailing_newline(raw))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

/// Files and piped input end with a newline the section markers already provide.
fn strip_trailing_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    content
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn spinner(message: impl Into<Cow<'static, str>>, verbose: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if verbose {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
