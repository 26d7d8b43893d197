//! `pulsar-site rewrite` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use pulsar_inject::{InjectProcessor, InjectStats, LinkBases};
use pulsar_site_config::{CliSettings, Config};
use rayon::prelude::*;

use crate::error::CliError;
use crate::output::Output;

/// Markdown extensions picked up below the source directory.
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Arguments for the rewrite command.
#[derive(Args)]
pub(crate) struct RewriteArgs {
    /// Directory receiving the rewritten files (same relative layout).
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Public site URL (overrides config).
    #[arg(long, env = "PULSAR_SITE_URL")]
    site_url: Option<String>,

    /// Path to configuration file (default: auto-discover pulsar-site.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RewriteArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            site_url: self.site_url.clone(),
            source_dir: self.source_dir.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let source_dir = &config.docs_resolved.source_dir;

        output.info(&format!("Source: {}", source_dir.display()));
        output.info(&format!("Output: {}", self.output_dir.display()));

        let summary = rewrite_tree(source_dir, &self.output_dir, &config.links_resolved)?;

        if summary.stats.literal_fallbacks > 0 {
            output.warning(&format!(
                "{} directive(s) used an unknown prefix and link to their literal path",
                summary.stats.literal_fallbacks
            ));
        }
        output.success(&format!(
            "Rewrote {} directive(s) ({} general, {} endpoint) in {} file(s)",
            summary.stats.total(),
            summary.stats.general,
            summary.stats.endpoint,
            summary.files
        ));
        Ok(())
    }
}

/// Outcome of rewriting a source tree.
#[derive(Debug, Default, PartialEq, Eq)]
struct RewriteSummary {
    files: usize,
    stats: InjectStats,
}

/// Rewrite every markdown file below `source_dir` into `output_dir`.
fn rewrite_tree(
    source_dir: &Path,
    output_dir: &Path,
    bases: &LinkBases,
) -> Result<RewriteSummary, CliError> {
    if !source_dir.is_dir() {
        return Err(CliError::Validation(format!(
            "source directory not found: {}",
            source_dir.display()
        )));
    }

    let files = find_markdown_files(source_dir)?;
    tracing::info!(count = files.len(), "Rewriting markdown files");

    let stats = files
        .par_iter()
        .map(|path| rewrite_file(path, source_dir, output_dir, bases))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RewriteSummary {
        files: files.len(),
        stats: stats.into_iter().sum(),
    })
}

fn find_markdown_files(source_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let root = glob::Pattern::escape(&source_dir.to_string_lossy());
    let mut files = Vec::new();

    for ext in MARKDOWN_EXTENSIONS {
        for entry in glob::glob(&format!("{root}/**/*.{ext}"))? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn rewrite_file(
    path: &Path,
    source_dir: &Path,
    output_dir: &Path,
    bases: &LinkBases,
) -> Result<InjectStats, CliError> {
    let relative = path.strip_prefix(source_dir).map_err(|_| {
        CliError::Validation(format!(
            "{} is outside {}",
            path.display(),
            source_dir.display()
        ))
    })?;

    let input = fs::read_to_string(path).map_err(CliError::file(path))?;
    let mut processor = InjectProcessor::new(bases);
    let rewritten = processor.process(&input);

    let target = output_dir.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(CliError::file(parent))?;
    }
    fs::write(&target, rewritten).map_err(CliError::file(&target))?;

    let stats = processor.stats();
    tracing::debug!(
        path = %relative.display(),
        directives = stats.total(),
        "Rewrote file"
    );
    Ok(stats)
}
