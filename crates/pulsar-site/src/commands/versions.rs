//! `pulsar-site versions` command implementation.

use std::path::PathBuf;

use clap::Args;
use pulsar_site_config::{Config, DocsVersions, VersionEntry};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the versions command.
#[derive(Args)]
pub(crate) struct VersionsArgs {
    /// Print the version map as JSON.
    #[arg(long)]
    json: bool,

    /// Path to configuration file (default: auto-discover pulsar-site.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// JSON shape of the versions listing.
#[derive(Serialize)]
struct VersionsReport<'a> {
    versions: Vec<VersionEntry>,
    build: &'a [String],
}

impl VersionsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let versions = DocsVersions::load(&config.docs_resolved)?;

        if self.json {
            let report = VersionsReport {
                versions: versions.entries(),
                build: versions.build_versions(),
            };
            output.result(&serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        output.highlight("Versions");
        for entry in versions.entries() {
            let marker = if versions.is_built(&entry.key) { "*" } else { " " };
            output.result(&format!(
                "{marker} {:<16} {:<16} /docs/{}",
                entry.key, entry.label, entry.path
            ));
        }
        output.info("(* = included in build)");
        Ok(())
    }
}
