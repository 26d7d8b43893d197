//! `pulsar-site resolve` command implementation.

use std::path::PathBuf;

use clap::Args;
use pulsar_inject::Directive;
use pulsar_site_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Directive to resolve, with or without the `{@inject: }` wrapper
    /// (e.g. `javadoc:Reader:/client/Reader.html` or `endpoint|GET|/admin/v2/clusters`).
    directive: String,

    /// Print the link as JSON instead of markdown.
    #[arg(long)]
    json: bool,

    /// Public site URL (overrides config).
    #[arg(long, env = "PULSAR_SITE_URL")]
    site_url: Option<String>,

    /// Path to configuration file (default: auto-discover pulsar-site.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ResolveArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            site_url: self.site_url.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let directive = parse_directive(&self.directive).ok_or_else(|| {
            CliError::Validation(format!(
                "not an inject directive: {:?}",
                self.directive
            ))
        })?;
        let link = directive.resolve(&config.links_resolved);

        if self.json {
            output.result(&serde_json::to_string_pretty(&link)?);
        } else {
            output.result(&link.to_markdown());
        }
        Ok(())
    }
}

/// Accept a full directive or just its body.
fn parse_directive(input: &str) -> Option<Directive<'_>> {
    Directive::parse(input).or_else(|| Directive::parse_body(input.trim()))
}
