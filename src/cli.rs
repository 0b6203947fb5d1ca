//! Minimal CLI parsing for scan overrides.

use std::env;
use std::path::PathBuf;

use crate::config::{Config, ConfigError, parse_page_size};

pub const USAGE: &str = "\
Usage: unlinked-assets [OPTIONS]

Options:
  --environment <ENV>     Environment to scan (default: CONTENTFUL_ENVIRONMENT or master)
  --locale <LOCALE>       Locale for titles and file fields (default: en-US)
  --page-size <N>         Assets per page, 1-1000 (default: 100)
  --output-dir <DIR>      Directory for the JSON report (default: .)
  --strict-pagination     Paginate until an empty page instead of stopping on a short page
  -h, --help              Print this help

Required environment: CONTENTFUL_SPACE_ID, CONTENTFUL_MANAGEMENT_TOKEN";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub environment: Option<String>,
    pub locale: Option<String>,
    pub page_size: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub strict_pagination: bool,
    pub show_help: bool,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            // Accept both `--flag value` and `--flag=value`
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = || inline.clone().or_else(|| args.next());

            match flag.as_str() {
                "--environment" => options.environment = value(),
                "--locale" => options.locale = value(),
                "--page-size" => options.page_size = value(),
                "--output-dir" => options.output_dir = value().map(PathBuf::from),
                "--strict-pagination" => options.strict_pagination = true,
                "-h" | "--help" => options.show_help = true,
                _ => tracing::warn!(argument = %arg, "Ignoring unknown argument"),
            }
        }
        options
    }

    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(environment) = &self.environment {
            config.environment_id = environment.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if let Some(raw) = &self.page_size {
            config.page_size = parse_page_size("--page-size", raw)?;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.strict_pagination {
            config.strict_pagination = true;
        }
        Ok(())
    }
}
