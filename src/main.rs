//! Unlinked assets CLI
//!
//! Reads configuration from the environment (and `.env`), scans the
//! configured space and writes `unlinked-assets-<timestamp>.json`.

use std::process::ExitCode;

use chrono::Utc;

use unlinked_assets::cli::{CliOptions, USAGE};
use unlinked_assets::config::Config;
use unlinked_assets::services::{ConsoleReporter, ContentfulClient, LogFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let options = CliOptions::from_args();
    if options.show_help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let config = Config::from_env().and_then(|mut config| {
        options.apply(&mut config)?;
        Ok(config)
    });

    let mut console = ConsoleReporter::stdout();
    let status =
        unlinked_assets::execute(config, ContentfulClient::new, &mut console, Utc::now()).await;
    ExitCode::from(status.exit_code())
}
