// CLI layer: clap subcommands wired to the SONG client. Each network
// command loads the saved config, makes exactly one call and prints the
// response body verbatim, so the output can be piped straight into jq.

use crate::api::SongClient;
use crate::config::{self, Config};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Parser)]
#[command(name = "song", version, about = "Command-line client for a SONG metadata server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up the config file (access token, server URL, study ID)
    Configure,
    /// Upload a JSON payload file to the configured study
    Upload {
        /// Path to the JSON payload
        file: PathBuf,
    },
    /// Get the validation status of an upload
    Status { upload_id: String },
    /// Save a validated upload as an analysis
    Save { upload_id: String },
    /// Publish a saved analysis
    Publish { analysis_id: String },
}

/// Dispatch a parsed command line. Errors bubble up to `main`, which
/// prints them and exits non-zero.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Configure => config::configure(),
        Commands::Upload { file } => upload(&file),
        Commands::Status { upload_id } => {
            let (client, study) = client_from_config()?;
            let body = client.get_status(&study, &upload_id)?;
            println!("{}", body);
            Ok(())
        }
        Commands::Save { upload_id } => {
            let (client, study) = client_from_config()?;
            let body = client.save(&study, &upload_id)?;
            println!("{}", body);
            Ok(())
        }
        Commands::Publish { analysis_id } => {
            let (client, study) = client_from_config()?;
            let body = client.publish(&study, &analysis_id)?;
            println!("{}", body);
            Ok(())
        }
    }
}

/// Build a client from the saved config. The URL is parsed here so a
/// bad `song_url` in the dotfile fails with a clear message instead of
/// deep inside a request.
fn client_from_config() -> Result<(SongClient, String)> {
    let config = Config::load()?;
    let song_url = Url::parse(&config.song_url)
        .with_context(|| format!("Invalid SONG server URL in config: {}", config.song_url))?;
    let client = SongClient::create(&config.access_token, song_url)?;
    Ok((client, config.study))
}

fn upload(file: &Path) -> Result<()> {
    let (client, study) = client_from_config()?;
    let payload = fs::read(file)
        .with_context(|| format!("Failed to read payload file {}", file.display()))?;

    // A spinner while the request is in flight; uploads can take a
    // moment on large payloads.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Uploading...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.upload(&study, &payload);
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}
