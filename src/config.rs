// Configuration module: the dotfile read at startup and written by the
// interactive `configure` wizard. The client only ever sees the three
// values as opaque strings, so the file format is free to change.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The three values the tool needs: the bearer access token, the SONG
/// server base URL and the study everything is scoped under.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub access_token: String,
    pub song_url: String,
    pub study: String,
}

impl Config {
    /// Location of the config file: `~/.song/config.json`.
    pub fn path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".song").join("config.json")
    }

    /// Load the config written by a previous `configure` run.
    pub fn load() -> Result<Config> {
        let path = Self::path();
        let data = fs::read_to_string(&path).with_context(|| {
            format!(
                "No configuration found at {}; run `song configure` first",
                path.display()
            )
        })?;
        serde_json::from_str(&data).context("Configuration file is not valid JSON")
    }

    /// Write the config, creating `~/.song` if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Interactive setup: prompts for the three values and persists them.
/// An existing config file is only replaced after confirmation.
pub fn configure() -> Result<()> {
    let path = Config::path();
    if path.exists() {
        println!("Existing configuration found at {}.", path.display());
        let overwrite = Confirm::new()
            .with_prompt("Overwrite it?")
            .default(false)
            .interact()?;
        if !overwrite {
            return Ok(());
        }
    } else {
        println!("No existing configuration file, creating a new config.");
    }

    let access_token: String = Input::new().with_prompt("Access token").interact_text()?;
    let song_url: String = Input::new()
        .with_prompt("URL of SONG server")
        .interact_text()?;
    let study: String = Input::new().with_prompt("Study ID").interact_text()?;

    let config = Config {
        access_token,
        song_url,
        study,
    };
    config.save()?;
    println!("Configuration written to {}.", path.display());
    Ok(())
}
