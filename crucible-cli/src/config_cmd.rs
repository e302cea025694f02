use crate::config::{mask, ConfigKey, CrucibleConfig, DEFAULT_API_URL};
use clap::Subcommand;
use color_eyre::eyre::{bail, Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;
use dialoguer::{Confirm, Input, Password};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Create the config file interactively
    Init,

    /// Show all settings and where they come from
    Show {
        /// Show the API key instead of masking it
        #[clap(long)]
        secrets: bool,
    },

    /// Print the value of a setting
    Get { key: ConfigKey },

    /// Change a setting in the config file. An empty value removes it.
    Set { key: ConfigKey, value: String },

    /// Print the location of the config file
    Path,
}

pub fn config_cmd(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show { secrets } => show(secrets),
        ConfigCommand::Get { key } => get(key),
        ConfigCommand::Set { key, value } => set(key, &value),
        ConfigCommand::Path => {
            println!("{}", CrucibleConfig::path()?);
            Ok(())
        }
    }
}

fn init() -> Result<()> {
    let path = CrucibleConfig::path()?;
    if path.is_file() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite it?", path))
            .default(false)
            .interact()?;
        if !overwrite {
            bail!("Config file was not changed.")
        }
    }
    let existing = CrucibleConfig::load()?;
    let api_key: String = Password::new()
        .with_prompt("Crucible API key")
        .interact()
        .wrap_err("Could not read API key")?;
    let api_url: String = Input::new()
        .with_prompt("Crucible API URL")
        .default(
            existing
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )
        .interact_text()?;
    let cache_dir: String = Input::new()
        .with_prompt("Cache directory (optional)")
        .allow_empty(true)
        .default(existing.cache_dir.clone().unwrap_or_default())
        .interact_text()?;
    let orcid_id: String = Input::new()
        .with_prompt("Your ORCID iD (optional)")
        .allow_empty(true)
        .default(existing.orcid_id.clone().unwrap_or_default())
        .interact_text()?;

    let mut config = existing;
    config.set(ConfigKey::ApiKey, api_key.trim())?;
    config.set(ConfigKey::ApiUrl, api_url.trim())?;
    config.set(ConfigKey::CacheDir, cache_dir.trim())?;
    config.set(ConfigKey::OrcidId, orcid_id.trim())?;
    config.save()?;
    eprintln!("Saved {}", path.green());
    Ok(())
}

fn show(secrets: bool) -> Result<()> {
    let file = CrucibleConfig::load()?;
    println!("{}", CrucibleConfig::path()?.dimmed());
    for key in ConfigKey::ALL {
        let (value, source) = if let Some(value) = env_value(key) {
            (Some(value), format!("from {}", key.env_var()))
        } else if let Some(value) = file.get(key) {
            (Some(value.to_string()), "from config file".to_string())
        } else if let Some(value) = file.get_or_default(key) {
            (Some(value.to_string()), "default".to_string())
        } else {
            (None, "not set".to_string())
        };
        let shown = match value {
            Some(v) if key.is_secret() && !secrets => mask(&v),
            Some(v) => v,
            None => String::new(),
        };
        println!("{:<20} {:<40} {}", key.name().bold(), shown, source.dimmed());
    }
    Ok(())
}

fn get(key: ConfigKey) -> Result<()> {
    let config = CrucibleConfig::load_with_env()?;
    match config.get_or_default(key) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => bail!("{} is not set", key.name()),
    }
}

fn set(key: ConfigKey, value: &str) -> Result<()> {
    let mut config = CrucibleConfig::load()?;
    config.set(key, value)?;
    config.save()?;
    if env_value(key).is_some() {
        eprintln!(
            "{}",
            format!(
                "warning: {} is set in the environment and takes precedence",
                key.env_var()
            )
            .yellow()
        );
    }
    Ok(())
}

fn env_value(key: ConfigKey) -> Option<String> {
    std::env::var(key.env_var()).ok().filter(|v| !v.is_empty())
}
