use camino::Utf8PathBuf;
use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use crucible::types::ApiUrl;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "crucible";
const CONFIG_NAME: &str = "config";

pub const DEFAULT_API_URL: &str = "https://crucible.lbl.gov/testapi";
pub const DEFAULT_GRAPH_EXPLORER_URL: &str =
    "https://crucible-graph-explorer-776258882599.us-central1.run.app";

/// Settings file contents. Every setting is optional in the file;
/// environment variables take precedence over it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct CrucibleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_project: Option<String>,
}

/// Names of the settings.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum ConfigKey {
    ApiKey,
    ApiUrl,
    CacheDir,
    OrcidId,
    GraphExplorerUrl,
    CurrentProject,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ApiKey,
        ConfigKey::ApiUrl,
        ConfigKey::CacheDir,
        ConfigKey::OrcidId,
        ConfigKey::GraphExplorerUrl,
        ConfigKey::CurrentProject,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api_key",
            ConfigKey::ApiUrl => "api_url",
            ConfigKey::CacheDir => "cache_dir",
            ConfigKey::OrcidId => "orcid_id",
            ConfigKey::GraphExplorerUrl => "graph_explorer_url",
            ConfigKey::CurrentProject => "current_project",
        }
    }

    /// Environment variable which overrides this setting.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "CRUCIBLE_API_KEY",
            ConfigKey::ApiUrl => "CRUCIBLE_API_URL",
            ConfigKey::CacheDir => "CRUCIBLE_CACHE_DIR",
            ConfigKey::OrcidId => "ORCID_ID",
            ConfigKey::GraphExplorerUrl => "CRUCIBLE_GRAPH_EXPLORER_URL",
            ConfigKey::CurrentProject => "CRUCIBLE_CURRENT_PROJECT",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, ConfigKey::ApiKey)
    }
}

impl CrucibleConfig {
    /// Load config from file.
    pub fn load() -> Result<Self> {
        confy::load(APP_NAME, CONFIG_NAME).wrap_err("Couldn't load config file")
    }

    /// Write config to file.
    pub fn save(&self) -> Result<()> {
        confy::store(APP_NAME, CONFIG_NAME, self).wrap_err("Couldn't write config file")
    }

    pub fn path() -> Result<Utf8PathBuf> {
        let path = confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
            .wrap_err("Couldn't determine config file location")?;
        Utf8PathBuf::from_path_buf(path)
            .map_err(|p| color_eyre::eyre::eyre!("Config path is not UTF-8: {:?}", p))
    }

    /// Load config from file, then apply environment variables over it.
    pub fn load_with_env() -> Result<Self> {
        Ok(Self::load()?.overlay(|name| std::env::var(name).ok()))
    }

    /// Replace settings with the values `env` gives for their environment variables.
    pub fn overlay(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        for key in ConfigKey::ALL {
            if let Some(value) = env(key.env_var()).filter(|v| !v.is_empty()) {
                *self.field_mut(key) = Some(value);
            }
        }
        self
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ApiKey => self.api_key.as_deref(),
            ConfigKey::ApiUrl => self.api_url.as_deref(),
            ConfigKey::CacheDir => self.cache_dir.as_deref(),
            ConfigKey::OrcidId => self.orcid_id.as_deref(),
            ConfigKey::GraphExplorerUrl => self.graph_explorer_url.as_deref(),
            ConfigKey::CurrentProject => self.current_project.as_deref(),
        }
    }

    /// Like [CrucibleConfig::get], falling back to the built-in default.
    pub fn get_or_default(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).or(match key {
            ConfigKey::ApiUrl => Some(DEFAULT_API_URL),
            ConfigKey::GraphExplorerUrl => Some(DEFAULT_GRAPH_EXPLORER_URL),
            _ => None,
        })
    }

    /// Set a setting. An empty value removes it.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        if key == ConfigKey::ApiUrl && !value.is_empty() {
            ApiUrl::new(value.to_string())?;
        }
        *self.field_mut(key) = Some(value.to_string()).filter(|v| !v.is_empty());
        Ok(())
    }

    pub fn api_url(&self) -> Result<ApiUrl> {
        let url = self.get_or_default(ConfigKey::ApiUrl).unwrap_or(DEFAULT_API_URL);
        ApiUrl::new(url.to_string()).wrap_err_with(|| format!("Invalid API URL: {url}"))
    }

    pub fn graph_explorer_url(&self) -> &str {
        self.get_or_default(ConfigKey::GraphExplorerUrl)
            .unwrap_or(DEFAULT_GRAPH_EXPLORER_URL)
    }

    fn field_mut(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ApiKey => &mut self.api_key,
            ConfigKey::ApiUrl => &mut self.api_url,
            ConfigKey::CacheDir => &mut self.cache_dir,
            ConfigKey::OrcidId => &mut self.orcid_id,
            ConfigKey::GraphExplorerUrl => &mut self.graph_explorer_url,
            ConfigKey::CurrentProject => &mut self.current_project,
        }
    }
}

/// Hide all but the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let shown: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), shown)
}
