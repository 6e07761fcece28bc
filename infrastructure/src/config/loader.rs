//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["helm.toml", ".helm.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `HELM_*` environment variables (`HELM_AGENT__MAX_ITERATIONS=3`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./helm.toml` or `./.helm.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/helm/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::project_config_path())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>, project: Option<PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("HELM_").split("__"))
    }

    /// Load only a single explicit file on top of the defaults.
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/helm/config.toml`, falling back to the platform
    /// config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("helm").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config sources in priority order, with whether each one exists.
    pub fn config_sources(config_path: Option<&PathBuf>) -> Vec<(&'static str, String, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = config_path {
            sources.push(("Explicit", path.display().to_string(), path.exists()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(("Project", path.display().to_string(), true)),
            None => sources.push(("Project", "./helm.toml or ./.helm.toml".to_string(), false)),
        }
        if let Some(path) = Self::global_config_path() {
            sources.push(("Global", path.display().to_string(), path.exists()));
        }
        sources
    }
}
