use crate::rules::{Rule, RuleStore};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = ".typochk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Load the bundled dictionary below every other rule source.
    pub use_default_rules: bool,
    /// User dictionary file, highest rule precedence.
    pub custom_dictionary: Option<PathBuf>,
    /// Extensions picked up when walking directories.
    pub supported_file_types: Vec<String>,
    /// Rules from config files, layered above the defaults.
    pub custom_rules: Vec<Rule>,
}

/// One config file as written on disk. Absent keys leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_default_rules: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dictionary: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_file_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_rules: Vec<Rule>,
}

fn default_supported_file_types() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string(), "txt".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_default_rules: true,
            custom_dictionary: None,
            supported_file_types: default_supported_file_types(),
            custom_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(custom_dictionary: Option<PathBuf>, no_default_rules: bool) -> Result<Self> {
        let global = Self::global_config_path();
        let mut config = Self::load_layers(global.as_deref(), Path::new(LOCAL_CONFIG_FILE))?;

        // Apply CLI overrides
        if let Some(dict) = custom_dictionary {
            config.custom_dictionary = Some(dict);
        }
        if no_default_rules {
            config.use_default_rules = false;
        }

        // Set default custom dictionary if not specified, and make sure it exists
        if config.custom_dictionary.is_none() {
            if let Some(path) = Self::default_custom_dict_path() {
                ensure_file(&path)?;
                config.custom_dictionary = Some(path);
            }
        }

        Ok(config)
    }

    pub fn load_layers(global: Option<&Path>, local: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                config = config.merge(ConfigLayer::from_file(global_path)?);
            }
        }

        // Local config overrides global
        if local.exists() {
            config = config.merge(ConfigLayer::from_file(local)?);
        }

        Ok(config)
    }

    fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(use_default_rules) = layer.use_default_rules {
            self.use_default_rules = use_default_rules;
        }
        if layer.custom_dictionary.is_some() {
            self.custom_dictionary = layer.custom_dictionary;
        }
        if let Some(types) = layer.supported_file_types {
            self.supported_file_types = types;
        }
        if !layer.custom_rules.is_empty() {
            let mut rules: RuleStore = self.custom_rules.into_iter().collect();
            rules.merge(layer.custom_rules);
            self.custom_rules = rules.into_rules();
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typochk").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_custom_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typochk")
            .map(|dirs| dirs.config_dir().join("custom_dict.txt"))
    }
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Read one config file, change it and write it back. Only this layer is
    /// touched; merged values from other layers are never persisted.
    pub fn update_file<F>(path: &Path, change: F) -> Result<Self>
    where
        F: FnOnce(&mut ConfigLayer),
    {
        let mut layer = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        change(&mut layer);
        layer.write_to(path)?;
        Ok(layer)
    }

    /// Upsert rules into this layer's `custom_rules`.
    pub fn merge_rules(&mut self, incoming: Vec<Rule>) {
        let mut rules: RuleStore = std::mem::take(&mut self.custom_rules).into_iter().collect();
        rules.merge(incoming);
        self.custom_rules = rules.into_rules();
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create custom dictionary directory")?;
    }
    if !path.exists() {
        fs::write(path, "").context("Failed to create custom dictionary file")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.use_default_rules);
        assert!(config.custom_rules.is_empty());
        assert!(config.supported_file_types.contains(&"md".to_string()));
    }

    #[test]
    fn test_local_overrides_global() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");

        fs::write(
            &global,
            r#"
use_default_rules = false
supported_file_types = ["txt"]

[[custom_rules]]
original = "按装"
suggestion = "安装"

[[custom_rules]]
original = "帐号"
suggestion = "账号"
"#,
        )
        .unwrap();
        fs::write(
            &local,
            r#"
[[custom_rules]]
original = "帐号"
suggestion = "账户"
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load_layers(Some(&global), &local).unwrap();

        // absent key in local keeps global value
        assert!(!config.use_default_rules);
        assert_eq!(config.supported_file_types, vec!["txt".to_string()]);
        assert_eq!(
            config.custom_rules,
            vec![Rule::new("按装", "安装"), Rule::disabled("帐号", "账户")]
        );
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempdir().unwrap();
        let config =
            Config::load_layers(Some(&dir.path().join("nope.toml")), &dir.path().join("no.toml"))
                .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local.toml");
        fs::write(&local, "use_default_rules = [").unwrap();
        assert!(Config::load_layers(None, &local).is_err());
    }

    #[test]
    fn test_update_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        ConfigLayer::update_file(&path, |layer| {
            layer.merge_rules(vec![Rule::new("按装", "安装")]);
        })
        .unwrap();
        let layer = ConfigLayer::update_file(&path, |layer| {
            layer.use_default_rules = Some(false);
            layer.merge_rules(vec![Rule::disabled("按装", "安装")]);
        })
        .unwrap();

        assert_eq!(ConfigLayer::from_file(&path).unwrap(), layer);
        assert_eq!(layer.custom_rules, vec![Rule::disabled("按装", "安装")]);
        assert_eq!(layer.custom_dictionary, None);
    }
}
