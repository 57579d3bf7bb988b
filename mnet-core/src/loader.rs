//! Configuration file loading and merging

use crate::error::{ConfigError, Result};
use crate::schema::Config;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        // Priority order:
        // 1. $MNET_CONFIG
        // 2. $XDG_CONFIG_HOME/mnet/config.toml
        // 3. ~/.config/mnet/config.toml

        if let Ok(path) = env::var("MNET_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mnet/config.toml");
        }

        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home).join(".config/mnet/config.toml");
        }

        PathBuf::from("config.toml")
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load built-in defaults embedded in the binary
    pub fn load_builtin() -> Result<Config> {
        const BUILTIN_TOML: &str = include_str!("../builtin-defaults.toml");
        let config: Config = toml::from_str(BUILTIN_TOML)?;
        Ok(config)
    }

    /// Merge user config on top of built-in defaults
    ///
    /// User outbound rules override built-in rules of the same name and
    /// extend them otherwise; workspace and client sections override
    /// wholesale.
    pub fn merge_configs(builtin: Config, user: Config) -> Config {
        let mut merged = builtin;

        merged.network.isolation_mode = user.network.isolation_mode;
        for rule in user.network.outbound_rules {
            match merged
                .network
                .outbound_rules
                .iter_mut()
                .find(|r| r.name == rule.name)
            {
                Some(existing) => *existing = rule,
                None => merged.network.outbound_rules.push(rule),
            }
        }

        merged.workspace = user.workspace;
        merged.client = user.client;

        merged
    }

    /// Load config with built-in defaults as lowest-priority fallback
    pub fn load_with_builtins() -> Result<Config> {
        let builtin = Self::load_builtin()?;
        let path = Self::default_config_path();

        if path.exists() {
            let user = Self::load_from_file(&path)?;
            Ok(Self::merge_configs(builtin, user))
        } else {
            tracing::debug!("User config not found at {:?}, using built-in defaults", path);
            Ok(builtin)
        }
    }

    /// Load config from optional path or default with built-in merge
    /// Priority: Explicit path > User config > Built-in defaults
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
        if let Some(p) = path {
            let user = Self::load_from_file(&p)?;
            let builtin = Self::load_builtin()?;
            Ok(Self::merge_configs(builtin, user))
        } else {
            Self::load_with_builtins()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IsolationMode, OutboundRule, RuleKind};
    use std::io::Write;

    #[test]
    fn test_builtin_defaults_parse() {
        let config = ConfigLoader::load_builtin().unwrap();
        assert_eq!(config.client.api_version, "2024-04-01");
        assert_eq!(config.network.isolation_mode, IsolationMode::Disabled);
        assert!(config.network.outbound_rules.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[workspace]
name = "ws-dev"
location = "westus2"

[network]
isolation_mode = "allow_internet_outbound"
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.workspace.name, "ws-dev");
        assert_eq!(
            config.network.isolation_mode,
            IsolationMode::AllowInternetOutbound
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigLoader::load_from_file("/nonexistent/mnet.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigLoad { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[workspace]
name = "ws"
colour = "blue"
"#
        )
        .unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParse(_)));
    }

    #[test]
    fn test_merge_rules_by_name() {
        let mut builtin = Config::default();
        builtin.network.outbound_rules.push(OutboundRule::new(
            "pypi",
            RuleKind::Fqdn {
                destination: "pypi.org".to_string(),
            },
        ));

        let mut user = Config::default();
        user.network.outbound_rules.push(OutboundRule::new(
            "pypi",
            RuleKind::Fqdn {
                destination: "*.pypi.org".to_string(),
            },
        ));
        user.network.outbound_rules.push(OutboundRule::new(
            "crates",
            RuleKind::Fqdn {
                destination: "*.crates.io".to_string(),
            },
        ));

        let merged = ConfigLoader::merge_configs(builtin, user);
        assert_eq!(merged.network.outbound_rules.len(), 2);
        assert_eq!(
            merged.network.rule("pypi").unwrap().kind,
            RuleKind::Fqdn {
                destination: "*.pypi.org".to_string()
            }
        );
        assert!(merged.network.rule("crates").is_some());
    }
}
