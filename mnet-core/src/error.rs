//! Error types for configuration handling

use crate::schema::IsolationMode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to load config from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Rule not found: {name}")]
    RuleNotFound { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duplicate outbound rule name: {name}")]
    DuplicateRuleName { name: String },

    #[error("Invalid isolation mode transition: {from} -> {to}")]
    InvalidTransition {
        from: IsolationMode,
        to: IsolationMode,
    },

    #[error("Rule {name}: {kind} rules are not supported under isolation mode {mode}")]
    UnsupportedRuleForMode {
        name: String,
        kind: &'static str,
        mode: IsolationMode,
    },

    #[error("Invalid rule name: {name:?}")]
    InvalidRuleName { name: String },

    #[error("Invalid workspace name: {name:?}")]
    InvalidWorkspaceName { name: String },

    #[error("Rule {name}: invalid destination pattern {destination:?}")]
    InvalidDestination { name: String, destination: String },

    #[error("Rule {name}: invalid port range {range:?}")]
    InvalidPortRange { name: String, range: String },

    #[error("Rule {name}: invalid protocol {protocol:?}")]
    InvalidProtocol { name: String, protocol: String },

    #[error("Rule {name}: invalid service resource id {id:?}")]
    InvalidResourceId { name: String, id: String },

    #[error("Rule {name}: missing subresource target")]
    MissingSubresourceTarget { name: String },

    #[error("Invalid isolation mode: {mode}")]
    InvalidMode { mode: String },
}
