//! Core library for workspace managed-network configuration
//!
//! Provides the desired-state configuration model for a workspace's managed
//! virtual network (isolation mode and outbound rules), validation and
//! transition rules, and loading of TOML configuration documents.

pub mod coverage;
pub mod error;
pub mod loader;
pub mod schema;
pub mod sweep;
pub mod transitions;
pub mod validator;

pub use coverage::{Coverage, DestinationMatcher};
pub use error::{ConfigError, Result, ValidationError};
pub use loader::ConfigLoader;
pub use schema::{
    ClientConfig, Config, IsolationMode, ManagedNetworkConfig, OutboundRule, RuleCategory,
    RuleKind, RuleStatus, WorkspaceConfig,
};
pub use sweep::SweepJob;
pub use transitions::{allowed_targets, check_transition};
pub use validator::ConfigValidator;
