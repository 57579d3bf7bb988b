//! Configuration schema types

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Complete desired-state document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub network: ManagedNetworkConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Workspace identity and placement
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_location() -> String {
    "eastus".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: default_location(),
            description: None,
        }
    }
}

/// Management API client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Environment variable holding the bearer token, if any
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_api_version() -> String {
    "2024-04-01".to_string()
}

fn default_token_env() -> String {
    "MNET_TOKEN".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            token_env: default_token_env(),
        }
    }
}

/// Outbound traffic policy for the managed network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationMode {
    /// No managed isolation; outbound traffic is not managed at all
    Disabled,
    /// Managed network with unrestricted outbound traffic
    AllowInternetOutbound,
    /// Managed network where only approved outbound destinations are reachable
    AllowOnlyApprovedOutbound,
}

impl Default for IsolationMode {
    fn default() -> Self {
        IsolationMode::Disabled
    }
}

impl IsolationMode {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "disabled" => Ok(IsolationMode::Disabled),
            "allow_internet_outbound" => Ok(IsolationMode::AllowInternetOutbound),
            "allow_only_approved_outbound" => Ok(IsolationMode::AllowOnlyApprovedOutbound),
            _ => Err(ValidationError::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IsolationMode::Disabled => write!(f, "disabled"),
            IsolationMode::AllowInternetOutbound => write!(f, "allow_internet_outbound"),
            IsolationMode::AllowOnlyApprovedOutbound => write!(f, "allow_only_approved_outbound"),
        }
    }
}

/// Rule lifecycle state, owned by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleStatus::Active => write!(f, "active"),
            RuleStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Rule origin, owned by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    UserDefined,
    Required,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCategory::UserDefined => write!(f, "user_defined"),
            RuleCategory::Required => write!(f, "required"),
        }
    }
}

/// Destination class of an outbound rule
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// Traffic to a named platform service tag
    ServiceTag {
        service_tag: String,
        protocol: String,
        port_ranges: String,
    },
    /// Traffic to a domain name, wildcards allowed
    Fqdn { destination: String },
    /// Private endpoint to a specific platform resource
    PrivateEndpoint {
        service_resource_id: String,
        subresource_target: String,
        #[serde(default)]
        spark_enabled: bool,
    },
}

impl RuleKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RuleKind::ServiceTag { .. } => "service_tag",
            RuleKind::Fqdn { .. } => "fqdn",
            RuleKind::PrivateEndpoint { .. } => "private_endpoint",
        }
    }
}

/// A declared outbound rule
///
/// `status` and `category` are assigned by the control plane once the rule
/// is materialized; they are `None` in a pending desired-state document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutboundRule {
    pub name: String,
    #[serde(flatten)]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RuleCategory>,
}

impl OutboundRule {
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            status: None,
            category: None,
        }
    }
}

/// Desired state of a workspace's managed network
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManagedNetworkConfig {
    #[serde(default)]
    pub isolation_mode: IsolationMode,
    #[serde(default)]
    pub outbound_rules: Vec<OutboundRule>,
}

impl ManagedNetworkConfig {
    /// Look up a declared rule by name
    pub fn rule(&self, name: &str) -> Option<&OutboundRule> {
        self.outbound_rules.iter().find(|r| r.name == name)
    }

    /// Add a rule to the desired state
    ///
    /// Rejects duplicate names and rule kinds the current isolation mode
    /// does not support.
    pub fn add_rule(&mut self, rule: OutboundRule) -> Result<(), ValidationError> {
        if self.rule(&rule.name).is_some() {
            return Err(ValidationError::DuplicateRuleName { name: rule.name });
        }
        crate::validator::ConfigValidator::check_rule_for_mode(&rule, self.isolation_mode)?;
        crate::validator::ConfigValidator::check_rule_shape(&rule)?;
        self.outbound_rules.push(rule);
        Ok(())
    }

    /// Change the isolation mode, enforcing the transition rules
    pub fn set_isolation_mode(&mut self, target: IsolationMode) -> Result<(), ValidationError> {
        crate::transitions::check_transition(self.isolation_mode, target)?;
        self.isolation_mode = target;
        Ok(())
    }
}
