//! Wire types for the management API

use chrono::{DateTime, Utc};
use mnet_core::schema::{
    IsolationMode, ManagedNetworkConfig, OutboundRule, RuleCategory, RuleKind, RuleStatus,
    WorkspaceConfig,
};
use serde::{Deserialize, Serialize};

/// Workspace resource returned by the management API
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceResource {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Remote-owned lifecycle state, e.g. "Succeeded" or "Provisioning"
    pub provisioning_state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub managed_network: Option<ManagedNetworkResource>,
}

impl WorkspaceResource {
    /// Isolation mode as the control plane currently reports it
    pub fn isolation_mode(&self) -> IsolationMode {
        self.managed_network
            .as_ref()
            .map(|n| n.isolation_mode)
            .unwrap_or_default()
    }
}

/// Managed network as materialized by the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct ManagedNetworkResource {
    pub isolation_mode: IsolationMode,
    /// Network state as reported by the control plane, e.g. "Active"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub outbound_rules: Vec<OutboundRuleResource>,
}

/// A materialized outbound rule
///
/// Unlike a declared [`OutboundRule`], status and category are always
/// present here: the control plane assigns them on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct OutboundRuleResource {
    pub name: String,
    #[serde(flatten)]
    pub kind: RuleKind,
    pub status: RuleStatus,
    pub category: RuleCategory,
}

/// Rule collection response
#[derive(Debug, Clone, Deserialize)]
pub struct RuleListResource {
    pub value: Vec<OutboundRuleResource>,
}

/// Job resource returned by the scheduler after submission
#[derive(Debug, Clone, Deserialize)]
pub struct JobResource {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Error body returned by the management API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Body of a workspace creation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateWorkspaceBody<'a> {
    pub name: &'a str,
    pub location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub managed_network: ManagedNetworkBody<'a>,
}

impl<'a> CreateWorkspaceBody<'a> {
    pub fn new(workspace: &'a WorkspaceConfig, network: &'a ManagedNetworkConfig) -> Self {
        Self {
            name: &workspace.name,
            location: &workspace.location,
            description: workspace.description.as_deref(),
            managed_network: ManagedNetworkBody::new(network),
        }
    }
}

/// Desired managed-network state in request form
#[derive(Debug, Clone, Serialize)]
pub struct ManagedNetworkBody<'a> {
    pub isolation_mode: IsolationMode,
    pub outbound_rules: Vec<OutboundRuleBody<'a>>,
}

impl<'a> ManagedNetworkBody<'a> {
    pub fn new(network: &'a ManagedNetworkConfig) -> Self {
        Self {
            isolation_mode: network.isolation_mode,
            outbound_rules: network.outbound_rules.iter().map(Into::into).collect(),
        }
    }
}

/// Desired-state rule body
///
/// Carries no status or category fields at all: those are assigned by the
/// control plane and a client request cannot express them.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundRuleBody<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub kind: &'a RuleKind,
}

impl<'a> From<&'a OutboundRule> for OutboundRuleBody<'a> {
    fn from(rule: &'a OutboundRule) -> Self {
        Self {
            name: &rule.name,
            kind: &rule.kind,
        }
    }
}

/// Body of an isolation-mode update request
#[derive(Debug, Clone, Serialize)]
pub struct UpdateNetworkBody {
    pub isolation_mode: IsolationMode,
}

/// Body of a network provisioning request
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionBody {
    pub include_spark: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_body_omits_status_and_category() {
        let rule = OutboundRule {
            name: "r1".to_string(),
            kind: RuleKind::Fqdn {
                destination: "*.pypi.org".to_string(),
            },
            status: Some(RuleStatus::Active),
            category: Some(RuleCategory::UserDefined),
        };

        let body = serde_json::to_value(OutboundRuleBody::from(&rule)).unwrap();
        assert_eq!(
            body,
            json!({"name": "r1", "type": "fqdn", "destination": "*.pypi.org"})
        );
    }

    #[test]
    fn test_workspace_resource_decodes() {
        let value = json!({
            "id": "/subscriptions/0000/workspaces/ws-dev",
            "name": "ws-dev",
            "location": "eastus",
            "provisioning_state": "Succeeded",
            "created_at": "2026-08-01T10:30:00Z",
            "managed_network": {
                "isolation_mode": "allow_only_approved_outbound",
                "status": "Active",
                "outbound_rules": [
                    {
                        "name": "pypi",
                        "type": "fqdn",
                        "destination": "*.pypi.org",
                        "status": "active",
                        "category": "user_defined"
                    },
                    {
                        "name": "storage",
                        "type": "service_tag",
                        "service_tag": "Storage",
                        "protocol": "TCP",
                        "port_ranges": "443",
                        "status": "inactive",
                        "category": "required"
                    }
                ]
            }
        });

        let resource: WorkspaceResource = serde_json::from_value(value).unwrap();
        assert_eq!(
            resource.isolation_mode(),
            IsolationMode::AllowOnlyApprovedOutbound
        );
        let network = resource.managed_network.unwrap();
        assert_eq!(network.outbound_rules.len(), 2);
        assert_eq!(network.outbound_rules[0].status, RuleStatus::Active);
        assert_eq!(network.outbound_rules[1].category, RuleCategory::Required);
    }
}
