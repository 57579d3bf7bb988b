//! Workspace management client facade

use crate::api::{
    ApiErrorBody, CreateWorkspaceBody, JobResource, ManagedNetworkResource, OutboundRuleBody,
    OutboundRuleResource, ProvisionBody, RuleListResource, UpdateNetworkBody, WorkspaceResource,
};
use crate::error::{ClientError, Result};
use crate::transport::{ApiResponse, HttpTransport, Transport};
use hyper::Method;
use mnet_core::schema::{
    ClientConfig, IsolationMode, ManagedNetworkConfig, OutboundRule, WorkspaceConfig,
};
use mnet_core::validator::ConfigValidator;
use mnet_core::{SweepJob, ValidationError};
use serde::de::DeserializeOwned;
use tracing::info;

/// Client facade over the workspace management API
///
/// Translates desired-state configuration into management API calls. Every
/// operation is one awaited request-response exchange; Active/Inactive rule
/// transitions and provisioning all happen remotely.
pub struct WorkspaceClient<T: Transport> {
    transport: T,
    api_version: String,
}

impl WorkspaceClient<HttpTransport> {
    /// Create an HTTP client from a client configuration section
    ///
    /// The bearer token is read from the configured environment variable if
    /// it is set.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env).ok();
        let transport = HttpTransport::new(&config.endpoint, token)?;
        Ok(Self::new(transport, config.api_version.clone()))
    }
}

impl<T: Transport> WorkspaceClient<T> {
    pub fn new(transport: T, api_version: String) -> Self {
        Self {
            transport,
            api_version,
        }
    }

    /// Create a workspace together with its managed-network desired state
    pub async fn create_workspace(
        &self,
        workspace: &WorkspaceConfig,
        network: &ManagedNetworkConfig,
    ) -> Result<WorkspaceResource> {
        check_workspace_name(&workspace.name)?;
        ConfigValidator::validate(network)?;

        let body = serde_json::to_value(CreateWorkspaceBody::new(workspace, network))?;
        let response = self
            .transport
            .execute(Method::PUT, &self.path(&workspace.name, ""), Some(body))
            .await?;
        let resource: WorkspaceResource = decode(response)?;
        info!(
            "workspace {} created in {} ({})",
            resource.name, resource.location, resource.provisioning_state
        );
        Ok(resource)
    }

    /// Fetch a workspace as the management API sees it
    pub async fn get_workspace(&self, name: &str) -> Result<WorkspaceResource> {
        check_workspace_name(name)?;
        let response = self
            .transport
            .execute(Method::GET, &self.path(name, ""), None)
            .await?;
        decode(response)
    }

    /// Update the isolation mode of a workspace's managed network
    ///
    /// Pre-flight: the transition is checked against the mode the control
    /// plane currently reports, mirroring the remote one-way invariant.
    pub async fn update_isolation_mode(
        &self,
        workspace: &WorkspaceResource,
        target: IsolationMode,
    ) -> Result<WorkspaceResource> {
        ConfigValidator::validate_update(workspace.isolation_mode(), target)?;

        let body = serde_json::to_value(UpdateNetworkBody {
            isolation_mode: target,
        })?;
        let response = self
            .transport
            .execute(
                Method::PATCH,
                &self.path(&workspace.name, "/managed-network"),
                Some(body),
            )
            .await?;
        decode(response)
    }

    /// Add a single outbound rule to a workspace
    ///
    /// Pre-flight: rejects a name the workspace already carries, a rule
    /// kind the current isolation mode does not support, and malformed
    /// destination fields.
    pub async fn add_outbound_rule(
        &self,
        workspace: &WorkspaceResource,
        rule: &OutboundRule,
    ) -> Result<OutboundRuleResource> {
        if let Some(network) = &workspace.managed_network {
            if network.outbound_rules.iter().any(|r| r.name == rule.name) {
                return Err(ValidationError::DuplicateRuleName {
                    name: rule.name.clone(),
                }
                .into());
            }
        }
        ConfigValidator::check_rule_for_mode(rule, workspace.isolation_mode())?;
        ConfigValidator::check_rule_shape(rule)?;

        let body = serde_json::to_value(OutboundRuleBody::from(rule))?;
        let path = self.path(
            &workspace.name,
            &format!("/outbound-rules/{}", rule.name),
        );
        let response = self.transport.execute(Method::PUT, &path, Some(body)).await?;
        decode(response)
    }

    /// List the outbound rules materialized by the control plane
    pub async fn list_outbound_rules(
        &self,
        workspace_name: &str,
    ) -> Result<Vec<OutboundRuleResource>> {
        check_workspace_name(workspace_name)?;
        let response = self
            .transport
            .execute(
                Method::GET,
                &self.path(workspace_name, "/outbound-rules"),
                None,
            )
            .await?;
        let list: RuleListResource = decode(response)?;
        Ok(list.value)
    }

    /// Ask the control plane to provision the managed network
    ///
    /// Returns the network resource as reported after the provisioning
    /// request is accepted; its status is remote-owned.
    pub async fn provision_network(
        &self,
        workspace_name: &str,
        include_spark: bool,
    ) -> Result<ManagedNetworkResource> {
        check_workspace_name(workspace_name)?;
        let body = serde_json::to_value(ProvisionBody { include_spark })?;
        let response = self
            .transport
            .execute(
                Method::POST,
                &self.path(workspace_name, "/managed-network/provision"),
                Some(body),
            )
            .await?;
        decode(response)
    }

    /// Delete a workspace
    pub async fn delete_workspace(&self, name: &str) -> Result<()> {
        check_workspace_name(name)?;
        let response = self
            .transport
            .execute(Method::DELETE, &self.path(name, ""), None)
            .await?;
        if response.is_success() {
            info!("workspace {} deleted", name);
            Ok(())
        } else {
            Err(api_error(response))
        }
    }

    /// Submit a sweep-job document verbatim to the job scheduler
    pub async fn submit_sweep_job(
        &self,
        workspace_name: &str,
        job: &SweepJob,
    ) -> Result<JobResource> {
        check_workspace_name(workspace_name)?;
        let body = serde_json::to_value(job)?;
        let response = self
            .transport
            .execute(Method::POST, &self.path(workspace_name, "/jobs"), Some(body))
            .await?;
        decode(response)
    }

    fn path(&self, workspace_name: &str, suffix: &str) -> String {
        format!(
            "/workspaces/{}{}?api-version={}",
            workspace_name, suffix, self.api_version
        )
    }
}

fn check_workspace_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(ValidationError::InvalidWorkspaceName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

fn decode<R: DeserializeOwned>(response: ApiResponse) -> Result<R> {
    if response.is_success() {
        Ok(serde_json::from_value(response.body)?)
    } else {
        Err(api_error(response))
    }
}

/// Map a failed exchange into an API error, relaying the remote code and
/// message unmodified
fn api_error(response: ApiResponse) -> ClientError {
    match serde_json::from_value::<ApiErrorBody>(response.body.clone()) {
        Ok(body) => ClientError::Api {
            status: response.status,
            code: body.code,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status: response.status,
            code: "unknown".to_string(),
            message: response.body.to_string(),
        },
    }
}
