//! Client facade for the workspace management API
//!
//! Serializes desired-state configuration into management API requests and
//! maps responses back into local result types. Each operation is a single
//! awaited request-response exchange; the remote control plane owns all
//! provisioning state and rule lifecycle.

pub mod api;
pub mod client;
pub mod error;
pub mod transport;

pub use api::{
    JobResource, ManagedNetworkResource, OutboundRuleResource, WorkspaceResource,
};
pub use client::WorkspaceClient;
pub use error::{ClientError, Result};
pub use transport::{ApiResponse, HttpTransport, Transport};
