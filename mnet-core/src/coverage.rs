//! Local coverage preview over declared outbound rules
//!
//! Answers "would this destination be reachable under the declared desired
//! state?" without contacting the management API. This inspects pending
//! declared rules only; live rule status is owned by the control plane.

use crate::schema::{IsolationMode, ManagedNetworkConfig, RuleKind};
use wildmatch::WildMatch;

/// Outcome of a coverage preview for a single destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    /// Outbound traffic is unrestricted at the mode level
    ModeAllows,
    /// Outbound traffic is disabled at the mode level
    ModeBlocks,
    /// A declared FQDN rule covers the destination; carries the rule name
    Rule(String),
    /// Nothing in the declared desired state covers the destination
    NotCovered,
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coverage::ModeAllows => write!(f, "allowed (isolation mode permits all outbound)"),
            Coverage::ModeBlocks => write!(f, "blocked (outbound traffic disabled)"),
            Coverage::Rule(name) => write!(f, "covered by rule {}", name),
            Coverage::NotCovered => write!(f, "not covered by any declared rule"),
        }
    }
}

/// Matcher over the FQDN rules of a desired state
///
/// Service-tag and private-endpoint reachability cannot be determined
/// locally (the tag-to-range expansion lives in the control plane), so
/// only FQDN rules participate.
#[derive(Debug, Clone)]
pub struct DestinationMatcher {
    mode: IsolationMode,
    patterns: Vec<(String, WildMatch)>,
}

impl DestinationMatcher {
    pub fn from_config(network: &ManagedNetworkConfig) -> Self {
        let patterns = network
            .outbound_rules
            .iter()
            .filter_map(|rule| match &rule.kind {
                RuleKind::Fqdn { destination } => {
                    Some((rule.name.clone(), WildMatch::new(destination)))
                }
                _ => None,
            })
            .collect();

        Self {
            mode: network.isolation_mode,
            patterns,
        }
    }

    /// Preview coverage for a destination FQDN
    pub fn coverage(&self, destination: &str) -> Coverage {
        match self.mode {
            IsolationMode::AllowInternetOutbound => Coverage::ModeAllows,
            IsolationMode::Disabled => Coverage::ModeBlocks,
            IsolationMode::AllowOnlyApprovedOutbound => self
                .patterns
                .iter()
                .find(|(_, pattern)| pattern.matches(destination))
                .map(|(name, _)| Coverage::Rule(name.clone()))
                .unwrap_or(Coverage::NotCovered),
        }
    }
}
