//! Desired-state validation

use crate::error::ValidationError;
use crate::schema::{IsolationMode, ManagedNetworkConfig, OutboundRule, RuleKind};
use std::collections::HashSet;

type Result<T> = std::result::Result<T, ValidationError>;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a managed-network desired state
    ///
    /// Pure pre-flight check; the control plane re-validates on submission.
    pub fn validate(network: &ManagedNetworkConfig) -> Result<()> {
        Self::check_rule_names(network)?;
        Self::check_rule_modes(network)?;
        Self::check_rule_shapes(network)?;
        Ok(())
    }

    /// Validate an isolation-mode update against the current mode
    pub fn validate_update(current: IsolationMode, target: IsolationMode) -> Result<()> {
        crate::transitions::check_transition(current, target)
    }

    /// Check rule names are well-formed and unique
    fn check_rule_names(network: &ManagedNetworkConfig) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &network.outbound_rules {
            if rule.name.is_empty()
                || rule.name.chars().any(|c| c.is_whitespace() || c.is_control())
            {
                return Err(ValidationError::InvalidRuleName {
                    name: rule.name.clone(),
                });
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(ValidationError::DuplicateRuleName {
                    name: rule.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check every rule kind is supported under the declared isolation mode
    fn check_rule_modes(network: &ManagedNetworkConfig) -> Result<()> {
        for rule in &network.outbound_rules {
            Self::check_rule_for_mode(rule, network.isolation_mode)?;
        }
        Ok(())
    }

    /// Service-tag and FQDN rules only take effect under approved-only
    /// outbound; private endpoints are accepted under every mode.
    pub fn check_rule_for_mode(rule: &OutboundRule, mode: IsolationMode) -> Result<()> {
        match rule.kind {
            RuleKind::PrivateEndpoint { .. } => Ok(()),
            RuleKind::ServiceTag { .. } | RuleKind::Fqdn { .. } => {
                if mode == IsolationMode::AllowOnlyApprovedOutbound {
                    Ok(())
                } else {
                    Err(ValidationError::UnsupportedRuleForMode {
                        name: rule.name.clone(),
                        kind: rule.kind.kind_name(),
                        mode,
                    })
                }
            }
        }
    }

    fn check_rule_shapes(network: &ManagedNetworkConfig) -> Result<()> {
        for rule in &network.outbound_rules {
            Self::check_rule_shape(rule)?;
        }
        Ok(())
    }

    /// Check the destination fields of a single rule
    pub fn check_rule_shape(rule: &OutboundRule) -> Result<()> {
        match &rule.kind {
            RuleKind::ServiceTag {
                protocol,
                port_ranges,
                ..
            } => {
                Self::check_protocol(&rule.name, protocol)?;
                Self::check_port_ranges(&rule.name, port_ranges)?;
            }
            RuleKind::Fqdn { destination } => {
                Self::check_destination(&rule.name, destination)?;
            }
            RuleKind::PrivateEndpoint {
                service_resource_id,
                subresource_target,
                ..
            } => {
                if !service_resource_id.starts_with("/subscriptions/") {
                    return Err(ValidationError::InvalidResourceId {
                        name: rule.name.clone(),
                        id: service_resource_id.clone(),
                    });
                }
                if subresource_target.is_empty() {
                    return Err(ValidationError::MissingSubresourceTarget {
                        name: rule.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_protocol(name: &str, protocol: &str) -> Result<()> {
        let known = ["TCP", "UDP", "ICMP", "*"];
        if known.iter().any(|p| protocol.eq_ignore_ascii_case(p)) {
            Ok(())
        } else {
            Err(ValidationError::InvalidProtocol {
                name: name.to_string(),
                protocol: protocol.to_string(),
            })
        }
    }

    /// Port ranges are a comma-separated list of ports or lo-hi spans,
    /// e.g. "443" or "80,8080" or "1024-65535"
    fn check_port_ranges(name: &str, ranges: &str) -> Result<()> {
        let invalid = || ValidationError::InvalidPortRange {
            name: name.to_string(),
            range: ranges.to_string(),
        };

        if ranges.trim() == "*" {
            return Ok(());
        }

        for part in ranges.split(',') {
            let part = part.trim();
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo = parse_port(lo).ok_or_else(invalid)?;
                    let hi = parse_port(hi).ok_or_else(invalid)?;
                    if lo > hi {
                        return Err(invalid());
                    }
                }
                None => {
                    parse_port(part).ok_or_else(invalid)?;
                }
            }
        }
        Ok(())
    }

    /// No double wildcards or control characters in FQDN patterns
    fn check_destination(name: &str, destination: &str) -> Result<()> {
        if destination.is_empty()
            || destination.contains("**")
            || destination.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ValidationError::InvalidDestination {
                name: name.to_string(),
                destination: destination.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_port(s: &str) -> Option<u16> {
    s.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OutboundRule;

    fn service_tag_rule(name: &str) -> OutboundRule {
        OutboundRule::new(
            name,
            RuleKind::ServiceTag {
                service_tag: "AzureCloud".to_string(),
                protocol: "TCP".to_string(),
                port_ranges: "80,8080".to_string(),
            },
        )
    }

    fn fqdn_rule(name: &str, destination: &str) -> OutboundRule {
        OutboundRule::new(
            name,
            RuleKind::Fqdn {
                destination: destination.to_string(),
            },
        )
    }

    fn private_endpoint_rule(name: &str) -> OutboundRule {
        OutboundRule::new(
            name,
            RuleKind::PrivateEndpoint {
                service_resource_id: "/subscriptions/0000/resourceGroups/rg/providers/Storage/accounts/sa"
                    .to_string(),
                subresource_target: "blob".to_string(),
                spark_enabled: false,
            },
        )
    }

    #[test]
    fn test_duplicate_rule_name_rejected() {
        let network = ManagedNetworkConfig {
            isolation_mode: IsolationMode::AllowOnlyApprovedOutbound,
            outbound_rules: vec![service_tag_rule("r1"), fqdn_rule("r1", "*.pypi.org")],
        };

        let err = ConfigValidator::validate(&network).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DuplicateRuleName { ref name } if name == "r1"
        ));
    }

    #[test]
    fn test_service_tag_rejected_outside_approved_mode() {
        for mode in [IsolationMode::Disabled, IsolationMode::AllowInternetOutbound] {
            let network = ManagedNetworkConfig {
                isolation_mode: mode,
                outbound_rules: vec![service_tag_rule("tag")],
            };
            let err = ConfigValidator::validate(&network).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::UnsupportedRuleForMode { kind: "service_tag", .. }
            ));
        }
    }

    #[test]
    fn test_fqdn_rejected_under_internet_outbound() {
        let network = ManagedNetworkConfig {
            isolation_mode: IsolationMode::AllowInternetOutbound,
            outbound_rules: vec![fqdn_rule("pypi", "*.pypi.org")],
        };
        assert!(ConfigValidator::validate(&network).is_err());
    }

    #[test]
    fn test_private_endpoint_accepted_under_every_mode() {
        for mode in [
            IsolationMode::Disabled,
            IsolationMode::AllowInternetOutbound,
            IsolationMode::AllowOnlyApprovedOutbound,
        ] {
            let network = ManagedNetworkConfig {
                isolation_mode: mode,
                outbound_rules: vec![private_endpoint_rule("pe")],
            };
            assert!(ConfigValidator::validate(&network).is_ok());
        }
    }

    #[test]
    fn test_update_from_approved_rejected() {
        assert!(ConfigValidator::validate_update(
            IsolationMode::AllowInternetOutbound,
            IsolationMode::AllowOnlyApprovedOutbound,
        )
        .is_ok());

        let err = ConfigValidator::validate_update(
            IsolationMode::AllowOnlyApprovedOutbound,
            IsolationMode::AllowInternetOutbound,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTransition { .. }));
    }

    #[test]
    fn test_port_ranges() {
        let ok = ["443", "80,8080", "1024-65535", "80, 443", "*"];
        for ranges in ok {
            let mut rule = service_tag_rule("r");
            if let RuleKind::ServiceTag { port_ranges, .. } = &mut rule.kind {
                *port_ranges = ranges.to_string();
            }
            assert!(ConfigValidator::check_rule_shape(&rule).is_ok(), "{ranges}");
        }

        let bad = ["", "0", "70000", "8080-80", "80,", "http"];
        for ranges in bad {
            let mut rule = service_tag_rule("r");
            if let RuleKind::ServiceTag { port_ranges, .. } = &mut rule.kind {
                *port_ranges = ranges.to_string();
            }
            assert!(ConfigValidator::check_rule_shape(&rule).is_err(), "{ranges}");
        }
    }

    #[test]
    fn test_invalid_patterns() {
        let rule = fqdn_rule("bad", "**.example.com");
        assert!(ConfigValidator::check_rule_shape(&rule).is_err());

        let rule = fqdn_rule("bad", "two words.com");
        assert!(ConfigValidator::check_rule_shape(&rule).is_err());
    }

    #[test]
    fn test_invalid_resource_id() {
        let mut rule = private_endpoint_rule("pe");
        if let RuleKind::PrivateEndpoint {
            service_resource_id,
            ..
        } = &mut rule.kind
        {
            *service_resource_id = "storage-account".to_string();
        }
        assert!(matches!(
            ConfigValidator::check_rule_shape(&rule).unwrap_err(),
            ValidationError::InvalidResourceId { .. }
        ));
    }

    #[test]
    fn test_invalid_rule_name() {
        let network = ManagedNetworkConfig {
            isolation_mode: IsolationMode::AllowOnlyApprovedOutbound,
            outbound_rules: vec![fqdn_rule("bad name", "*.example.com")],
        };
        assert!(matches!(
            ConfigValidator::validate(&network).unwrap_err(),
            ValidationError::InvalidRuleName { .. }
        ));
    }
}
