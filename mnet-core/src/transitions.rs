//! Isolation-mode transition rules

use crate::error::ValidationError;
use crate::schema::IsolationMode;

/// Allowed target modes for each current mode
///
/// Locking a network to approved-only outbound is permanent: the control
/// plane refuses to loosen it again, and this table mirrors that refusal
/// client-side.
pub fn allowed_targets(from: IsolationMode) -> &'static [IsolationMode] {
    use crate::schema::IsolationMode::*;
    match from {
        Disabled => &[Disabled, AllowInternetOutbound, AllowOnlyApprovedOutbound],
        AllowInternetOutbound => &[Disabled, AllowInternetOutbound, AllowOnlyApprovedOutbound],
        AllowOnlyApprovedOutbound => &[AllowOnlyApprovedOutbound],
    }
}

/// Check a single isolation-mode transition against the table
pub fn check_transition(
    from: IsolationMode,
    to: IsolationMode,
) -> Result<(), ValidationError> {
    if allowed_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTransition { from, to })
    }
}
