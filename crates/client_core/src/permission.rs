use shared::{domain::PermissionLevel, protocol::DispatcherPermission};
use tracing::{debug, warn};

use crate::error::SessionError;

pub fn is_revoked(update: &DispatcherPermission) -> bool {
    update.permission == PermissionLevel::Rescinded
}

/// Turns a rescinded permission into the session-ending error.
pub fn check(update: &DispatcherPermission) -> Result<(), SessionError> {
    if is_revoked(update) {
        warn!("dispatcher permission rescinded by the simulator");
        return Err(SessionError::PermissionDenied);
    }
    debug!(permission = %update.permission, ai_permission = update.ai_permission, "dispatcher permission");
    Ok(())
}

#[cfg(test)]
#[path = "tests/permission_tests.rs"]
mod tests;
