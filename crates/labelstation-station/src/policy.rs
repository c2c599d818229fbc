//! Shared handle on the operator validation policy.

use labelstation_core::{PolicyField, ValidationPolicy};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Process-wide [`ValidationPolicy`] with a single-writer toggle.
///
/// Readers take a copy of the whole policy, so one issuance sees one
/// consistent policy even if an operator toggles mid-request. The toggle
/// applies from the next request on.
#[derive(Debug, Clone, Default)]
pub struct PolicyHandle {
    inner: Arc<RwLock<ValidationPolicy>>,
}

impl PolicyHandle {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(policy)),
        }
    }

    /// Copy of the policy as it is right now.
    pub fn current(&self) -> ValidationPolicy {
        *self.inner.read()
    }

    /// Flip `field` and return its new value.
    pub fn toggle(&self, field: PolicyField) -> bool {
        let mut policy = self.inner.write();
        *policy = policy.toggled(field);
        let value = policy.get(field);
        info!(field = %field, value, "Validation policy changed");
        value
    }

    /// Set `field` to `value`.
    pub fn set(&self, field: PolicyField, value: bool) {
        let mut policy = self.inner.write();
        *policy = policy.with(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_returns_new_value() {
        let handle = PolicyHandle::default();
        assert!(handle.current().device_validation_enabled);

        assert!(!handle.toggle(PolicyField::DeviceValidation));
        assert!(!handle.current().device_validation_enabled);
        assert!(handle.current().physical_print_enabled);

        assert!(handle.toggle(PolicyField::DeviceValidation));
    }

    #[test]
    fn test_clones_share_state() {
        let handle = PolicyHandle::default();
        let other = handle.clone();

        other.set(PolicyField::PhysicalPrint, false);
        assert!(!handle.current().physical_print_enabled);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let handle = PolicyHandle::default();
        let before = handle.current();
        handle.toggle(PolicyField::PhysicalPrint);

        assert!(before.physical_print_enabled);
        assert!(!handle.current().physical_print_enabled);
    }
}
