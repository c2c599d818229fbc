//! Operator validation policy.
//!
//! The policy is a small `Copy` value. Whoever owns the process-wide copy
//! hands out snapshots of it; a coordinator call takes one snapshot up front
//! and uses it for the whole issuance, so a toggle that lands mid-call only
//! affects the next request.

use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime switches an operator may flip at the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// When `false` only `tests_ok` is required for readiness (bench mode).
    pub device_validation_enabled: bool,

    /// When `false` labels are persisted but not sent to the printer.
    pub physical_print_enabled: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            device_validation_enabled: true,
            physical_print_enabled: true,
        }
    }
}

impl ValidationPolicy {
    /// Read a single switch.
    #[must_use]
    pub fn get(&self, field: PolicyField) -> bool {
        match field {
            PolicyField::DeviceValidation => self.device_validation_enabled,
            PolicyField::PhysicalPrint => self.physical_print_enabled,
        }
    }

    /// Return a copy with `field` set to `value`.
    #[must_use]
    pub fn with(mut self, field: PolicyField, value: bool) -> Self {
        match field {
            PolicyField::DeviceValidation => self.device_validation_enabled = value,
            PolicyField::PhysicalPrint => self.physical_print_enabled = value,
        }
        self
    }

    /// Return a copy with `field` inverted.
    #[must_use]
    pub fn toggled(self, field: PolicyField) -> Self {
        let current = self.get(field);
        self.with(field, !current)
    }
}

/// Names of the individual policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyField {
    DeviceValidation,
    PhysicalPrint,
}

impl PolicyField {
    pub const ALL: [PolicyField; 2] = [PolicyField::DeviceValidation, PolicyField::PhysicalPrint];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyField::DeviceValidation => "device_validation",
            PolicyField::PhysicalPrint => "physical_print",
        }
    }
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyField {
    type Err = Error;

    /// Accepts the canonical names plus the short operator aliases
    /// `validation` and `print`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "device_validation" | "validation" => Ok(PolicyField::DeviceValidation),
            "physical_print" | "print" => Ok(PolicyField::PhysicalPrint),
            _ => Err(Error::UnknownPolicyField(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_policy_is_strict() {
        let policy = ValidationPolicy::default();
        assert!(policy.device_validation_enabled);
        assert!(policy.physical_print_enabled);
    }

    #[rstest]
    #[case(PolicyField::DeviceValidation)]
    #[case(PolicyField::PhysicalPrint)]
    fn test_toggle_flips_only_one_field(#[case] field: PolicyField) {
        let before = ValidationPolicy::default();
        let after = before.toggled(field);

        assert_eq!(after.get(field), !before.get(field));
        for other in PolicyField::ALL.into_iter().filter(|f| *f != field) {
            assert_eq!(after.get(other), before.get(other));
        }
        assert_eq!(after.toggled(field), before);
    }

    #[rstest]
    #[case("device_validation", PolicyField::DeviceValidation)]
    #[case("validation", PolicyField::DeviceValidation)]
    #[case("device-validation", PolicyField::DeviceValidation)]
    #[case("PRINT", PolicyField::PhysicalPrint)]
    #[case("physical_print", PolicyField::PhysicalPrint)]
    fn test_policy_field_from_str(#[case] raw: &str, #[case] expected: PolicyField) {
        assert_eq!(raw.parse::<PolicyField>().unwrap(), expected);
    }

    #[test]
    fn test_policy_field_unknown() {
        assert_eq!(
            "auto_reprint".parse::<PolicyField>().unwrap_err(),
            Error::UnknownPolicyField("auto_reprint".to_string())
        );
    }

    #[test]
    fn test_policy_deserialize_partial() {
        let policy: ValidationPolicy =
            serde_json::from_str(r#"{"physical_print_enabled": false}"#).unwrap();
        assert!(policy.device_validation_enabled);
        assert!(!policy.physical_print_enabled);
    }
}
