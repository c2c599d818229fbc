use crate::{
    Result,
    constants::{SERIAL_DIGITS, SERIAL_SEPARATOR},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware model a serial number belongs to.
///
/// Each variant owns one serial prefix and one label template. Prefixes may
/// share a leading substring (`RC-103` and `RC-103G`), so lookups always
/// compare the whole prefix and never a `starts_with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "RC-102")]
    Rc102,
    #[serde(rename = "RC-103")]
    Rc103,
    #[serde(rename = "RC-103G")]
    Rc103G,
    #[serde(rename = "RC-110")]
    Rc110,
}

impl DeviceType {
    /// Every registered device type.
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Rc102,
        DeviceType::Rc103,
        DeviceType::Rc103G,
        DeviceType::Rc110,
    ];

    /// Serial-number prefix, e.g. `RC-103G`.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            DeviceType::Rc102 => "RC-102",
            DeviceType::Rc103 => "RC-103",
            DeviceType::Rc103G => "RC-103G",
            DeviceType::Rc110 => "RC-110",
        }
    }

    /// Model designation without the vendor part, e.g. `103G`.
    #[must_use]
    pub fn model(&self) -> &'static str {
        match self {
            DeviceType::Rc102 => "102",
            DeviceType::Rc103 => "103",
            DeviceType::Rc103G => "103G",
            DeviceType::Rc110 => "110",
        }
    }

    /// Resolve a prefix to its device type. The match is exact.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.prefix() == prefix)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_prefix(s.trim()).ok_or_else(|| Error::UnknownDeviceType(s.to_string()))
    }
}

/// A validated serial number of the form `PREFIX-NNNNNN`.
///
/// Construction is the only place the serial grammar is checked, so holding
/// a `SerialNumber` means the device type is known and the label can be
/// composed.
///
/// # Examples
///
/// ```
/// use labelstation_core::{DeviceType, SerialNumber};
///
/// let serial = SerialNumber::parse(" RC-110-004200 ").unwrap();
/// assert_eq!(serial.as_str(), "RC-110-004200");
/// assert_eq!(serial.device_type(), DeviceType::Rc110);
///
/// assert!(SerialNumber::parse("RC-104-000001").is_err());
/// assert!(SerialNumber::parse("RC-103-12345").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber {
    value: String,
    device_type: DeviceType,
}

impl SerialNumber {
    /// Parse and validate a serial number.
    ///
    /// Surrounding whitespace is ignored. The text after the last `-` must be
    /// exactly six ASCII digits and the text before it must equal a registered
    /// prefix.
    ///
    /// # Errors
    /// Returns `Error::InvalidSerialFormat` for anything else.
    pub fn parse(input: &str) -> Result<Self> {
        let value = input.trim();
        let invalid = || Error::InvalidSerialFormat(value.to_string());

        let (prefix, number) = value.rsplit_once(SERIAL_SEPARATOR).ok_or_else(invalid)?;

        if number.len() != SERIAL_DIGITS || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let device_type = DeviceType::from_prefix(prefix).ok_or_else(invalid)?;

        Ok(Self {
            value: value.to_string(),
            device_type,
        })
    }

    /// Device type selected by the prefix.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// The full serial string, which is also the barcode key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The six-digit numeric part.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.value[self.value.len() - SERIAL_DIGITS..]
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl std::str::FromStr for SerialNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SerialNumber::parse(s)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        SerialNumber::parse(&value)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.value
    }
}

/// Lifecycle status of an issuance record.
///
/// The station only ever writes `Preready`. Downstream scanners move the
/// record to `Ready` once the physical label has been scanned; any other
/// value they write is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssuanceStatus {
    Preready,
    Ready,
    Other(String),
}

impl IssuanceStatus {
    /// Wire/database representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            IssuanceStatus::Preready => "preready",
            IssuanceStatus::Ready => "ready",
            IssuanceStatus::Other(s) => s,
        }
    }

    /// Whether the label has been confirmed by a downstream scan.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, IssuanceStatus::Ready)
    }

    /// Whether the record has left the station-written `preready` state.
    #[must_use]
    pub fn is_past_preready(&self) -> bool {
        !matches!(self, IssuanceStatus::Preready)
    }
}

impl From<&str> for IssuanceStatus {
    fn from(value: &str) -> Self {
        match value {
            "preready" => IssuanceStatus::Preready,
            "ready" => IssuanceStatus::Ready,
            other => IssuanceStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for IssuanceStatus {
    fn from(value: String) -> Self {
        IssuanceStatus::from(value.as_str())
    }
}

impl From<IssuanceStatus> for String {
    fn from(status: IssuanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for IssuanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("RC-102-000001", DeviceType::Rc102)]
    #[case("RC-103-000123", DeviceType::Rc103)]
    #[case("RC-103G-000123", DeviceType::Rc103G)]
    #[case("RC-110-999999", DeviceType::Rc110)]
    #[case("  RC-103-000123\n", DeviceType::Rc103)]
    fn test_serial_selects_device_type(#[case] input: &str, #[case] expected: DeviceType) {
        let serial = SerialNumber::parse(input).unwrap();
        assert_eq!(serial.device_type(), expected);
        assert_eq!(serial.as_str(), input.trim());
    }

    #[rstest]
    #[case("")]
    #[case("RC-103")]
    #[case("RC-103-")]
    #[case("RC-103-12345")]
    #[case("RC-103-1234567")]
    #[case("RC-103-12345a")]
    #[case("RC-103-１２３４５６")]
    #[case("RC-104-000001")]
    #[case("RC-103X-000001")]
    #[case("rc-103-000001")]
    #[case("RC-103 -000001")]
    #[case("XRC-103-000001")]
    #[case("RC-103G")]
    fn test_serial_rejects_invalid(#[case] input: &str) {
        let err = SerialNumber::parse(input).unwrap_err();
        assert!(matches!(err, Error::InvalidSerialFormat(_)));
    }

    #[test]
    fn test_prefix_overlap_never_falls_through() {
        let plain = SerialNumber::parse("RC-103-000123").unwrap();
        let g = SerialNumber::parse("RC-103G-000123").unwrap();
        assert_ne!(plain.device_type(), g.device_type());
        assert_eq!(g.device_type().prefix(), "RC-103G");
    }

    #[test]
    fn test_serial_number_part() {
        let serial = SerialNumber::parse("RC-103G-004567").unwrap();
        assert_eq!(serial.number(), "004567");
    }

    #[test]
    fn test_serial_serde_as_string() {
        let serial = SerialNumber::parse("RC-102-000042").unwrap();
        let json = serde_json::to_string(&serial).unwrap();
        assert_eq!(json, "\"RC-102-000042\"");

        let back: SerialNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, serial);

        assert!(serde_json::from_str::<SerialNumber>("\"RC-999-000042\"").is_err());
    }

    #[test]
    fn test_device_type_from_str() {
        assert_eq!("RC-110".parse::<DeviceType>().unwrap(), DeviceType::Rc110);
        assert!("RC-1".parse::<DeviceType>().is_err());
        assert_eq!(DeviceType::Rc103G.to_string(), "RC-103G");
        assert_eq!(DeviceType::Rc103G.model(), "103G");
    }

    #[rstest]
    #[case("preready", IssuanceStatus::Preready)]
    #[case("ready", IssuanceStatus::Ready)]
    #[case("shipped", IssuanceStatus::Other("shipped".to_string()))]
    fn test_issuance_status_from_str(#[case] raw: &str, #[case] expected: IssuanceStatus) {
        let status = IssuanceStatus::from(raw);
        assert_eq!(status, expected);
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn test_issuance_status_predicates() {
        assert!(!IssuanceStatus::Preready.is_past_preready());
        assert!(IssuanceStatus::Ready.is_past_preready());
        assert!(IssuanceStatus::Ready.is_ready());
        assert!(!IssuanceStatus::Other("shipped".into()).is_ready());
    }
}
