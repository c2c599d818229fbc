//! Property-based tests for serial-number parsing.
//!
//! Run with: cargo test --package labelstation-core --test property_tests

use labelstation_core::{DeviceType, SerialNumber};
use proptest::prelude::*;

fn device_type() -> impl Strategy<Value = DeviceType> {
    prop::sample::select(DeviceType::ALL.to_vec())
}

fn six_digits() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{6}").expect("Failed to create digit regex strategy")
}

proptest! {
    /// Every registered prefix followed by six digits parses to that prefix's type.
    #[test]
    fn prop_valid_serial_selects_its_type(device in device_type(), digits in six_digits()) {
        let raw = format!("{}-{}", device.prefix(), digits);
        let serial = SerialNumber::parse(&raw).unwrap();

        prop_assert_eq!(serial.device_type(), device);
        prop_assert_eq!(serial.number(), digits.as_str());
        prop_assert_eq!(serial.to_string(), raw);
    }

    /// Arbitrary input never panics, and anything accepted re-parses identically.
    #[test]
    fn prop_arbitrary_input_never_panics(input in ".{0,24}") {
        if let Ok(serial) = SerialNumber::parse(&input) {
            let again = SerialNumber::parse(serial.as_str()).unwrap();
            prop_assert_eq!(again, serial);
        }
    }

    /// Wrong digit counts are always rejected.
    #[test]
    fn prop_wrong_digit_count_rejected(
        device in device_type(),
        digits in prop::string::string_regex("[0-9]{0,5}|[0-9]{7,10}").expect("regex"),
    ) {
        let raw = format!("{}-{}", device.prefix(), digits);
        prop_assert!(SerialNumber::parse(&raw).is_err());
    }
}
