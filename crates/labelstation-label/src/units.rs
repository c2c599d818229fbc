//! Physical unit conversions.

use labelstation_core::constants::MM_PER_INCH;

/// Points per inch.
pub const PT_PER_INCH: f64 = 72.0;

/// Convert millimetres to dots at `dpi`, rounding to the nearest dot.
///
/// Negative lengths clamp to zero.
///
/// ```
/// use labelstation_label::units::mm_to_dots;
///
/// assert_eq!(mm_to_dots(25.4, 600), 600);
/// assert_eq!(mm_to_dots(5.0, 600), 118);
/// ```
#[must_use]
pub fn mm_to_dots(mm: f64, dpi: u32) -> u32 {
    (mm * f64::from(dpi) / MM_PER_INCH).round().max(0.0) as u32
}

/// Convert typographic points to dots at `dpi`.
#[must_use]
pub fn pt_to_dots(pt: f64, dpi: u32) -> u32 {
    (pt * f64::from(dpi) / PT_PER_INCH).round().max(0.0) as u32
}

/// Rescale a dot coordinate from one resolution to another.
#[must_use]
pub fn rescale(dots: u32, from_dpi: u32, to_dpi: u32) -> u32 {
    if from_dpi == to_dpi || from_dpi == 0 {
        return dots;
    }
    (f64::from(dots) * f64::from(to_dpi) / f64::from(from_dpi)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 600, 0)]
    #[case(51.0, 600, 1205)]
    #[case(25.0, 600, 591)]
    #[case(51.0, 300, 602)]
    #[case(-3.0, 600, 0)]
    fn test_mm_to_dots(#[case] mm: f64, #[case] dpi: u32, #[case] expected: u32) {
        assert_eq!(mm_to_dots(mm, dpi), expected);
    }

    #[test]
    fn test_pt_to_dots() {
        assert_eq!(pt_to_dots(6.0, 600), 50);
        assert_eq!(pt_to_dots(4.0, 300), 17);
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(1205, 600, 300), 603);
        assert_eq!(rescale(118, 600, 600), 118);
    }
}
