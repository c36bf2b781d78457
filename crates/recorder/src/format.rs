//! Compact number rendering for audit lines

/// Significant digits kept by [`format_general`]
const SIGNIFICANT_DIGITS: i32 = 6;

/// Render `value` like C's `%.6g`: six significant digits, trailing zeros
/// removed, scientific notation for very small or very large magnitudes.
#[must_use]
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Round first so that e.g. 999999.7 picks the exponent of its rounded form
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(1920.0), "1920");
        assert_eq!(format_general(-42.0), "-42");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(format_general(301.5), "301.5");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(f64::from(0.1_f32)), "0.1");
        assert_eq!(format_general(123.456789), "123.457");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(999999.7), "1e+06");
    }

    #[test]
    fn test_largest_fixed() {
        assert_eq!(format_general(999999.0), "999999");
    }
}
