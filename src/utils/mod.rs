/// Validate a CSS hex color like `#2563eb` or `#fff`.
pub fn is_valid_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a 24-hour `HH:MM` time string.
pub fn is_valid_time_hhmm(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return false;
    }
    if !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
        return false;
    }
    match (hours.parse::<u8>(), minutes.parse::<u8>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_validation() {
        assert!(is_valid_hex_color("#2563eb"));
        assert!(is_valid_hex_color("#FFF"));
        assert!(!is_valid_hex_color("2563eb"));
        assert!(!is_valid_hex_color("#2563e"));
        assert!(!is_valid_hex_color("#25g3eb"));
        assert!(!is_valid_hex_color("#"));
    }

    #[test]
    fn test_time_validation() {
        assert!(is_valid_time_hhmm("06:00"));
        assert!(is_valid_time_hhmm("23:59"));
        assert!(!is_valid_time_hhmm("24:00"));
        assert!(!is_valid_time_hhmm("6:00"));
        assert!(!is_valid_time_hhmm("06:60"));
        assert!(!is_valid_time_hhmm("0600"));
    }
}
