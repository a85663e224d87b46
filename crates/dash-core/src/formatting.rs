/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// Non-finite values are rendered as-is (`NaN`, `inf`, `-inf`).
///
/// # Examples
///
/// ```
/// use dash_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// assert_eq!(format_number(f64::INFINITY, 1), "inf");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a tiny epsilon before rounding so exact binary midpoints such
    // as 1.005 round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a fraction as a percentage: `0.123` → `"12.3%"` at one decimal.
///
/// Undefined ratios pass through unchanged (`NaN%`, `inf%`, `-inf%`).
///
/// # Examples
///
/// ```
/// use dash_core::formatting::format_percent;
///
/// assert_eq!(format_percent(0.123, 1), "12.3%");
/// assert_eq!(format_percent(-0.5, 2), "-50.00%");
/// assert_eq!(format_percent(f64::NAN, 1), "NaN%");
/// ```
pub fn format_percent(fraction: f64, decimals: u32) -> String {
    format!("{:.prec$}%", fraction * 100.0, prec = decimals as usize)
}

/// Format `HH:MM:SS` from a count of seconds.
///
/// # Examples
///
/// ```
/// use dash_core::formatting::format_clock;
///
/// assert_eq!(format_clock(461.0), "00:07:41");
/// assert_eq!(format_clock(3723.4), "01:02:03");
/// ```
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--:--".to_string();
    }
    let total = seconds.round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
