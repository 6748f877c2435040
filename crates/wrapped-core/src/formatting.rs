/// Humanize a large count with a `K` / `M` / `B` suffix and one decimal place.
///
/// Values below 1,000 are returned as the plain integer.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::format_large_number;
///
/// assert_eq!(format_large_number(999), "999");
/// assert_eq!(format_large_number(1_000), "1.0K");
/// assert_eq!(format_large_number(234_567), "234.6K");
/// assert_eq!(format_large_number(1_260_000), "1.3M");
/// assert_eq!(format_large_number(3_000_000_000), "3.0B");
/// ```
pub fn format_large_number(n: u64) -> String {
    format_large_number_with_suffix(n, "")
}

/// Same as [`format_large_number`] with a unit appended, e.g. `" tokens"`.
///
/// ```
/// use wrapped_core::formatting::format_large_number_with_suffix;
///
/// assert_eq!(format_large_number_with_suffix(42_000, " tokens"), "42.0K tokens");
/// assert_eq!(format_large_number_with_suffix(7, " tokens"), "7 tokens");
/// ```
pub fn format_large_number_with_suffix(n: u64, suffix: &str) -> String {
    const UNITS: [(u64, &str); 3] = [
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];

    for (threshold, unit) in UNITS {
        if n >= threshold {
            let scaled = n as f64 / threshold as f64;
            return format!("{:.1}{}{}", scaled, unit, suffix);
        }
    }
    format!("{}{}", n, suffix)
}

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by half an ULP at the target precision so exact midpoints such as
    // 1.005 round up despite their binary representation.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use wrapped_core::formatting::format_count;
///
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// assert_eq!(format_count(12), "12");
/// ```
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Format an amount in cents as US dollars.
///
/// ```
/// use wrapped_core::formatting::format_cents;
///
/// assert_eq!(format_cents(123_456.0), "$1,234.56");
/// assert_eq!(format_cents(0.0),       "$0.00");
/// assert_eq!(format_cents(-999.0),    "$-9.99");
/// ```
pub fn format_cents(cents: f64) -> String {
    let dollars = cents / 100.0;
    if dollars < 0.0 {
        format!("$-{}", format_number(dollars.abs(), 2))
    } else {
        format!("${}", format_number(dollars, 2))
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use wrapped_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
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
