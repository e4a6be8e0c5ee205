//! Number formatting for the dashboard, following the `id-ID` locale:
//! `.` groups thousands, `,` separates decimals, at most three fraction
//! digits with trailing zeros dropped.

const MAX_FRACTION_DIGITS: usize = 3;

pub fn group_digits(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let scale = 10f64.powi(MAX_FRACTION_DIGITS as i32);
    let rounded = (value.abs() * scale).round() / scale;
    let text = format!("{:.*}", MAX_FRACTION_DIGITS, rounded);
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, fraction.trim_end_matches('0')),
        None => (text.as_str(), ""),
    };

    let mut out = String::with_capacity(text.len() + integer.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    let len = integer.len();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push(',');
        out.push_str(fraction);
    }
    out
}

/// Area exactly as the backend reported it.
pub fn area(hectares: f64) -> String {
    format!("{} ha (est.)", hectares)
}

pub fn stock(tonnes: f64) -> String {
    format!("{} Ton CO₂e", group_digits(tonnes))
}

pub fn rupiah(amount: f64) -> String {
    format!("Rp {}", group_digits(amount))
}
