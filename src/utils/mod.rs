//! Formatting utilities shared across CLI output and reports
//!
//! Centralizes Brazilian locale rendering of monetary and percentage
//! values: `.` as thousands separator, `,` as decimal separator.

use rust_decimal::Decimal;

/// Group an integer digit string with `.` every three digits: "1234567" -> "1.234.567"
fn group_thousands(digits: &str) -> String {
    let chunks: Vec<&[u8]> = digits.as_bytes().rchunks(3).collect();
    let mut grouped = Vec::with_capacity(digits.len() + chunks.len());
    for (i, chunk) in chunks.iter().rev().enumerate() {
        if i > 0 {
            grouped.push(b'.');
        }
        grouped.extend_from_slice(chunk);
    }
    String::from_utf8(grouped).expect("ascii digits")
}

/// Format a monetary value in Brazilian locale without symbol: "1.234,56"
///
/// # Examples
/// ```
/// use tributo::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.56)), "1.234,56");
/// assert_eq!(format_amount(dec!(-500)), "-500,00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{}{},{}", sign, group_thousands(int_part), frac_part)
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use tributo::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_amount(value))
}

/// Format a fractional rate as a percentage: 0.1432 -> "14,32%"
///
/// # Examples
/// ```
/// use tributo::utils::format_rate_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_rate_pct(dec!(0.1432)), "14,32%");
/// assert_eq!(format_rate_pct(dec!(0)), "0,00%");
/// ```
pub fn format_rate_pct(rate: Decimal) -> String {
    format!("{}%", format_amount(rate * Decimal::ONE_HUNDRED))
}
