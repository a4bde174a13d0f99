//! Display formatters for payment form inputs.
//!
//! These run on every keystroke and only reshape the text. They do not
//! validate card numbers (no Luhn check) or expiry dates.

/// Maximum displayed length of a card number: 16 digits and 3 spaces.
pub const CARD_NUMBER_MAX_LEN: usize = 19;

/// Maximum displayed length of an expiry date (`MM/YY`).
pub const EXPIRY_MAX_LEN: usize = 5;

/// Group card digits in blocks of four.
///
/// ```
/// use dispaso_core::input::format_card_number;
///
/// assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
/// assert_eq!(format_card_number("4111-11"), "4111 11");
/// ```
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let mut out = String::with_capacity(CARD_NUMBER_MAX_LEN);
    for (i, digit) in raw.chars().filter(char::is_ascii_digit).enumerate() {
        if out.len() >= CARD_NUMBER_MAX_LEN {
            break;
        }
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out.truncate(CARD_NUMBER_MAX_LEN);
    out
}

/// Shape expiry input as `MM/YY`.
///
/// ```
/// use dispaso_core::input::format_expiry;
///
/// assert_eq!(format_expiry("1225"), "12/25");
/// assert_eq!(format_expiry("1"), "1");
/// ```
#[must_use]
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 2 {
        return digits;
    }
    let month = digits.get(..2).unwrap_or_default();
    let year = digits.get(2..digits.len().min(4)).unwrap_or_default();
    let mut out = format!("{month}/{year}");
    out.truncate(EXPIRY_MAX_LEN);
    out
}
