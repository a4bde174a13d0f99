//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept as [`Decimal`] so that totals such as `3 × 19.99` are exact.
//! Prices read from markup or from persisted carts go through
//! [`Price::leading_number`], which accepts the same inputs a browser's
//! `parseFloat` does: leading whitespace, an optional sign, digits with an
//! optional fraction and exponent, followed by anything.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display with two decimals, e.g. `₹25.00`. Halves round
    /// away from zero.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }

    /// Parse the numeric prefix of `input` the way `parseFloat` does.
    ///
    /// Returns `None` when the input does not start with a number (after
    /// leading whitespace). Magnitudes beyond [`Decimal::MAX`] saturate and
    /// digits past the 28th decimal place are rounded off.
    ///
    /// ```
    /// use dispaso_core::Price;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Price::leading_number("12.5abc"), Some(Decimal::new(125, 1)));
    /// assert_eq!(Price::leading_number("  7"), Some(Decimal::new(7, 0)));
    /// assert_eq!(Price::leading_number("abc"), None);
    /// ```
    #[must_use]
    pub fn leading_number(input: &str) -> Option<Decimal> {
        let s = input.trim_start();
        let bytes = s.as_bytes();
        let mut pos = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                pos = 1;
                true
            }
            Some(b'+') => {
                pos = 1;
                false
            }
            _ => false,
        };

        let int_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        let int_digits = s.get(int_start..pos)?;

        let mut frac_digits = "";
        if bytes.get(pos) == Some(&b'.') {
            let frac_start = pos + 1;
            let mut frac_end = frac_start;
            while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
                frac_end += 1;
            }
            if frac_end > frac_start || !int_digits.is_empty() {
                frac_digits = s.get(frac_start..frac_end)?;
                pos = frac_end;
            }
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            let mut exp_pos = pos + 1;
            let exp_negative = match bytes.get(exp_pos) {
                Some(b'-') => {
                    exp_pos += 1;
                    true
                }
                Some(b'+') => {
                    exp_pos += 1;
                    false
                }
                _ => false,
            };
            let exp_start = exp_pos;
            while bytes.get(exp_pos).is_some_and(u8::is_ascii_digit) {
                exp_pos += 1;
            }
            if exp_pos > exp_start {
                let magnitude = s
                    .get(exp_start..exp_pos)
                    .and_then(|digits| digits.parse::<i64>().ok())
                    .unwrap_or(i64::MAX);
                exponent = if exp_negative { -magnitude } else { magnitude };
            }
        }

        Some(decimal_from_parts(negative, int_digits, frac_digits, exponent))
    }
}

/// Integer digits of [`Decimal::MAX`]; anything with more overflows.
const MAX_INTEGER_DIGITS: i64 = 29;

/// Smallest decimal point position that can still round to a non-zero
/// value at 28 decimal places.
const MIN_POINT: i64 = -28;

/// Build a decimal from `int.frac × 10^exponent`, saturating on overflow.
fn decimal_from_parts(
    negative: bool,
    int_digits: &str,
    frac_digits: &str,
    exponent: i64,
) -> Decimal {
    let all = format!("{int_digits}{frac_digits}");
    let significant = all.trim_start_matches('0');
    if significant.is_empty() {
        return Decimal::ZERO;
    }

    let leading_zeros = i64::try_from(all.len() - significant.len()).unwrap_or(i64::MAX);
    let int_len = i64::try_from(int_digits.len()).unwrap_or(i64::MAX);
    // Position of the decimal point, counted from the first significant digit.
    let point = int_len.saturating_add(exponent).saturating_sub(leading_zeros);

    let saturated = if negative { Decimal::MIN } else { Decimal::MAX };
    if point > MAX_INTEGER_DIGITS {
        return saturated;
    }
    if point < MIN_POINT {
        return Decimal::ZERO;
    }

    let mut literal = String::with_capacity(significant.len() + 32);
    if negative {
        literal.push('-');
    }
    match usize::try_from(point) {
        Ok(0) | Err(_) => {
            literal.push_str("0.");
            literal.extend(std::iter::repeat_n('0', usize::try_from(-point).unwrap_or(0)));
            literal.push_str(significant);
        }
        Ok(split) => match significant.split_at_checked(split) {
            Some((whole, fraction)) => {
                literal.push_str(whole);
                if !fraction.is_empty() {
                    literal.push('.');
                    literal.push_str(fraction);
                }
            }
            None => {
                literal.push_str(significant);
                literal.extend(std::iter::repeat_n('0', split - significant.len()));
            }
        },
    }

    literal.parse::<Decimal>().unwrap_or(saturated)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}
