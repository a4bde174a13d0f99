//! Payment input formatting commands.

use dispaso_core::input::{format_card_number, format_expiry};

/// Print `value` grouped as a card number.
#[allow(clippy::print_stdout)]
pub fn card_number(value: &str) {
    println!("{}", format_card_number(value));
}

/// Print `value` formatted as an expiry date.
#[allow(clippy::print_stdout)]
pub fn expiry(value: &str) {
    println!("{}", format_expiry(value));
}
