//! Terminal rendering.

use std::time::Duration;

use dispaso_storefront::WidgetHost;
use dispaso_storefront::render::{CartView, ConfirmationView, HtmlFragments, WidgetView};

/// Shows notices and toasts on stdout. Views are printed on demand by the
/// commands instead of on every render.
pub struct TerminalHost;

impl WidgetHost for TerminalHost {
    fn render(&mut self, _view: &WidgetView) {}

    #[allow(clippy::print_stdout)]
    fn notice(&mut self, message: &str) {
        println!("! {message}");
    }

    #[allow(clippy::print_stdout)]
    fn feedback(&mut self, message: &str, _duration: Duration) {
        println!("{message}");
    }
}

/// One-line cart summary.
#[allow(clippy::print_stdout)]
pub fn print_summary(cart: &CartView) {
    println!("Cart: {} item(s), total {}", cart.item_count, cart.total);
}

/// Full cart listing.
#[allow(clippy::print_stdout)]
pub fn print_cart(cart: &CartView) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let width = cart
        .items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);
    for item in &cart.items {
        println!(
            "{:<width$}  x{:<3} {:>12} each  {:>12}   [{}]",
            item.name, item.quantity, item.price, item.line_price, item.id
        );
    }
    println!();
    println!("Items: {}", cart.item_count);
    println!("Total: {}", cart.total);
}

/// Rendered page fragments, one section per region.
#[allow(clippy::print_stdout)]
pub fn print_fragments(html: &HtmlFragments) {
    println!("<!-- #header-cart-count -->");
    println!("{}", html.cart_count.trim());
    println!("<!-- #cart-list -->");
    println!("{}", html.cart_items.trim());
    println!("<!-- #cart-overlay -->");
    println!("{}", html.overlay.trim());
}

/// Order confirmation.
#[allow(clippy::print_stdout)]
pub fn print_confirmation(confirmation: &ConfirmationView) {
    println!("Order {} placed {}", confirmation.reference, confirmation.placed_at);
    println!(
        "{} item(s), {} paid by {}",
        confirmation.item_count, confirmation.total, confirmation.payment
    );
}
