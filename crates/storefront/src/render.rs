//! Projection of widget state onto the product page.
//!
//! [`WidgetView::project`] turns a [`WidgetState`] into plain display data:
//! every price pre-formatted and every visibility decided. The askama
//! templates only lay that data out. The whole list is rebuilt on every
//! render.

use askama::Template;
use dispaso_core::{CardKind, CurrencyCode, OverlayStep, PaymentSelection, Price};

use crate::cart::{Cart, CartItem};
use crate::checkout::{Confirmation, Overlay};
use crate::reducer::WidgetState;

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Unit price, e.g. `₹10.00`.
    pub price: String,
    pub line_price: String,
}

impl CartItemView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            image: item.image().to_string(),
            quantity: item.quantity(),
            price: item.unit_price(currency).display(),
            line_price: Price::new(item.line_total(), currency).display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
    /// Whether the "continue to payment" control is enabled.
    pub can_continue: bool,
}

impl CartView {
    /// Project `cart`, formatting prices in `currency`.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            total: Price::new(cart.total(), currency).display(),
            item_count: cart.item_count(),
            can_continue: !cart.is_empty(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Header cart badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeView {
    pub count: u64,
    pub visible: bool,
}

impl BadgeView {
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self {
            count,
            visible: count > 0,
        }
    }

    /// Inline `display` value for the badge.
    #[must_use]
    pub const fn display(&self) -> &'static str {
        if self.visible { "flex" } else { "none" }
    }
}

/// One overlay tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabView {
    pub step: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// One payment method button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentButtonView {
    pub method: &'static str,
    /// `data-type`, empty for methods without a subtype.
    pub card_type: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// The payment buttons offered, in page order.
const PAYMENT_BUTTONS: [(PaymentSelection, &str); 5] = [
    (PaymentSelection::Card(CardKind::Credit), "Credit Card"),
    (PaymentSelection::Card(CardKind::Debit), "Debit Card"),
    (PaymentSelection::Upi, "UPI"),
    (PaymentSelection::Qr, "QR Code"),
    (PaymentSelection::Paypal, "PayPal"),
];

impl PaymentButtonView {
    fn new(button: PaymentSelection, label: &'static str, selected: Option<PaymentSelection>) -> Self {
        let active = selected.is_some_and(|sel| {
            sel.method() == button.method()
                && button
                    .card_kind()
                    .is_none_or(|kind| sel.card_kind() == Some(kind))
        });
        Self {
            method: button.method().as_str(),
            card_type: button.card_kind().map_or("", CardKind::as_str),
            label,
            active,
        }
    }
}

/// Completed checkout summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView {
    pub reference: String,
    pub placed_at: String,
    pub payment: String,
    pub item_count: u64,
    pub total: String,
}

impl ConfirmationView {
    fn new(confirmation: &Confirmation, currency: CurrencyCode) -> Self {
        Self {
            reference: confirmation.reference.short(),
            placed_at: confirmation
                .placed_at
                .format("%Y-%m-%d %H:%M UTC")
                .to_string(),
            payment: confirmation.payment.to_string(),
            item_count: confirmation.item_count,
            total: Price::new(confirmation.total, currency).display(),
        }
    }
}

/// Checkout overlay display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub open: bool,
    /// `data-step` of the visible panel.
    pub step: &'static str,
    pub tabs: Vec<TabView>,
    pub payment_buttons: Vec<PaymentButtonView>,
    /// Id of the active payment form, empty when none is selected.
    pub active_form: &'static str,
    pub card_form_title: &'static str,
    pub processing: bool,
    pub confirmation: Option<ConfirmationView>,
}

impl OverlayView {
    /// Project `overlay`, formatting prices in `currency`.
    #[must_use]
    pub fn new(overlay: &Overlay, currency: CurrencyCode) -> Self {
        let step = overlay.step();
        let selection = overlay.selection();
        Self {
            open: overlay.is_open(),
            step: step.as_str(),
            tabs: OverlayStep::ALL
                .iter()
                .map(|&tab| TabView {
                    step: tab.as_str(),
                    label: tab.label(),
                    active: tab == step,
                })
                .collect(),
            payment_buttons: PAYMENT_BUTTONS
                .iter()
                .map(|&(button, label)| PaymentButtonView::new(button, label, selection))
                .collect(),
            active_form: selection.map_or("", |sel| sel.method().form_id()),
            card_form_title: overlay
                .card_form_title()
                .unwrap_or_else(|| CardKind::Credit.form_title()),
            processing: overlay.processing().is_some(),
            confirmation: overlay
                .confirmation()
                .map(|c| ConfirmationView::new(c, currency)),
        }
    }

    /// Value of the overlay's `aria-hidden` attribute.
    #[must_use]
    pub const fn aria_hidden(&self) -> &'static str {
        if self.open { "false" } else { "true" }
    }

    /// Whether the panel for `step` is visible.
    #[must_use]
    pub fn shows(&self, step: &str) -> bool {
        self.step == step
    }

    /// Whether `form_id` is the active payment form.
    #[must_use]
    pub fn form_active(&self, form_id: &str) -> bool {
        !self.active_form.is_empty() && self.active_form == form_id
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub cart: CartView,
    pub badge: BadgeView,
    pub overlay: OverlayView,
}

impl WidgetView {
    /// Project the whole widget.
    #[must_use]
    pub fn project(state: &WidgetState, currency: CurrencyCode) -> Self {
        let cart = CartView::new(state.cart(), currency);
        Self {
            badge: BadgeView::new(cart.item_count),
            overlay: OverlayView::new(state.overlay(), currency),
            cart,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart list fragment.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate<'a> {
    pub cart: &'a CartView,
}

/// Header badge fragment.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub badge: BadgeView,
}

/// Checkout overlay fragment.
#[derive(Template)]
#[template(path = "partials/checkout_overlay.html")]
pub struct CheckoutOverlayTemplate<'a> {
    pub cart: &'a CartView,
    pub overlay: &'a OverlayView,
}

/// Rendered HTML for each region of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFragments {
    pub cart_items: String,
    pub cart_count: String,
    pub overlay: String,
}

/// Render every fragment of `view`.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn render_html(view: &WidgetView) -> askama::Result<HtmlFragments> {
    Ok(HtmlFragments {
        cart_items: CartItemsTemplate { cart: &view.cart }.render()?,
        cart_count: CartCountTemplate { badge: view.badge }.render()?,
        overlay: CheckoutOverlayTemplate {
            cart: &view.cart,
            overlay: &view.overlay,
        }
        .render()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use dispaso_core::OrderReference;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::action::Action;
    use crate::cart::AddRequest;
    use crate::reducer::reduce;

    fn state_with_items() -> WidgetState {
        let mut state = WidgetState::default();
        for action in [
            Action::AddToCart(AddRequest::new("energy-rush").name("Energy Rush").price("10")),
            Action::AddToCart(AddRequest::new("energy-rush")),
            Action::AddToCart(AddRequest::new("mango").name("Mango <Mist>").price("5")),
        ] {
            let _ = reduce(&mut state, action);
        }
        state
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let view = WidgetView::project(&state_with_items(), CurrencyCode::INR);

        assert_eq!(view.cart.total, "₹25.00");
        assert_eq!(view.cart.item_count, 3);
        assert!(view.cart.can_continue);
        assert_eq!(view.cart.items[0].price, "₹10.00");
        assert_eq!(view.cart.items[0].line_price, "₹20.00");
        assert_eq!(view.cart.items[0].image, "./images/energy-rush.png");
        assert_eq!(view.cart.items[1].image, "./images/default-can.png");
        assert_eq!(view.badge, BadgeView::new(3));
    }

    #[test]
    fn test_empty_cart_view() {
        let view = WidgetView::project(&WidgetState::default(), CurrencyCode::INR);
        assert!(view.cart.is_empty());
        assert!(!view.cart.can_continue);
        assert_eq!(view.cart.total, "₹0.00");
        assert!(!view.badge.visible);
        assert_eq!(view.badge.display(), "none");
        assert_eq!(view.overlay.aria_hidden(), "true");
    }

    #[test]
    fn test_payment_buttons_follow_selection() {
        let mut state = state_with_items();
        for action in [
            Action::OpenOverlay,
            Action::ContinueToPayment,
            Action::SelectPayment(PaymentSelection::Card(CardKind::Debit)),
        ] {
            let _ = reduce(&mut state, action);
        }

        let view = WidgetView::project(&state, CurrencyCode::INR).overlay;
        let active: Vec<_> = view
            .payment_buttons
            .iter()
            .filter(|b| b.active)
            .map(|b| (b.method, b.card_type))
            .collect();
        assert_eq!(active, vec![("card", "debit")]);
        assert_eq!(view.active_form, "card-payment-form");
        assert_eq!(view.card_form_title, "Debit Card Details");
        assert!(view.shows("payment"));
        assert!(view.tabs[1].active);
    }

    #[test]
    fn test_html_fragments() {
        let mut state = state_with_items();
        let _ = reduce(&mut state, Action::OpenOverlay);
        let html = render_html(&WidgetView::project(&state, CurrencyCode::INR)).unwrap();

        assert!(html.cart_items.contains(r#"data-id="energy-rush""#));
        assert!(html.cart_items.contains(r#"data-action="inc""#));
        assert!(html.cart_items.contains("₹10.00 each"));
        assert!(html.cart_items.contains("Mango "));
        assert!(!html.cart_items.contains("<Mist>"));
        assert!(html.cart_count.contains(">3<"));
        assert!(html.overlay.contains(r#"aria-hidden="false""#));
        assert!(html.overlay.contains("₹25.00"));
    }

    #[test]
    fn test_confirmation_view() {
        let confirmation = Confirmation {
            reference: OrderReference::from_uuid(Uuid::nil()),
            placed_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
            payment: PaymentSelection::Card(CardKind::Credit),
            item_count: 3,
            total: Decimal::new(25, 0),
        };
        let view = ConfirmationView::new(&confirmation, CurrencyCode::USD);
        assert_eq!(view.reference, "DSP-00000000");
        assert_eq!(view.placed_at, "2026-03-01 12:30 UTC");
        assert_eq!(view.payment, "credit card");
        assert_eq!(view.total, "$25.00");
    }
}
