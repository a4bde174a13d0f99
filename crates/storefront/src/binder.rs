//! Maps page events onto widget actions.
//!
//! Clicks carry the path from the clicked element up through its ancestors,
//! so one binding covers rows the renderer rebuilds on every change. Each
//! element on the path is checked, nearest first, against the page's
//! controls; the first one that matches decides the binding.

use std::collections::BTreeMap;

use dispaso_core::input::{format_card_number, format_expiry};
use dispaso_core::{PaymentMethod, PaymentSelection};

use crate::action::{Action, RowControl};
use crate::cart::AddRequest;

/// Id of the header control that opens the overlay.
pub const OPEN_CART_ID: &str = "open-cart";
/// Id of the "continue to payment" control.
pub const TO_PAYMENT_ID: &str = "to-payment";
/// Id of the card-number input.
pub const CARD_NUMBER_FIELD: &str = "pay-card";
/// Id of the card-expiry input.
pub const EXPIRY_FIELD: &str = "pay-exp";

/// The attributes of one page element that the binder reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
}

impl Element {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute, e.g. `data-id`.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn element_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// A page event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A click. `path[0]` is the clicked element, followed by its ancestors.
    Click { path: Vec<Element> },
    /// A form was submitted.
    Submit { form_id: String },
    /// A text field changed.
    Input { field_id: String, value: String },
    /// A key was pressed anywhere on the page.
    KeyDown { key: String },
}

impl UiEvent {
    /// Click on a single element with no interesting ancestors.
    #[must_use]
    pub fn click(target: Element) -> Self {
        Self::Click { path: vec![target] }
    }
}

/// What the page should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Hand the action to the controller.
    Dispatch(Action),
    /// Replace the field's value with the formatted text.
    FormatInput { field_id: String, value: String },
    /// Not ours.
    Ignored,
}

/// Bind one page event.
#[must_use]
pub fn bind(event: &UiEvent) -> Binding {
    match event {
        UiEvent::Click { path } => bind_click(path),
        UiEvent::Submit { form_id } => {
            if PaymentMethod::from_form_id(form_id).is_some() {
                Binding::Dispatch(Action::SubmitPayment)
            } else {
                Binding::Ignored
            }
        }
        UiEvent::Input { field_id, value } => {
            let formatted = match field_id.as_str() {
                CARD_NUMBER_FIELD => format_card_number(value),
                EXPIRY_FIELD => format_expiry(value),
                _ => return Binding::Ignored,
            };
            Binding::FormatInput {
                field_id: field_id.clone(),
                value: formatted,
            }
        }
        UiEvent::KeyDown { key } if key == "Escape" => Binding::Dispatch(Action::CloseOverlay),
        UiEvent::KeyDown { .. } => Binding::Ignored,
    }
}

fn bind_click(path: &[Element]) -> Binding {
    let Some(target) = path.first() else {
        return Binding::Ignored;
    };

    for (depth, element) in path.iter().enumerate() {
        let action = if element.get_attr("data-close") == Some("cart") {
            Some(Action::CloseOverlay)
        } else if element.is(OPEN_CART_ID) {
            Some(Action::OpenOverlay)
        } else if element.is(TO_PAYMENT_ID) {
            Some(Action::ContinueToPayment)
        } else if element.has_class("overlay-tab") {
            element
                .get_attr("data-step")
                .and_then(|step| step.parse().ok())
                .map(Action::SwitchStep)
        } else if element.has_class("payment-method-btn") {
            element
                .get_attr("data-method")
                .and_then(|method| {
                    PaymentSelection::from_tokens(method, element.get_attr("data-type"))
                })
                .map(Action::SelectPayment)
        } else if element.has_class("add-to-cart") {
            add_to_cart(path.get(depth + 1..).unwrap_or_default())
        } else if element.has_class("cart-item") {
            row_action(target, element)
        } else {
            continue;
        };

        return action.map_or(Binding::Ignored, Binding::Dispatch);
    }

    Binding::Ignored
}

/// Add-to-cart reads the enclosing product card.
fn add_to_cart(ancestors: &[Element]) -> Option<Action> {
    let card = ancestors.iter().find(|e| e.has_class("product-card"))?;
    let attr = |name: &str| card.get_attr(name).map(str::to_string);
    Some(Action::AddToCart(AddRequest {
        id: attr("data-id").unwrap_or_default(),
        name: attr("data-name"),
        price: attr("data-price"),
        image: attr("data-image"),
    }))
}

/// Row controls read `data-action` from the clicked element and `data-id`
/// from the row.
fn row_action(target: &Element, row: &Element) -> Option<Action> {
    let id = row.get_attr("data-id").filter(|id| !id.is_empty())?;
    let control: RowControl = target.get_attr("data-action")?.parse().ok()?;
    Some(control.action(id))
}
