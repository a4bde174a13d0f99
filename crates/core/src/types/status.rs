//! Checkout overlay steps and payment selections.
//!
//! The string forms (`as_str` / `FromStr`) match the `data-step`,
//! `data-method` and `data-type` attribute values used by the product page.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Which panel of the checkout overlay is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStep {
    /// Cart review.
    #[default]
    Cart,
    /// Payment method selection and entry.
    Payment,
    /// Order confirmation.
    Done,
}

impl OverlayStep {
    /// All steps in tab order.
    pub const ALL: [Self; 3] = [Self::Cart, Self::Payment, Self::Done];

    /// The `data-step` identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Payment => "payment",
            Self::Done => "done",
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Payment => "Payment",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for OverlayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OverlayStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "payment" => Ok(Self::Payment),
            "done" => Ok(Self::Done),
            _ => Err(format!("invalid overlay step: {s}")),
        }
    }
}

/// Payment method offered on the payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    Qr,
    Paypal,
}

impl PaymentMethod {
    /// All methods in display order.
    pub const ALL: [Self; 4] = [Self::Card, Self::Upi, Self::Qr, Self::Paypal];

    /// The `data-method` identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Qr => "qr",
            Self::Paypal => "paypal",
        }
    }

    /// Id of the form element holding this method's fields.
    #[must_use]
    pub const fn form_id(self) -> &'static str {
        match self {
            Self::Card => "card-payment-form",
            Self::Upi => "upi-payment-form",
            Self::Qr => "qr-payment-form",
            Self::Paypal => "paypal-payment-form",
        }
    }

    /// Resolve a payment form id back to its method.
    #[must_use]
    pub fn from_form_id(form_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.form_id() == form_id)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "qr" => Ok(Self::Qr),
            "paypal" => Ok(Self::Paypal),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Card subtype, only meaningful for [`PaymentMethod::Card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    #[default]
    Credit,
    Debit,
}

impl CardKind {
    /// The `data-type` identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Title shown above the card form.
    #[must_use]
    pub const fn form_title(self) -> &'static str {
        match self {
            Self::Credit => "Credit Card Details",
            Self::Debit => "Debit Card Details",
        }
    }
}

impl std::str::FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("invalid card type: {s}")),
        }
    }
}

/// The active payment choice: a method, plus the card kind when paying by card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "method", content = "type", rename_all = "snake_case")]
pub enum PaymentSelection {
    Card(CardKind),
    Upi,
    Qr,
    Paypal,
}

impl PaymentSelection {
    /// Build a selection from `data-method` / `data-type` attribute values.
    ///
    /// A card without a recognised type is treated as credit; the type is
    /// ignored for every other method. Returns `None` for an unknown method.
    #[must_use]
    pub fn from_tokens(method: &str, kind: Option<&str>) -> Option<Self> {
        let method = method.parse::<PaymentMethod>().ok()?;
        Some(match method {
            PaymentMethod::Card => Self::Card(
                kind.and_then(|k| k.parse::<CardKind>().ok())
                    .unwrap_or_default(),
            ),
            PaymentMethod::Upi => Self::Upi,
            PaymentMethod::Qr => Self::Qr,
            PaymentMethod::Paypal => Self::Paypal,
        })
    }

    /// The selected method.
    #[must_use]
    pub const fn method(self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::Card,
            Self::Upi => PaymentMethod::Upi,
            Self::Qr => PaymentMethod::Qr,
            Self::Paypal => PaymentMethod::Paypal,
        }
    }

    /// The card kind, if this is a card selection.
    #[must_use]
    pub const fn card_kind(self) -> Option<CardKind> {
        match self {
            Self::Card(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(kind) => write!(f, "{} card", kind.as_str()),
            other => f.write_str(other.method().as_str()),
        }
    }
}
