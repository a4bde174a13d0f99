//! Actions the widget accepts and the effects it asks its host to perform.

use chrono::{DateTime, Utc};
use dispaso_core::{OrderReference, OverlayStep, PaymentSelection};

use crate::cart::AddRequest;
use crate::checkout::ProcessingTicket;

/// Everything that can happen to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Add one unit of a product.
    AddToCart(AddRequest),
    /// Remove a product's line entirely.
    Remove(String),
    /// One more unit of a product.
    Increment(String),
    /// One fewer unit of a product; the line goes away at zero.
    Decrement(String),
    /// Show the checkout overlay.
    OpenOverlay,
    /// Hide the checkout overlay and reset it.
    CloseOverlay,
    /// A tab was clicked.
    SwitchStep(OverlayStep),
    /// The "continue to payment" control was clicked.
    ContinueToPayment,
    /// A payment method button was clicked.
    SelectPayment(PaymentSelection),
    /// A payment form was submitted.
    SubmitPayment,
    /// The processing delay for `ticket` elapsed.
    ProcessingFinished {
        ticket: ProcessingTicket,
        reference: OrderReference,
        placed_at: DateTime<Utc>,
    },
}

impl Action {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "add_to_cart",
            Self::Remove(_) => "remove",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::OpenOverlay => "open_overlay",
            Self::CloseOverlay => "close_overlay",
            Self::SwitchStep(_) => "switch_step",
            Self::ContinueToPayment => "continue_to_payment",
            Self::SelectPayment(_) => "select_payment",
            Self::SubmitPayment => "submit_payment",
            Self::ProcessingFinished { .. } => "processing_finished",
        }
    }
}

/// Per-row cart control, from the `data-action` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    Inc,
    Dec,
    Remove,
}

impl RowControl {
    /// The `data-action` token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Remove => "remove",
        }
    }

    /// The action this control performs on row `id`.
    #[must_use]
    pub fn action(self, id: &str) -> Action {
        match self {
            Self::Inc => Action::Increment(id.to_string()),
            Self::Dec => Action::Decrement(id.to_string()),
            Self::Remove => Action::Remove(id.to_string()),
        }
    }
}

impl std::str::FromStr for RowControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" => Ok(Self::Inc),
            "dec" => Ok(Self::Dec),
            "remove" => Ok(Self::Remove),
            _ => Err(format!("invalid cart row action: {s}")),
        }
    }
}

/// Work the reducer hands back to the controller, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the whole cart to the store.
    Persist,
    /// Re-render every view.
    Render,
    /// Show a blocking notice.
    Notice(&'static str),
    /// Show the transient "Added {name} to cart!" toast.
    AddedFeedback(String),
    /// Animate the cart badge.
    PulseBadge,
    /// Start the payment processing delay for `ticket`.
    ScheduleProcessing(ProcessingTicket),
    /// Stop the processing delay for `ticket`.
    CancelProcessing(ProcessingTicket),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_control_tokens() {
        for control in [RowControl::Inc, RowControl::Dec, RowControl::Remove] {
            assert_eq!(control.as_str().parse::<RowControl>().unwrap(), control);
        }
        assert!("double".parse::<RowControl>().is_err());
    }

    #[test]
    fn test_row_control_actions() {
        assert_eq!(
            RowControl::Dec.action("energy-rush"),
            Action::Decrement("energy-rush".to_string())
        );
        assert_eq!(
            RowControl::Remove.action("energy-rush"),
            Action::Remove("energy-rush".to_string())
        );
    }
}
