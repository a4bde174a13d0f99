//! Error types for the cart widget.
//!
//! Storage and persisted-data errors never reach the shopper: the store
//! adapter logs them and the cart degrades to memory. Checkout validation
//! errors are the only ones surfaced, as a blocking notice.

use thiserror::Error;

/// Failure of the key-value store behind the cart.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage is disabled or refused the operation (private mode, quota).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be mapped onto the backing store.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// The persisted cart payload could not be used.
#[derive(Debug, Error)]
pub enum PersistedDataError {
    /// The payload is not valid JSON.
    #[error("Malformed persisted cart: {0}")]
    Unparseable(#[from] serde_json::Error),

    /// The payload is valid JSON but not an array of items.
    #[error("Persisted cart is not an array")]
    NotAnArray,
}

/// Checkout submission rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No payment method has been chosen on the payment step.
    #[error("No payment method selected")]
    NoPaymentMethodSelected,

    /// The cart has no items.
    #[error("Cart is empty")]
    EmptyCart,
}

impl CheckoutError {
    /// The message shown to the shopper.
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::NoPaymentMethodSelected => "Please select a payment method first.",
            Self::EmptyCart => "Your cart is empty.",
        }
    }
}

/// Overlay transition rejected by the step machine.
///
/// These are silent: the control that would trigger them is disabled or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// The overlay is closed.
    #[error("Overlay is closed")]
    OverlayClosed,

    /// The payment step needs at least one item in the cart.
    #[error("Cannot enter payment with an empty cart")]
    EmptyCart,

    /// The confirmation step needs a completed checkout.
    #[error("No completed checkout to show")]
    NoConfirmation,

    /// Payment methods can only be chosen on the payment step.
    #[error("Not on the payment step")]
    NotOnPaymentStep,

    /// A payment is already being processed.
    #[error("Payment already processing")]
    AlreadyProcessing,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_notices() {
        assert_eq!(
            CheckoutError::NoPaymentMethodSelected.notice(),
            "Please select a payment method first."
        );
        assert_eq!(CheckoutError::EmptyCart.notice(), "Your cart is empty.");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: quota exceeded");

        let err = StoreError::InvalidKey("../cart".to_string());
        assert_eq!(err.to_string(), "Invalid storage key: \"../cart\"");
    }

    #[test]
    fn test_persisted_data_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PersistedDataError::from(json_err);
        assert!(matches!(err, PersistedDataError::Unparseable(_)));
    }
}
