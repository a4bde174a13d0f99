//! CLI error type.

use dispaso_storefront::config::ConfigError;
use thiserror::Error;

/// Errors that end a CLI invocation with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The environment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// The product id is not in the cart.
    #[error("No {0:?} in the cart")]
    NotInCart(String),

    /// The product id is empty.
    #[error("Product id must not be empty")]
    EmptyProductId,

    /// The payment method is not one the page offers.
    #[error("Unknown payment method: {0}. Valid methods: card, upi, qr, paypal")]
    UnknownPaymentMethod(String),

    /// Checkout was refused with a notice.
    #[error("Checkout rejected: {0}")]
    CheckoutRejected(String),
}
