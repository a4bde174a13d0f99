//! Checkout command.
//!
//! Walks the overlay the way a shopper would: open, continue to payment,
//! pick a method, submit, then wait out the processing delay.

use dispaso_core::{OverlayStep, PaymentSelection};
use dispaso_storefront::Action;
use dispaso_storefront::error::CheckoutError;
use tracing::info;

use super::Session;
use crate::error::CliError;
use crate::output;

/// Pay for the cart with `method` (and `card_type` for cards).
pub async fn run(
    session: &mut Session,
    method: &str,
    card_type: Option<&str>,
) -> Result<(), CliError> {
    let selection = PaymentSelection::from_tokens(method, card_type)
        .ok_or_else(|| CliError::UnknownPaymentMethod(method.to_owned()))?;

    let controller = &mut session.controller;
    controller.dispatch(Action::OpenOverlay);
    controller.dispatch(Action::ContinueToPayment);
    if controller.state().overlay().step() != OverlayStep::Payment {
        return Err(CliError::CheckoutRejected(
            CheckoutError::EmptyCart.notice().to_string(),
        ));
    }

    controller.dispatch(Action::SelectPayment(selection));
    controller.dispatch(Action::SubmitPayment);

    if controller.is_processing() {
        info!(payment = %selection, "Processing payment...");
        controller.wait_for_processing().await;
    }

    let view = controller.view();
    match view.overlay.confirmation {
        Some(confirmation) if controller.state().overlay().step() == OverlayStep::Done => {
            output::print_confirmation(&confirmation);
            controller.dispatch(Action::CloseOverlay);
            Ok(())
        }
        _ => {
            let notice = session
                .recorder
                .notices()
                .pop()
                .unwrap_or_else(|| "payment did not complete".to_string());
            Err(CliError::CheckoutRejected(notice))
        }
    }
}
