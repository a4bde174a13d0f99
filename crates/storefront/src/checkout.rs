//! Checkout overlay step machine.
//!
//! ```text
//!            continue (cart non-empty)          payment finished
//!   ┌──────┐ ─────────────────────────► ┌─────────┐ ───────────► ┌──────┐
//!   │ cart │                            │ payment │              │ done │
//!   └──────┘ ◄───────────────────────── └─────────┘              └──────┘
//!       ▲          tab / close / empty cart                          │
//!       └────────────────────────────────────────────────────────────┘
//!                              tab / close
//! ```
//!
//! Entering `payment` from another step clears the payment selection. Closing the
//! overlay resets everything: step, selection, in-flight processing and
//! the last confirmation.

use chrono::{DateTime, Utc};
use dispaso_core::{OrderReference, OverlayStep, PaymentSelection};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CheckoutError, StepError};

/// Identifies one scheduled payment-processing run.
///
/// A completion is only honoured if it carries the ticket of the run that is
/// still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProcessingTicket(u64);

impl ProcessingTicket {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The ticket after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Summary of a completed checkout, shown on the `done` panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub reference: OrderReference,
    pub placed_at: DateTime<Utc>,
    pub payment: PaymentSelection,
    pub item_count: u64,
    pub total: Decimal,
}

/// State of the checkout overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    open: bool,
    step: OverlayStep,
    selection: Option<PaymentSelection>,
    processing: Option<ProcessingTicket>,
    confirmation: Option<Confirmation>,
}

impl Overlay {
    /// A closed overlay on the cart step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn step(&self) -> OverlayStep {
        self.step
    }

    #[must_use]
    pub const fn selection(&self) -> Option<PaymentSelection> {
        self.selection
    }

    /// The payment run in flight, if any.
    #[must_use]
    pub const fn processing(&self) -> Option<ProcessingTicket> {
        self.processing
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Title of the card form for the current selection.
    #[must_use]
    pub fn card_form_title(&self) -> Option<&'static str> {
        self.selection
            .and_then(PaymentSelection::card_kind)
            .map(dispaso_core::CardKind::form_title)
    }

    /// Open the overlay on the cart step. Returns any processing run abandoned
    /// by the move back to the cart.
    pub fn open(&mut self) -> Option<ProcessingTicket> {
        self.open = true;
        self.switch_unchecked(OverlayStep::Cart)
    }

    /// Close the overlay and reset it. Returns the processing run it abandoned.
    pub fn close(&mut self) -> Option<ProcessingTicket> {
        let abandoned = self.processing.take();
        *self = Self::default();
        abandoned
    }

    /// Move to `step`, enforcing the transition guards.
    ///
    /// Leaving `payment` abandons any processing run; the abandoned ticket is
    /// returned in `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `StepError` if the overlay is closed, if `payment` is requested
    /// with an empty cart, or if `done` is requested without a confirmation.
    pub fn switch_to(
        &mut self,
        step: OverlayStep,
        cart_is_empty: bool,
    ) -> Result<Option<ProcessingTicket>, StepError> {
        if !self.open {
            return Err(StepError::OverlayClosed);
        }
        match step {
            OverlayStep::Payment if cart_is_empty => return Err(StepError::EmptyCart),
            OverlayStep::Done if self.confirmation.is_none() => {
                return Err(StepError::NoConfirmation);
            }
            _ => {}
        }
        Ok(self.switch_unchecked(step))
    }

    /// Choose a payment method. Only valid on the payment step.
    ///
    /// # Errors
    ///
    /// Returns `StepError` if the overlay is closed, not on the payment step,
    /// or already processing a payment.
    pub fn select_payment(&mut self, selection: PaymentSelection) -> Result<(), StepError> {
        if !self.open {
            return Err(StepError::OverlayClosed);
        }
        if self.step != OverlayStep::Payment {
            return Err(StepError::NotOnPaymentStep);
        }
        if self.processing.is_some() {
            return Err(StepError::AlreadyProcessing);
        }
        self.selection = Some(selection);
        Ok(())
    }

    /// Check whether a submit may proceed.
    ///
    /// # Errors
    ///
    /// Returns `NoPaymentMethodSelected` before `EmptyCart`, matching the
    /// order the shopper sees the notices.
    pub fn validate_submit(&self, cart_is_empty: bool) -> Result<PaymentSelection, CheckoutError> {
        let selection = self
            .selection
            .ok_or(CheckoutError::NoPaymentMethodSelected)?;
        if cart_is_empty {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(selection)
    }

    /// Mark `ticket` as the payment run in flight.
    ///
    /// # Errors
    ///
    /// Returns `StepError` if not on an open payment step or a run is already
    /// in flight.
    pub fn begin_processing(&mut self, ticket: ProcessingTicket) -> Result<(), StepError> {
        if !self.open {
            return Err(StepError::OverlayClosed);
        }
        if self.step != OverlayStep::Payment {
            return Err(StepError::NotOnPaymentStep);
        }
        if self.processing.is_some() {
            return Err(StepError::AlreadyProcessing);
        }
        self.processing = Some(ticket);
        Ok(())
    }

    /// Abandon the run in flight, if any.
    pub fn cancel_processing(&mut self) -> Option<ProcessingTicket> {
        self.processing.take()
    }

    /// Finish run `ticket` and show `confirmation`.
    ///
    /// Returns `false` (and changes nothing) for a stale ticket.
    pub fn finish_processing(
        &mut self,
        ticket: ProcessingTicket,
        confirmation: Confirmation,
    ) -> bool {
        if self.processing != Some(ticket) {
            return false;
        }
        self.processing = None;
        self.confirmation = Some(confirmation);
        self.switch_unchecked(OverlayStep::Done);
        true
    }

    /// Force the cart step, e.g. after an empty-cart submit.
    pub fn return_to_cart(&mut self) -> Option<ProcessingTicket> {
        self.switch_unchecked(OverlayStep::Cart)
    }

    fn switch_unchecked(&mut self, step: OverlayStep) -> Option<ProcessingTicket> {
        if step == self.step {
            return None;
        }
        let abandoned = self.processing.take();
        if step == OverlayStep::Payment {
            self.selection = None;
        }
        self.step = step;
        abandoned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dispaso_core::CardKind;

    use super::*;

    fn confirmation() -> Confirmation {
        Confirmation {
            reference: OrderReference::generate(),
            placed_at: Utc::now(),
            payment: PaymentSelection::Upi,
            item_count: 1,
            total: Decimal::new(10, 0),
        }
    }

    fn on_payment() -> Overlay {
        let mut overlay = Overlay::new();
        overlay.open();
        overlay.switch_to(OverlayStep::Payment, false).unwrap();
        overlay
    }

    #[test]
    fn test_opens_on_cart_step() {
        let mut overlay = Overlay::new();
        assert!(!overlay.is_open());
        overlay.open();
        assert!(overlay.is_open());
        assert_eq!(overlay.step(), OverlayStep::Cart);
    }

    #[test]
    fn test_payment_rejected_when_cart_empty() {
        let mut overlay = Overlay::new();
        overlay.open();
        assert_eq!(
            overlay.switch_to(OverlayStep::Payment, true),
            Err(StepError::EmptyCart)
        );
        assert_eq!(overlay.step(), OverlayStep::Cart);
    }

    #[test]
    fn test_transitions_rejected_when_closed() {
        let mut overlay = Overlay::new();
        assert_eq!(
            overlay.switch_to(OverlayStep::Payment, false),
            Err(StepError::OverlayClosed)
        );
    }

    #[test]
    fn test_done_requires_confirmation() {
        let mut overlay = Overlay::new();
        overlay.open();
        assert_eq!(
            overlay.switch_to(OverlayStep::Done, false),
            Err(StepError::NoConfirmation)
        );
    }

    #[test]
    fn test_entering_payment_resets_selection() {
        let mut overlay = on_payment();
        overlay.select_payment(PaymentSelection::Qr).unwrap();

        overlay.switch_to(OverlayStep::Cart, false).unwrap();
        overlay.switch_to(OverlayStep::Payment, false).unwrap();
        assert_eq!(overlay.selection(), None);
    }

    #[test]
    fn test_select_payment_keeps_step_and_sets_title() {
        let mut overlay = on_payment();
        overlay
            .select_payment(PaymentSelection::Card(CardKind::Debit))
            .unwrap();

        assert_eq!(overlay.step(), OverlayStep::Payment);
        assert_eq!(overlay.card_form_title(), Some("Debit Card Details"));

        overlay.select_payment(PaymentSelection::Paypal).unwrap();
        assert_eq!(overlay.card_form_title(), None);
    }

    #[test]
    fn test_select_payment_outside_payment_step() {
        let mut overlay = Overlay::new();
        overlay.open();
        assert_eq!(
            overlay.select_payment(PaymentSelection::Upi),
            Err(StepError::NotOnPaymentStep)
        );
    }

    #[test]
    fn test_validate_submit_order() {
        let overlay = on_payment();
        assert_eq!(
            overlay.validate_submit(true),
            Err(CheckoutError::NoPaymentMethodSelected)
        );

        let mut overlay = on_payment();
        overlay.select_payment(PaymentSelection::Upi).unwrap();
        assert_eq!(overlay.validate_submit(true), Err(CheckoutError::EmptyCart));
        assert_eq!(overlay.validate_submit(false), Ok(PaymentSelection::Upi));
    }

    #[test]
    fn test_finish_processing_moves_to_done() {
        let mut overlay = on_payment();
        let ticket = ProcessingTicket::new(1);
        overlay.begin_processing(ticket).unwrap();

        assert!(overlay.finish_processing(ticket, confirmation()));
        assert_eq!(overlay.step(), OverlayStep::Done);
        assert!(overlay.confirmation().is_some());
        assert_eq!(overlay.processing(), None);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut overlay = on_payment();
        overlay.begin_processing(ProcessingTicket::new(2)).unwrap();

        assert!(!overlay.finish_processing(ProcessingTicket::new(1), confirmation()));
        assert_eq!(overlay.step(), OverlayStep::Payment);
    }

    #[test]
    fn test_second_run_rejected_while_processing() {
        let mut overlay = on_payment();
        overlay.begin_processing(ProcessingTicket::new(1)).unwrap();
        assert_eq!(
            overlay.begin_processing(ProcessingTicket::new(2)),
            Err(StepError::AlreadyProcessing)
        );
    }

    #[test]
    fn test_close_resets_and_reports_abandoned_run() {
        let mut overlay = on_payment();
        overlay.select_payment(PaymentSelection::Upi).unwrap();
        overlay.begin_processing(ProcessingTicket::new(7)).unwrap();

        assert_eq!(overlay.close(), Some(ProcessingTicket::new(7)));
        assert_eq!(overlay, Overlay::new());
    }

    #[test]
    fn test_leaving_payment_abandons_run() {
        let mut overlay = on_payment();
        overlay.begin_processing(ProcessingTicket::new(3)).unwrap();

        let abandoned = overlay.switch_to(OverlayStep::Cart, false).unwrap();
        assert_eq!(abandoned, Some(ProcessingTicket::new(3)));
        assert_eq!(overlay.processing(), None);
    }

    #[test]
    fn test_reentering_payment_tab_keeps_run() {
        let mut overlay = on_payment();
        overlay.begin_processing(ProcessingTicket::new(4)).unwrap();

        let abandoned = overlay.switch_to(OverlayStep::Payment, false).unwrap();
        assert_eq!(abandoned, None);
        assert_eq!(overlay.processing(), Some(ProcessingTicket::new(4)));
    }
}
