//! Pure state transitions for the widget.
//!
//! [`reduce`] applies one [`Action`] to a [`WidgetState`] and returns the
//! effects the controller must run, in order. It performs no I/O and reads
//! no clock; timestamps and order references arrive inside the action.

use dispaso_core::OverlayStep;
use tracing::debug;

use crate::action::{Action, Effect};
use crate::cart::{AddOutcome, Cart, QuantityChange};
use crate::checkout::{Confirmation, Overlay, ProcessingTicket};
use crate::error::CheckoutError;
use crate::fallback::ItemDefaults;

/// Everything the widget knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    cart: Cart,
    overlay: Overlay,
    next_ticket: ProcessingTicket,
    defaults: ItemDefaults,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new(Cart::new(), ItemDefaults::default())
    }
}

impl WidgetState {
    /// State for a session that starts with `cart` and a closed overlay.
    #[must_use]
    pub fn new(cart: Cart, defaults: ItemDefaults) -> Self {
        Self {
            cart,
            overlay: Overlay::new(),
            next_ticket: ProcessingTicket::new(1),
            defaults,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub const fn defaults(&self) -> &ItemDefaults {
        &self.defaults
    }

    fn issue_ticket(&mut self) -> ProcessingTicket {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        ticket
    }

    /// Effects common to every cart mutation. A payment run in flight is
    /// abandoned first so it cannot clear the changed cart.
    fn cart_changed(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(3);
        if let Some(ticket) = self.overlay.cancel_processing() {
            effects.push(Effect::CancelProcessing(ticket));
        }
        effects.push(Effect::Persist);
        effects.push(Effect::Render);
        effects
    }

    fn switch_step(&mut self, step: OverlayStep) -> Vec<Effect> {
        match self.overlay.switch_to(step, self.cart.is_empty()) {
            Ok(abandoned) => abandoned
                .map(Effect::CancelProcessing)
                .into_iter()
                .chain([Effect::Render])
                .collect(),
            Err(e) => {
                debug!(step = %step, reason = %e, "Step change rejected");
                Vec::new()
            }
        }
    }

    fn submit_payment(&mut self) -> Vec<Effect> {
        if !self.overlay.is_open() || self.overlay.step() != OverlayStep::Payment {
            debug!("Ignoring payment submit outside the payment step");
            return Vec::new();
        }
        if let Some(ticket) = self.overlay.processing() {
            debug!(ticket = ticket.as_u64(), "Ignoring payment submit while processing");
            return Vec::new();
        }

        match self.overlay.validate_submit(self.cart.is_empty()) {
            Err(e @ CheckoutError::NoPaymentMethodSelected) => vec![Effect::Notice(e.notice())],
            Err(e @ CheckoutError::EmptyCart) => {
                self.overlay.return_to_cart();
                vec![Effect::Notice(e.notice()), Effect::Render]
            }
            Ok(selection) => {
                let ticket = self.issue_ticket();
                match self.overlay.begin_processing(ticket) {
                    Ok(()) => {
                        debug!(ticket = ticket.as_u64(), payment = %selection, "Payment processing started");
                        vec![Effect::Render, Effect::ScheduleProcessing(ticket)]
                    }
                    Err(e) => {
                        debug!(reason = %e, "Payment processing not started");
                        Vec::new()
                    }
                }
            }
        }
    }
}

/// Apply `action` to `state`, returning the effects to run.
#[must_use]
pub fn reduce(state: &mut WidgetState, action: Action) -> Vec<Effect> {
    match action {
        Action::AddToCart(request) => match state.cart.add(&request, &state.defaults) {
            AddOutcome::Ignored => {
                debug!("Ignoring add-to-cart without a product id");
                Vec::new()
            }
            AddOutcome::Inserted { name } | AddOutcome::Incremented { name, .. } => {
                let mut effects = state.cart_changed();
                effects.push(Effect::PulseBadge);
                effects.push(Effect::AddedFeedback(name));
                effects
            }
        },

        Action::Remove(id) => {
            if state.cart.remove(&id) {
                state.cart_changed()
            } else {
                Vec::new()
            }
        }

        Action::Increment(id) => quantity_changed(state, &id, 1),
        Action::Decrement(id) => quantity_changed(state, &id, -1),

        Action::OpenOverlay => {
            if state.overlay.is_open() {
                return Vec::new();
            }
            state
                .overlay
                .open()
                .map(Effect::CancelProcessing)
                .into_iter()
                .chain([Effect::Render])
                .collect()
        }

        Action::CloseOverlay => {
            if !state.overlay.is_open() {
                return Vec::new();
            }
            state
                .overlay
                .close()
                .map(Effect::CancelProcessing)
                .into_iter()
                .chain([Effect::Render])
                .collect()
        }

        Action::SwitchStep(step) => state.switch_step(step),
        Action::ContinueToPayment => state.switch_step(OverlayStep::Payment),

        Action::SelectPayment(selection) => match state.overlay.select_payment(selection) {
            Ok(()) => vec![Effect::Render],
            Err(e) => {
                debug!(payment = %selection, reason = %e, "Payment selection rejected");
                Vec::new()
            }
        },

        Action::SubmitPayment => state.submit_payment(),

        Action::ProcessingFinished {
            ticket,
            reference,
            placed_at,
        } => {
            let (Some(payment), Some(current)) =
                (state.overlay.selection(), state.overlay.processing())
            else {
                debug!(ticket = ticket.as_u64(), "Ignoring completion with nothing in flight");
                return Vec::new();
            };
            if current != ticket {
                debug!(
                    ticket = ticket.as_u64(),
                    current = current.as_u64(),
                    "Ignoring stale payment completion"
                );
                return Vec::new();
            }

            let confirmation = Confirmation {
                reference,
                placed_at,
                payment,
                item_count: state.cart.item_count(),
                total: state.cart.total(),
            };
            if !state.overlay.finish_processing(ticket, confirmation) {
                return Vec::new();
            }
            state.cart.clear();
            vec![Effect::Persist, Effect::Render]
        }
    }
}

fn quantity_changed(state: &mut WidgetState, id: &str, delta: i64) -> Vec<Effect> {
    match state.cart.change_quantity(id, delta) {
        QuantityChange::Missing => Vec::new(),
        QuantityChange::Updated(_) | QuantityChange::Removed => state.cart_changed(),
    }
}
