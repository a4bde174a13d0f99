//! The cart widget controller.
//!
//! Owns the widget state, the store and the page hosts. Every change goes
//! through [`CartController::dispatch`], which runs the reducer and then
//! executes the returned effects in order. The only asynchronous work is the
//! payment processing delay: a tokio task that reports back over a channel
//! and is aborted whenever the run is abandoned.

use chrono::Utc;
use dispaso_core::OrderReference;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::action::{Action, Effect};
use crate::cart::Cart;
use crate::checkout::ProcessingTicket;
use crate::config::WidgetConfig;
use crate::fallback::ItemDefaults;
use crate::host::WidgetHost;
use crate::reducer::{WidgetState, reduce};
use crate::render::{HtmlFragments, WidgetView, render_html};
use crate::store::KeyValueStore;

/// A scheduled payment run.
struct PendingRun {
    ticket: ProcessingTicket,
    handle: JoinHandle<()>,
}

/// Drives one widget session.
pub struct CartController<S: KeyValueStore> {
    store: S,
    config: WidgetConfig,
    state: WidgetState,
    hosts: Vec<Box<dyn WidgetHost>>,
    pending: Option<PendingRun>,
    completions_tx: mpsc::UnboundedSender<ProcessingTicket>,
    completions_rx: mpsc::UnboundedReceiver<ProcessingTicket>,
}

impl<S: KeyValueStore> CartController<S> {
    /// Start a session, loading the persisted cart from `store`.
    #[instrument(skip_all, fields(key = %config.storage_key))]
    pub fn new(store: S, config: WidgetConfig) -> Self {
        let defaults = ItemDefaults::new(&config.image_dir);
        let cart = Cart::load(&store, &config.storage_key, &defaults);
        info!(
            lines = cart.len(),
            items = cart.item_count(),
            "Cart loaded"
        );

        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            store,
            config,
            state: WidgetState::new(cart, defaults),
            hosts: Vec::new(),
            pending: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Register a host and draw the current state on it.
    pub fn subscribe(&mut self, mut host: impl WidgetHost + 'static) {
        host.render(&self.view());
        self.hosts.push(Box::new(host));
    }

    #[must_use]
    pub const fn state(&self) -> &WidgetState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Whether a payment run is scheduled and not yet finished.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.pending.is_some()
    }

    /// Project the current state for display.
    #[must_use]
    pub fn view(&self) -> WidgetView {
        WidgetView::project(&self.state, self.config.currency)
    }

    /// Render the current state as HTML fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    pub fn render_html(&self) -> askama::Result<HtmlFragments> {
        render_html(&self.view())
    }

    /// Apply `action` and run its effects.
    #[instrument(skip_all, fields(action = action.kind()))]
    pub fn dispatch(&mut self, action: Action) {
        let effects = reduce(&mut self.state, action);
        debug!(effects = effects.len(), "Action applied");
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Deliver any processing runs that have already finished, without
    /// waiting. Returns how many completions were delivered.
    pub fn poll_completions(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(ticket) = self.completions_rx.try_recv() {
            self.complete(ticket);
            delivered += 1;
        }
        delivered
    }

    /// Wait for the scheduled payment run to finish and deliver it.
    ///
    /// Returns `false` straight away if nothing is scheduled.
    pub async fn wait_for_processing(&mut self) -> bool {
        let Some(expected) = self.pending.as_ref().map(|run| run.ticket) else {
            return false;
        };
        while let Some(ticket) = self.completions_rx.recv().await {
            self.complete(ticket);
            if ticket == expected {
                return true;
            }
        }
        false
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Persist => {
                self.state
                    .cart()
                    .save(&self.store, &self.config.storage_key);
            }
            Effect::Render => {
                let view = self.view();
                for host in &mut self.hosts {
                    host.render(&view);
                }
            }
            Effect::Notice(message) => {
                for host in &mut self.hosts {
                    host.notice(message);
                }
            }
            Effect::AddedFeedback(name) => {
                let message = format!("Added {name} to cart!");
                for host in &mut self.hosts {
                    host.feedback(&message, self.config.feedback_duration);
                }
            }
            Effect::PulseBadge => {
                for host in &mut self.hosts {
                    host.pulse_badge();
                }
            }
            Effect::ScheduleProcessing(ticket) => self.schedule(ticket),
            Effect::CancelProcessing(ticket) => self.cancel(ticket),
        }
    }

    fn schedule(&mut self, ticket: ProcessingTicket) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                ticket = ticket.as_u64(),
                "No async runtime, completing payment without delay"
            );
            self.finish(ticket);
            return;
        };

        let tx = self.completions_tx.clone();
        let delay = self.config.processing_delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver lives as long as the controller.
            let _ = tx.send(ticket);
        });

        if let Some(previous) = self.pending.replace(PendingRun { ticket, handle }) {
            previous.handle.abort();
        }
        debug!(ticket = ticket.as_u64(), delay_ms = delay.as_millis(), "Payment processing scheduled");
    }

    fn cancel(&mut self, ticket: ProcessingTicket) {
        match self.pending.take() {
            Some(run) if run.ticket == ticket => {
                run.handle.abort();
                info!(ticket = ticket.as_u64(), "Payment processing cancelled");
            }
            other => self.pending = other,
        }
    }

    /// A run reported back from its timer.
    fn complete(&mut self, ticket: ProcessingTicket) {
        if self.pending.as_ref().is_some_and(|run| run.ticket == ticket) {
            self.pending = None;
        }
        self.finish(ticket);
    }

    fn finish(&mut self, ticket: ProcessingTicket) {
        let in_flight = self.state.overlay().processing() == Some(ticket);
        self.dispatch(Action::ProcessingFinished {
            ticket,
            reference: OrderReference::generate(),
            placed_at: Utc::now(),
        });
        if !in_flight {
            return;
        }

        if let Some(confirmation) = self.state.overlay().confirmation() {
            info!(
                reference = %confirmation.reference,
                items = confirmation.item_count,
                total = %confirmation.total,
                payment = %confirmation.payment,
                "Checkout completed"
            );
        }
    }
}

impl<S: KeyValueStore> Drop for CartController<S> {
    fn drop(&mut self) {
        if let Some(run) = self.pending.take() {
            run.handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use dispaso_core::{OverlayStep, PaymentSelection};

    use super::*;
    use crate::cart::AddRequest;
    use crate::host::{HostEvent, RecordingHost};
    use crate::store::{MemoryStore, UnavailableStore};

    fn config() -> WidgetConfig {
        WidgetConfig {
            processing_delay: Duration::from_millis(600),
            ..WidgetConfig::default()
        }
    }

    fn add(id: &str, price: &str) -> Action {
        Action::AddToCart(AddRequest::new(id).name(id).price(price))
    }

    fn submit_upi<S: KeyValueStore>(controller: &mut CartController<S>) {
        for action in [
            Action::OpenOverlay,
            Action::ContinueToPayment,
            Action::SelectPayment(PaymentSelection::Upi),
            Action::SubmitPayment,
        ] {
            controller.dispatch(action);
        }
    }

    #[test]
    fn test_persists_every_mutation() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = CartController::new(Arc::clone(&store), config());
        controller.dispatch(add("energy-rush", "10"));

        let raw = store.read("dispasoCart").unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["id"], "energy-rush");
        assert_eq!(json[0]["price"], 10.0);
        assert_eq!(json[0]["quantity"], 1);

        controller.dispatch(Action::Remove("energy-rush".into()));
        assert_eq!(store.read("dispasoCart").as_deref(), Some("[]"));
    }

    #[test]
    fn test_loads_persisted_cart() {
        let store = MemoryStore::with_entry(
            "dispasoCart",
            r#"[{"id":"a","name":"A","price":10,"quantity":2,"image":"x.png"}]"#,
        );
        let controller = CartController::new(store, config());
        assert_eq!(controller.state().cart().item_count(), 2);
    }

    #[test]
    fn test_unavailable_store_keeps_session_in_memory() {
        let mut controller = CartController::new(UnavailableStore, config());
        controller.dispatch(add("a", "5"));
        controller.dispatch(add("a", "5"));
        assert_eq!(controller.state().cart().item_count(), 2);
    }

    #[test]
    fn test_hosts_receive_effects() {
        let host = RecordingHost::new();
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.subscribe(host.clone());
        host.clear();

        controller.dispatch(add("energy-rush", "10"));
        let events = host.events();
        assert!(matches!(events[0], HostEvent::Render(_)));
        assert_eq!(events[1], HostEvent::PulseBadge);
        assert_eq!(
            events[2],
            HostEvent::Feedback {
                message: "Added energy-rush to cart!".to_string(),
                duration: Duration::from_millis(2000),
            }
        );
        assert_eq!(host.last_view().unwrap().badge.count, 1);
    }

    #[test]
    fn test_notice_reaches_host() {
        let host = RecordingHost::new();
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.subscribe(host.clone());
        for action in [
            add("a", "1"),
            Action::OpenOverlay,
            Action::ContinueToPayment,
            Action::SubmitPayment,
        ] {
            controller.dispatch(action);
        }
        assert_eq!(host.notices(), vec!["Please select a payment method first."]);
    }

    #[test]
    fn test_without_runtime_completes_immediately() {
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.dispatch(add("a", "10"));
        submit_upi(&mut controller);

        assert!(!controller.is_processing());
        assert!(controller.state().cart().is_empty());
        assert_eq!(controller.state().overlay().step(), OverlayStep::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_completes_after_delay() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = CartController::new(Arc::clone(&store), config());
        controller.dispatch(add("a", "10"));
        submit_upi(&mut controller);

        assert!(controller.is_processing());
        assert_eq!(controller.poll_completions(), 0);
        assert_eq!(controller.state().cart().item_count(), 1);

        assert!(controller.wait_for_processing().await);
        assert!(controller.state().cart().is_empty());
        assert_eq!(controller.state().overlay().step(), OverlayStep::Done);
        assert_eq!(store.read("dispasoCart").as_deref(), Some("[]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_overlay_cancels_processing() {
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.dispatch(add("a", "10"));
        submit_upi(&mut controller);
        controller.dispatch(Action::CloseOverlay);

        assert!(!controller.is_processing());
        assert!(!controller.wait_for_processing().await);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(controller.poll_completions(), 0);
        assert_eq!(controller.state().cart().item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cart_change_cancels_processing() {
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.dispatch(add("a", "10"));
        submit_upi(&mut controller);
        controller.dispatch(add("b", "5"));

        assert!(!controller.is_processing());
        tokio::time::sleep(Duration::from_secs(5)).await;
        controller.poll_completions();
        assert_eq!(controller.state().cart().item_count(), 2);
        assert_eq!(controller.state().overlay().step(), OverlayStep::Payment);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_after_delay_delivers_completion() {
        let mut controller = CartController::new(MemoryStore::new(), config());
        controller.dispatch(add("a", "10"));
        submit_upi(&mut controller);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(controller.poll_completions(), 1);
        assert!(controller.state().cart().is_empty());
    }
}
