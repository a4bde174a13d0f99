//! Integration tests for the Dispaso cart widget.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dispaso-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_session` - Cart mutations through the controller
//! - `checkout_flow` - Overlay steps and the payment processing delay
//! - `persistence` - File-backed carts across sessions
//! - `page_events` - Page events bound and dispatched end to end

use std::path::Path;
use std::time::Duration;

use dispaso_storefront::binder::{Binding, Element, UiEvent, bind};
use dispaso_storefront::store::FileStore;
use dispaso_storefront::{CartController, RecordingHost, WidgetConfig};
use tempfile::TempDir;

/// A controller on a throwaway cart directory, with a recording host attached.
pub struct TestContext {
    pub controller: CartController<FileStore>,
    pub host: RecordingHost,
    pub dir: TempDir,
}

impl TestContext {
    /// Fresh session on an empty cart directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let (controller, host) = session_in(dir.path());
        Self {
            controller,
            host,
            dir,
        }
    }

    /// Start a new session on the same cart directory, like a page reload.
    #[must_use]
    pub fn reload(self) -> Self {
        let (controller, host) = session_in(self.dir.path());
        drop(self.controller);
        Self {
            controller,
            host,
            dir: self.dir,
        }
    }

    /// Bind a page event and dispatch it. Returns the binding.
    pub fn fire(&mut self, event: &UiEvent) -> Binding {
        let binding = bind(event);
        if let Binding::Dispatch(action) = &binding {
            self.controller.dispatch(action.clone());
        }
        binding
    }

    /// Click the add-to-cart button of a product card.
    pub fn click_add(&mut self, id: &str, name: &str, price: &str) -> Binding {
        self.fire(&UiEvent::Click {
            path: vec![
                Element::new().class("add-to-cart"),
                Element::new()
                    .class("product-card")
                    .attr("data-id", id)
                    .attr("data-name", name)
                    .attr("data-price", price),
            ],
        })
    }

    /// Click a control (`inc`, `dec`, `remove`) in the cart row for `id`.
    pub fn click_row(&mut self, id: &str, control: &str) -> Binding {
        self.fire(&UiEvent::Click {
            path: vec![
                Element::new().attr("data-action", control),
                Element::new().class("quantity-control"),
                Element::new().class("cart-item").attr("data-id", id),
                Element::new().id("cart-list"),
            ],
        })
    }

    /// Click an element by id.
    pub fn click_id(&mut self, id: &str) -> Binding {
        self.fire(&UiEvent::click(Element::new().id(id)))
    }

    /// Click a payment method button.
    pub fn click_payment(&mut self, method: &str, card_type: Option<&str>) -> Binding {
        let mut button = Element::new()
            .class("payment-method-btn")
            .attr("data-method", method);
        if let Some(card_type) = card_type {
            button = button.attr("data-type", card_type);
        }
        self.fire(&UiEvent::click(button))
    }

    /// Submit a payment form.
    pub fn submit(&mut self, form_id: &str) -> Binding {
        self.fire(&UiEvent::Submit {
            form_id: form_id.to_string(),
        })
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Test configuration rooted at `dir`.
#[must_use]
pub fn test_config(dir: &Path) -> WidgetConfig {
    WidgetConfig {
        cart_dir: dir.to_path_buf(),
        processing_delay: Duration::from_millis(600),
        feedback_duration: Duration::from_millis(2000),
        ..WidgetConfig::default()
    }
}

fn session_in(dir: &Path) -> (CartController<FileStore>, RecordingHost) {
    let config = test_config(dir);
    let mut controller = CartController::new(FileStore::new(dir), config);
    let host = RecordingHost::new();
    controller.subscribe(host.clone());
    (controller, host)
}
