//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod format;

use dispaso_storefront::store::FileStore;
use dispaso_storefront::{CartController, RecordingHost, WidgetConfig};

use crate::output::TerminalHost;

/// One widget session backed by the cart directory.
pub struct Session {
    pub controller: CartController<FileStore>,
    /// Records notices so commands can turn them into errors.
    pub recorder: RecordingHost,
}

impl Session {
    /// Load the persisted cart and attach the terminal.
    pub fn open(config: WidgetConfig) -> Self {
        let store = FileStore::new(&config.cart_dir);
        let mut controller = CartController::new(store, config);

        let recorder = RecordingHost::new();
        controller.subscribe(recorder.clone());
        controller.subscribe(TerminalHost);

        Self {
            controller,
            recorder,
        }
    }
}
