//! Dispaso cart widget.
//!
//! The cart and checkout overlay for the Dispaso product page, as a library
//! so it can be driven from the page, the CLI and tests alike.
//!
//! # Architecture
//!
//! ```text
//! UiEvent ──bind──► Action ──reduce──► WidgetState + Vec<Effect>
//!                                             │
//!                   CartController runs effects in order:
//!                   Persist → KeyValueStore, Render → WidgetHost,
//!                   ScheduleProcessing → tokio timer → ProcessingFinished
//! ```
//!
//! # Modules
//!
//! - [`cart`] - Cart lines, quantities, totals and persistence
//! - [`checkout`] - Overlay step machine and payment processing tickets
//! - [`reducer`] - Pure `(state, action) → effects` transitions
//! - [`controller`] - Session owner that executes effects
//! - [`binder`] - Page events to actions
//! - [`render`] - View models and askama templates
//! - [`store`] - Key-value persistence adapters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod action;
pub mod binder;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod host;
pub mod reducer;
pub mod render;
pub mod store;

pub use action::{Action, Effect};
pub use cart::{AddRequest, Cart, CartItem};
pub use config::WidgetConfig;
pub use controller::CartController;
pub use host::{RecordingHost, WidgetHost};
