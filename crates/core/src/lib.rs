//! Dispaso Core - Shared types library.
//!
//! This crate provides common types used across all Dispaso components:
//! - `storefront` - The cart widget controller, store adapters and renderer
//! - `cli` - Command-line driver for the widget
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no timers. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices, checkout steps and payment selections
//! - [`input`] - Display formatters for card-number and expiry input fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod input;
pub mod types;

pub use types::*;
