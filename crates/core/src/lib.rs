//! RetroPost Core - Shared types library.
//!
//! This crate provides common types used across all RetroPost components:
//! - `server` - Compositor, dispatcher and the HTTP API (including the hosted
//!   postcard function)
//! - `cli` - The client: renders and sends postcards, owns the local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP clients,
//! no storage. Cart and order bookkeeping live here because they are plain
//! value transformations; persisting them is the client's concern.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, colors and statuses
//! - [`template`] - Catalog entries
//! - [`customization`] - Per-postcard personalization
//! - [`cart`] - Cart items and cart operations
//! - [`order`] - Orders created from a cart
//! - [`preferences`] - Theme and language preferences
//! - [`messages`] - Localized user-facing strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod customization;
pub mod messages;
pub mod order;
pub mod preferences;
pub mod template;
pub mod types;

pub use cart::{Cart, CartError, CartItem};
pub use customization::{Customization, FontFamily};
pub use order::{CustomerInfo, Order};
pub use preferences::{Language, Preferences, Theme};
pub use template::Template;
pub use types::*;
