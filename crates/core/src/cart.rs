//! Cart items and cart operations.
//!
//! The cart is a plain value. Loading and saving it is the caller's job; the
//! client keeps it in its local store between runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::customization::Customization;
use crate::order::{CustomerInfo, Order};
use crate::template::Template;
use crate::types::{CartItemId, CurrencyCode, Price};

/// Errors from cart operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    Empty,
}

/// A personalized postcard waiting to be purchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub template: Template,
    pub customization: Customization,
    pub quantity: u32,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_data: Option<String>,
}

impl CartItem {
    /// Price of this line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// Ordered list of cart items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a postcard with quantity 1 and return the new item.
    #[allow(clippy::indexing_slicing)] // the item was pushed on the line above
    pub fn add(
        &mut self,
        template: Template,
        customization: Customization,
        front_image_data: Option<String>,
        back_image_data: Option<String>,
    ) -> &CartItem {
        let item = CartItem {
            id: CartItemId::generate(&template.id),
            price: template.effective_price(),
            template,
            customization,
            quantity: 1,
            front_image_data,
            back_image_data,
        };
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Remove an item. Returns whether anything was removed.
    pub fn remove(&mut self, id: &CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Set an item's quantity. Zero removes the item; unknown IDs are ignored.
    ///
    /// Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(id);
        }
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * quantity` over all items.
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or_else(CurrencyCode::default, |item| item.price.currency_code);
        self.items
            .iter()
            .fold(Price::zero(currency), |acc, item| acc + item.line_total())
    }

    /// Sum of quantities, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Turn the cart into a pending order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] if the cart has no items.
    pub fn checkout(&mut self, customer: CustomerInfo) -> Result<Order, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let total = self.total();
        let items = std::mem::take(&mut self.items);
        Ok(Order::new(items, total, customer))
    }
}
