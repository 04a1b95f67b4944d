//! Orders created from a cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::{Email, OrderId, OrderStatus, Price};

/// Contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A purchase. Fields are fixed once the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartItem>,
    pub total: Price,
    pub customer_info: CustomerInfo,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a pending order.
    #[must_use]
    pub fn new(items: Vec<CartItem>, total: Price, customer_info: CustomerInfo) -> Self {
        Self {
            id: OrderId::generate(),
            items,
            total,
            customer_info,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
