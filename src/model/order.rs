//! A customer order as supplied by the order feed.
//!
//! The pipeline reads orders but never edits their content; only the status is pushed
//! forward when a bump exhausts the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders. Assigned by the feed, globally unique, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
    Delivery,
}

/// Order lifecycle. `Pending` through `Ready` are the kitchen statuses; `Completed` and
/// `Cancelled` are reached outside the kitchen and take the order out of the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status is shown in the kitchen.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing | OrderStatus::Ready
        )
    }

    /// One step along `pending -> confirmed -> preparing -> ready`, clamped at `Ready`.
    /// Terminal statuses stay where they are.
    pub fn advanced(self) -> Self {
        match self {
            OrderStatus::Pending => OrderStatus::Confirmed,
            OrderStatus::Confirmed => OrderStatus::Preparing,
            OrderStatus::Preparing | OrderStatus::Ready => OrderStatus::Ready,
            terminal => terminal,
        }
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Ready => 3,
            OrderStatus::Completed | OrderStatus::Cancelled => 4,
        }
    }

    /// The further along of two statuses.
    pub fn furthest(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            size: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub order_type: OrderType,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    pub total: f64,
}

impl Order {
    /// Creates a pending dine-in order whose total is the sum of its lines.
    pub fn new(
        id: impl Into<OrderId>,
        customer_name: impl Into<String>,
        items: Vec<OrderItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let total = items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            order_type: OrderType::default(),
            items,
            status: OrderStatus::Pending,
            created_at,
            notes: None,
            total,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }
}
