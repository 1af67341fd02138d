use crate::domain::{deserialize_id, deserialize_opt_id};
use serde::{Deserialize, Serialize};
use shared::errors::ClientError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Paid,
    Scheduled,
    Confirmed,
    Canceled,
    Failed,
    /// Any status string this client does not know about.
    Unrecognized(String),
}

impl OrderStatus {
    /// Statuses that always appear on the dashboard histogram.
    pub const SEEDED: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Scheduled,
        OrderStatus::Confirmed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Scheduled => "Scheduled",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Failed => "Failed",
            OrderStatus::Unrecognized(raw) => raw,
        }
    }

    /// Paid or later, and not canceled.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Scheduled | OrderStatus::Confirmed
        )
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "paid" => OrderStatus::Paid,
            "scheduled" => OrderStatus::Scheduled,
            "confirmed" => OrderStatus::Confirmed,
            "canceled" | "cancelled" => OrderStatus::Canceled,
            "failed" => OrderStatus::Failed,
            _ => OrderStatus::Unrecognized(value.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        OrderStatus::from(value.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub car_model_id: i64,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Canonical order, normalized once at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
}

impl Order {
    pub fn first_car_id(&self) -> Option<i64> {
        self.items.first().map(|item| item.car_model_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemResponse {
    #[serde(alias = "car_id", deserialize_with = "deserialize_id")]
    pub car_model_id: i64,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

/// Order as sent by the orders service; revisions disagree on the id key.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    #[serde(
        default,
        alias = "_id",
        alias = "order_id",
        deserialize_with = "deserialize_opt_id"
    )]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItemResponse>,
    #[serde(default, alias = "total")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl TryFrom<OrderResponse> for Order {
    type Error = ClientError;

    fn try_from(value: OrderResponse) -> Result<Self, Self::Error> {
        let id = value
            .id
            .ok_or_else(|| ClientError::Decode("order without id".into()))?;

        let items = value
            .items
            .into_iter()
            .map(|item| {
                let raw = item.quantity.unwrap_or(1);
                let quantity = u32::try_from(raw)
                    .ok()
                    .filter(|q| *q > 0)
                    .ok_or_else(|| {
                        ClientError::Decode(format!("order {id}: invalid quantity {raw}"))
                    })?;
                Ok(OrderItem {
                    car_model_id: item.car_model_id,
                    quantity,
                    unit_price: item.unit_price.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, ClientError>>()?;

        let total_amount = value.total_amount.unwrap_or_else(|| {
            items
                .iter()
                .map(|item| item.unit_price * f64::from(item.quantity))
                .sum()
        });

        Ok(Order {
            id,
            user_id: value.user_id.unwrap_or_default(),
            items,
            total_amount,
            status: value.status.unwrap_or(OrderStatus::Pending),
        })
    }
}

/// Result of a status transition (`confirm`, `pay`).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderTransitionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub warning: Option<String>,
}
