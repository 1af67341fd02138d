use crate::domain::response::{
    car::CarModel,
    order::{Order, OrderStatus},
    view::{DashboardTotals, InventoryPoint, RowAction, StatusHistogram},
};

pub const CUSTOMER_CAR_PLACEHOLDER: &str = "VinFast vehicle";
pub const ADMIN_CAR_PLACEHOLDER: &str = "VinFast EV";
pub const SUPPORT_PEER_NAME: &str = "VinFast Support";

pub fn customer_placeholder(user_id: i64) -> String {
    format!("Customer #{user_id}")
}

/// Sum of `total_amount` over orders that are paid or later.
pub fn revenue(orders: &[Order]) -> f64 {
    orders
        .iter()
        .filter(|order| order.status.counts_as_revenue())
        .map(|order| order.total_amount)
        .sum()
}

pub fn totals(orders: &[Order]) -> DashboardTotals {
    DashboardTotals {
        revenue: revenue(orders),
        status_histogram: orders.iter().map(|order| &order.status).collect::<StatusHistogram>(),
    }
}

/// Button offered on an admin row.
pub fn admin_action(order: &Order, customer_name: &str) -> Option<RowAction> {
    match order.status {
        OrderStatus::Pending | OrderStatus::Paid => Some(RowAction::Schedule { order_id: order.id }),
        OrderStatus::Scheduled | OrderStatus::Confirmed => Some(RowAction::Chat {
            order_id: order.id,
            peer_name: customer_name.to_string(),
        }),
        OrderStatus::Canceled | OrderStatus::Failed | OrderStatus::Unrecognized(_) => None,
    }
}

pub fn customer_action(order: &Order) -> RowAction {
    RowAction::Chat {
        order_id: order.id,
        peer_name: SUPPORT_PEER_NAME.to_string(),
    }
}

/// Inventory chart data, one point per car model in catalog order.
pub fn inventory_series(cars: &[CarModel]) -> Vec<InventoryPoint> {
    cars.iter()
        .map(|car| InventoryPoint {
            model_name: car.model_name.clone(),
            stock: car.total_stock(),
        })
        .collect()
}
