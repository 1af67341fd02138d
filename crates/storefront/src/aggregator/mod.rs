mod rows;

pub use self::rows::{
    ADMIN_CAR_PLACEHOLDER, CUSTOMER_CAR_PLACEHOLDER, SUPPORT_PEER_NAME, admin_action,
    customer_placeholder, inventory_series, revenue,
};

use crate::{
    abstract_trait::{
        catalog::DynCatalogGatewayClient, order::DynOrderGatewayClient, user::DynUserGatewayClient,
    },
    domain::response::{
        car::CarModel,
        order::Order,
        view::{AdminDashboard, AdminRow, CustomerRow, DashboardView},
    },
};
use futures::future::join_all;
use shared::errors::ClientError;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Joins orders with catalog and user reference data into table rows.
///
/// Reference lookups never fail a view: a failed or missing car or user
/// turns into placeholder text. Only the order list itself is fatal.
#[derive(Clone)]
pub struct OrderViewAggregator {
    orders: DynOrderGatewayClient,
    catalog: DynCatalogGatewayClient,
    users: DynUserGatewayClient,
}

impl OrderViewAggregator {
    pub fn new(
        orders: DynOrderGatewayClient,
        catalog: DynCatalogGatewayClient,
        users: DynUserGatewayClient,
    ) -> Self {
        Self {
            orders,
            catalog,
            users,
        }
    }

    pub async fn build_customer_rows(&self, orders: &[Order]) -> Vec<CustomerRow> {
        let names = self.lookup_car_names(orders).await;

        orders
            .iter()
            .map(|order| CustomerRow {
                order_id: order.id,
                car_name: order
                    .first_car_id()
                    .and_then(|id| names.get(&id).cloned().flatten())
                    .unwrap_or_else(|| CUSTOMER_CAR_PLACEHOLDER.to_string()),
                status: order.status.clone(),
                action: rows::customer_action(order),
            })
            .collect()
    }

    /// `cars`, when given, is used instead of per-row catalog lookups.
    pub async fn build_admin_rows(
        &self,
        orders: &[Order],
        cars: Option<&[CarModel]>,
    ) -> AdminDashboard {
        let car_names: HashMap<i64, Option<String>> = match cars {
            Some(cars) => cars
                .iter()
                .map(|car| (car.id, Some(car.model_name.clone())))
                .collect(),
            None => self.lookup_car_names(orders).await,
        };
        let customer_names = self.lookup_customer_names(orders).await;

        let rows = orders
            .iter()
            .map(|order| {
                let customer_name = customer_names
                    .get(&order.user_id)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| customer_placeholder(order.user_id));
                let car_name = order
                    .first_car_id()
                    .and_then(|id| car_names.get(&id).cloned().flatten())
                    .unwrap_or_else(|| ADMIN_CAR_PLACEHOLDER.to_string());

                AdminRow {
                    order_id: order.id,
                    action: admin_action(order, &customer_name),
                    customer_name,
                    car_name,
                    total_amount: order.total_amount,
                    status: order.status.clone(),
                }
            })
            .collect();

        AdminDashboard {
            rows,
            totals: rows::totals(orders),
        }
    }

    pub async fn load_customer_orders(&self) -> Result<Vec<CustomerRow>, ClientError> {
        let orders = self.orders.find_all().await?;
        info!("Building {} customer order row(s)", orders.len());

        Ok(self.build_customer_rows(&orders).await)
    }

    pub async fn load_dashboard(&self) -> Result<DashboardView, ClientError> {
        let (orders, cars) = tokio::join!(self.orders.find_all(), self.catalog.find_all());
        let orders = orders?;

        let cars = match cars {
            Ok(cars) => Some(cars),
            Err(e) => {
                warn!("Car list unavailable, falling back to per-order lookups: {e}");
                None
            }
        };

        let dashboard = self.build_admin_rows(&orders, cars.as_deref()).await;
        info!(
            "Dashboard built: {} row(s), revenue {}",
            dashboard.rows.len(),
            dashboard.totals.revenue
        );

        Ok(DashboardView {
            rows: dashboard.rows,
            totals: dashboard.totals,
            inventory: cars.as_deref().map(inventory_series).unwrap_or_default(),
        })
    }

    async fn lookup_car_names(&self, orders: &[Order]) -> HashMap<i64, Option<String>> {
        let ids: BTreeSet<i64> = orders.iter().filter_map(Order::first_car_id).collect();

        let lookups = ids.into_iter().map(|id| async move {
            match self.catalog.find_by_id(id).await {
                Ok(car) => (id, Some(car.model_name)),
                Err(e) => {
                    warn!("Car {id} lookup failed: {e}");
                    (id, None)
                }
            }
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn lookup_customer_names(&self, orders: &[Order]) -> HashMap<i64, Option<String>> {
        let ids: BTreeSet<i64> = orders.iter().map(|order| order.user_id).collect();

        let lookups = ids.into_iter().map(|id| async move {
            match self.users.find_by_id(id).await {
                Ok(user) => (id, user.display_name().map(str::to_string)),
                Err(e) => {
                    warn!("User {id} lookup failed: {e}");
                    (id, None)
                }
            }
        });

        join_all(lookups).await.into_iter().collect()
    }
}
