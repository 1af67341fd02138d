use crate::domain::response::order::OrderStatus;
use serde::Serialize;

/// What a row's action button does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowAction {
    /// Open the support conversation for the order.
    Chat { order_id: i64, peer_name: String },
    /// Admin appointment scheduling.
    Schedule { order_id: i64 },
}

/// Row of the customer's "my orders" table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub order_id: i64,
    pub car_name: String,
    pub status: OrderStatus,
    pub action: RowAction,
}

/// Row of the admin dashboard table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminRow {
    pub order_id: i64,
    pub customer_name: String,
    pub car_name: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub action: Option<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPoint {
    pub model_name: String,
    pub stock: i64,
}

/// Order count per status, in display order.
///
/// The four active statuses are always present, even at zero; any other
/// status follows in the order it was first seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusHistogram {
    entries: Vec<(OrderStatus, u64)>,
}

impl Default for StatusHistogram {
    fn default() -> Self {
        Self {
            entries: OrderStatus::SEEDED.iter().map(|s| (s.clone(), 0)).collect(),
        }
    }
}

impl StatusHistogram {
    pub fn record(&mut self, status: &OrderStatus) {
        match self.entries.iter_mut().find(|(s, _)| s == status) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((status.clone(), 1)),
        }
    }

    pub fn get(&self, status: &OrderStatus) -> u64 {
        self.entries
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, count)| *count)
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[(OrderStatus, u64)] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl<'a> FromIterator<&'a OrderStatus> for StatusHistogram {
    fn from_iter<I: IntoIterator<Item = &'a OrderStatus>>(iter: I) -> Self {
        let mut histogram = StatusHistogram::default();
        for status in iter {
            histogram.record(status);
        }
        histogram
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardTotals {
    pub revenue: f64,
    pub status_histogram: StatusHistogram,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub rows: Vec<AdminRow>,
    pub totals: DashboardTotals,
}

/// Everything the admin page renders: table, totals and inventory chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub rows: Vec<AdminRow>,
    pub totals: DashboardTotals,
    pub inventory: Vec<InventoryPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_keeps_seeded_then_first_seen_order() {
        let statuses = [
            OrderStatus::Failed,
            OrderStatus::Paid,
            OrderStatus::Canceled,
            OrderStatus::Failed,
        ];
        let histogram: StatusHistogram = statuses.iter().collect();

        let order: Vec<&str> = histogram.entries().iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(
            order,
            ["Pending", "Paid", "Scheduled", "Confirmed", "Failed", "Canceled"]
        );
        assert_eq!(histogram.get(&OrderStatus::Failed), 2);
        assert_eq!(histogram.get(&OrderStatus::Pending), 0);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn row_action_is_tagged() {
        let action = RowAction::Chat {
            order_id: 1,
            peer_name: "VinFast Support".into(),
        };
        let value = serde_json::to_value(action).unwrap();
        assert_eq!(value["kind"], "chat");
        assert_eq!(value["peer_name"], "VinFast Support");
    }
}
