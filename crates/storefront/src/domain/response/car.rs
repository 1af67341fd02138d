use crate::domain::deserialize_id;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarModel {
    pub id: i64,
    pub model_name: String,
    pub base_price: f64,
    pub stock_by_location: BTreeMap<String, i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CarModel {
    /// Location key used when the catalog only reports a flat total.
    pub const TOTAL_LOCATION: &'static str = "total";

    pub fn total_stock(&self) -> i64 {
        self.stock_by_location.values().sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryResponse {
    #[serde(alias = "location")]
    pub dealer_location: String,
    #[serde(default)]
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarResponse {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(alias = "name")]
    pub model_name: String,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_by_location: Option<HashMap<String, i64>>,
    #[serde(default)]
    pub inventory: Option<Vec<InventoryResponse>>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl From<CarResponse> for CarModel {
    fn from(value: CarResponse) -> Self {
        let mut stock_by_location: BTreeMap<String, i64> = value
            .stock_by_location
            .unwrap_or_default()
            .into_iter()
            .collect();

        for entry in value.inventory.unwrap_or_default() {
            *stock_by_location.entry(entry.dealer_location).or_default() += entry.stock_quantity;
        }

        if stock_by_location.is_empty()
            && let Some(total) = value.stock_quantity
        {
            stock_by_location.insert(CarModel::TOTAL_LOCATION.to_string(), total);
        }

        CarModel {
            id: value.id,
            model_name: value.model_name,
            base_price: value.base_price.unwrap_or_default(),
            stock_by_location,
            description: value.description,
            image_url: value.image_url,
        }
    }
}
