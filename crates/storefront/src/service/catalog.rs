use crate::{
    abstract_trait::catalog::CatalogGatewayClientTrait,
    domain::response::car::{CarModel, CarResponse},
    service::GatewayHttp,
};
use async_trait::async_trait;
use shared::errors::ClientError;
use tracing::debug;

const CARS_PATH: &str = "/catalog/catalog/cars";

#[derive(Debug, Clone)]
pub struct CatalogGatewayClientService {
    http: GatewayHttp,
}

impl CatalogGatewayClientService {
    pub fn new(http: &GatewayHttp) -> Self {
        Self {
            http: http.for_component("catalog-service-client"),
        }
    }
}

#[async_trait]
impl CatalogGatewayClientTrait for CatalogGatewayClientService {
    async fn find_all(&self) -> Result<Vec<CarModel>, ClientError> {
        let cars: Vec<CarResponse> = self.http.get("FindAllCars", CARS_PATH).await?;
        debug!("Catalog returned {} car models", cars.len());

        Ok(cars.into_iter().map(CarModel::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<CarModel, ClientError> {
        let car: CarResponse = self
            .http
            .get("FindCarById", &format!("{CARS_PATH}/{id}"))
            .await?;

        Ok(car.into())
    }
}
