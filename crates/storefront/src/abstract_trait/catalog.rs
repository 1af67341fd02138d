use crate::domain::response::car::CarModel;
use async_trait::async_trait;
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynCatalogGatewayClient = Arc<dyn CatalogGatewayClientTrait + Send + Sync>;

#[async_trait]
pub trait CatalogGatewayClientTrait {
    async fn find_all(&self) -> Result<Vec<CarModel>, ClientError>;
    async fn find_by_id(&self, id: i64) -> Result<CarModel, ClientError>;
}
