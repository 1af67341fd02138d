use crate::domain::{
    requests::order::CreateOrderRequest,
    response::order::{Order, OrderTransitionResponse},
};
use async_trait::async_trait;
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynOrderGatewayClient = Arc<dyn OrderGatewayClientTrait + Send + Sync>;

#[async_trait]
pub trait OrderGatewayClientTrait {
    /// Orders visible to the caller; the orders service scopes customers to
    /// their own orders and gives admins everything.
    async fn find_all(&self) -> Result<Vec<Order>, ClientError>;
    async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, ClientError>;
    async fn confirm_order(&self, id: i64) -> Result<OrderTransitionResponse, ClientError>;
    async fn pay_order(&self, id: i64) -> Result<OrderTransitionResponse, ClientError>;
}
