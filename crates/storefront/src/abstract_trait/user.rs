use crate::domain::{
    requests::{
        auth::{LoginRequest, RegisterRequest},
        user::{ChangePasswordRequest, UpdateProfileRequest},
    },
    response::{
        auth::{LoginResponse, MessageResponse, RegisterResponse},
        user::UserProfile,
    },
};
use async_trait::async_trait;
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynUserGatewayClient = Arc<dyn UserGatewayClientTrait + Send + Sync>;

#[async_trait]
pub trait UserGatewayClientTrait {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError>;
    async fn find_by_id(&self, id: i64) -> Result<UserProfile, ClientError>;
    async fn update_profile(&self, req: &UpdateProfileRequest)
    -> Result<UserProfile, ClientError>;
    async fn change_password(
        &self,
        req: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ClientError>;
}
