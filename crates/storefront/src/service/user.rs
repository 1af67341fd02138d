use crate::{
    abstract_trait::user::UserGatewayClientTrait,
    domain::{
        requests::{
            auth::{LoginRequest, RegisterRequest},
            user::{ChangePasswordRequest, UpdateProfileRequest},
        },
        response::{
            auth::{LoginResponse, MessageResponse, RegisterResponse},
            user::{ProfileUpdateResponse, UserProfile},
        },
    },
    service::GatewayHttp,
};
use async_trait::async_trait;
use shared::errors::ClientError;
use tracing::info;
use validator::Validate;

const USERS_PATH: &str = "/users/api/v1/users";

#[derive(Debug, Clone)]
pub struct UserGatewayClientService {
    http: GatewayHttp,
}

impl UserGatewayClientService {
    pub fn new(http: &GatewayHttp) -> Self {
        Self {
            http: http.for_component("user-service-client"),
        }
    }
}

#[async_trait]
impl UserGatewayClientTrait for UserGatewayClientService {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        req.validate()?;
        info!("Login request for {}", req.email);

        self.http
            .post_anonymous("LoginUser", &format!("{USERS_PATH}/login"), req)
            .await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        req.validate()?;
        info!("Registering user: {}", req.email);

        self.http
            .post_anonymous("RegisterUser", &format!("{USERS_PATH}/register"), req)
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<UserProfile, ClientError> {
        self.http
            .get("FindUserById", &format!("{USERS_PATH}/{id}"))
            .await
    }

    async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        req.validate()?;

        let response: ProfileUpdateResponse = self
            .http
            .put("UpdateProfile", &format!("{USERS_PATH}/update"), req)
            .await?;

        Ok(response.user)
    }

    async fn change_password(
        &self,
        req: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        req.validate()?;

        self.http
            .put(
                "ChangePassword",
                &format!("{USERS_PATH}/change-password"),
                req,
            )
            .await
    }
}
