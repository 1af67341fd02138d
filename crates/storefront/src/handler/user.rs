use crate::{
    abstract_trait::user::DynUserGatewayClient,
    domain::{
        requests::{
            auth::RegisterRequest,
            user::{ChangePasswordRequest, UpdateProfileRequest},
        },
        response::{auth::RegisterResponse, session::Session},
    },
    service::SessionStore,
};
use shared::errors::ClientError;
use tracing::info;

/// Account management around the users service.
#[derive(Clone)]
pub struct ProfileHandler {
    users: DynUserGatewayClient,
    session: SessionStore,
}

impl ProfileHandler {
    pub fn new(users: DynUserGatewayClient, session: SessionStore) -> Self {
        Self { users, session }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let req = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = self.users.register(&req).await?;
        info!("Registered {} as user {:?}", req.email, response.user_id);
        Ok(response)
    }

    /// Updates the profile and the stored display name and email with it.
    pub async fn update_profile(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Session, ClientError> {
        let req = UpdateProfileRequest {
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
        };

        let profile = self.users.update_profile(&req).await?;
        self.session.apply_profile(&profile)
    }

    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ClientError> {
        let req = ChangePasswordRequest {
            old_password: old.to_string(),
            new_password: new.to_string(),
        };

        self.users.change_password(&req).await?;
        info!("Password changed");
        Ok(())
    }
}
