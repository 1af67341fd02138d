use crate::{
    abstract_trait::{session::DynSessionStorage, user::DynUserGatewayClient},
    config::RoleSource,
    domain::{
        requests::auth::LoginRequest,
        response::{
            session::{Role, Session},
            user::UserProfile,
        },
    },
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use shared::{abstract_trait::DynJwtService, config::Claims, errors::ClientError};
use tracing::{error, info, warn};
use validator::Validate;

pub const DEFAULT_DISPLAY_NAME: &str = "Customer";
pub const DEFAULT_LOGIN_ERROR: &str = "Wrong email or password";

/// Headers for a gateway call: JSON content type, plus the bearer token when
/// the session has one.
pub fn auth_headers(session: &Session) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = session.token.as_deref().filter(|t| !t.is_empty()) {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!("Stored token is not a valid header value: {e}"),
        }
    }

    headers
}

/// Owns the local session: login, logout and identity lookups.
#[derive(Clone)]
pub struct SessionStore {
    storage: DynSessionStorage,
    users: DynUserGatewayClient,
    jwt: DynJwtService,
    role_source: RoleSource,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("role_source", &self.role_source)
            .finish()
    }
}

impl SessionStore {
    pub fn new(
        storage: DynSessionStorage,
        users: DynUserGatewayClient,
        jwt: DynJwtService,
        role_source: RoleSource,
    ) -> Self {
        Self {
            storage,
            users,
            jwt,
            role_source,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        req.validate()?;

        info!("Logging in {}", req.email);

        let response = self.users.login(&req).await.map_err(|e| {
            if e.status().is_some() {
                ClientError::AuthFailure(
                    e.server_message().unwrap_or(DEFAULT_LOGIN_ERROR).to_string(),
                )
            } else {
                e
            }
        })?;

        let claims = self.jwt.decode_claims(&response.access_token).ok();
        if claims.is_none() {
            warn!("Login token payload could not be decoded");
        }

        let session = Session {
            user_id: response
                .user_id
                .or_else(|| claims.as_ref().map(|c| c.user_id)),
            role: response
                .role
                .or_else(|| claims.as_ref().and_then(claim_role)),
            display_name: Some(
                response
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            ),
            email: Some(req.email),
            token: Some(response.access_token),
        };

        // `set` replaces every key, so a failed write keeps the previous session
        self.storage.set(session.clone())?;

        info!(
            "Logged in as user {:?} with role {:?}",
            session.user_id, session.role
        );

        Ok(session)
    }

    /// Always ends logged out; storage failures are only logged.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            error!("Failed to clear session: {e}");
        }
        info!("Logged out");
    }

    /// Keeps the stored name and email in step with an updated profile.
    pub fn apply_profile(&self, profile: &UserProfile) -> Result<Session, ClientError> {
        let mut session = self.storage.get();
        if !session.is_authenticated() {
            return Err(ClientError::NotAuthorized("Not logged in".into()));
        }

        if let Some(name) = profile.display_name() {
            session.display_name = Some(name.to_string());
        }
        if let Some(email) = profile.email.as_ref().filter(|e| !e.is_empty()) {
            session.email = Some(email.clone());
        }

        self.storage.set(session.clone())?;
        Ok(session)
    }

    pub fn session(&self) -> Session {
        self.storage.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.storage.get().is_authenticated()
    }

    pub fn auth_header(&self) -> HeaderMap {
        auth_headers(&self.storage.get())
    }

    pub fn current_role(&self) -> Option<Role> {
        let session = self.storage.get();
        match self.role_source {
            RoleSource::Stored => session.role,
            RoleSource::Token => self.claims(&session).as_ref().and_then(claim_role),
        }
    }

    pub fn current_user_id(&self) -> Option<i64> {
        let session = self.storage.get();
        match self.role_source {
            RoleSource::Stored => session.user_id,
            RoleSource::Token => self.claims(&session).map(|c| c.user_id),
        }
    }

    pub fn display_name(&self) -> Option<String> {
        self.storage.get().display_name
    }

    pub fn email(&self) -> Option<String> {
        self.storage.get().email
    }

    fn claims(&self, session: &Session) -> Option<Claims> {
        let token = session.token.as_deref()?;
        match self.jwt.decode_claims(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!("Cannot read stored token: {e}");
                None
            }
        }
    }
}

fn claim_role(claims: &Claims) -> Option<Role> {
    claims.role.as_deref().and_then(|r| r.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{session::SessionStorageTrait, user::UserGatewayClientTrait},
        cache::MemorySessionStorage,
        domain::{
            requests::{
                auth::RegisterRequest,
                user::{ChangePasswordRequest, UpdateProfileRequest},
            },
            response::{
                auth::{LoginResponse, MessageResponse, RegisterResponse},
                user::UserProfile,
            },
        },
    };
    use async_trait::async_trait;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use shared::config::JwtConfig;
    use std::sync::{Arc, Mutex};

    fn token(user_id: i64, role: &str) -> String {
        let claims = Claims {
            user_id,
            role: Some(role.to_string()),
            exp: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    struct StubUsers {
        reply: Mutex<Option<Result<LoginResponse, ClientError>>>,
    }

    impl StubUsers {
        fn replying(reply: Result<LoginResponse, ClientError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
            })
        }
    }

    #[async_trait]
    impl UserGatewayClientTrait for StubUsers {
        async fn login(&self, _req: &LoginRequest) -> Result<LoginResponse, ClientError> {
            self.reply.lock().unwrap().take().expect("single login call")
        }
        async fn register(&self, _req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
            unimplemented!()
        }
        async fn find_by_id(&self, _id: i64) -> Result<UserProfile, ClientError> {
            unimplemented!()
        }
        async fn update_profile(
            &self,
            _req: &UpdateProfileRequest,
        ) -> Result<UserProfile, ClientError> {
            unimplemented!()
        }
        async fn change_password(
            &self,
            _req: &ChangePasswordRequest,
        ) -> Result<MessageResponse, ClientError> {
            unimplemented!()
        }
    }

    fn store(
        users: Arc<StubUsers>,
        source: RoleSource,
    ) -> (SessionStore, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        let store = SessionStore::new(
            storage.clone(),
            users,
            Arc::new(JwtConfig::default()),
            source,
        );
        (store, storage)
    }

    fn login_reply(token: String) -> LoginResponse {
        LoginResponse {
            access_token: token,
            user_id: None,
            role: None,
            name: None,
            message: Some("Login successful".into()),
        }
    }

    #[test]
    fn auth_headers_with_and_without_token() {
        let anonymous = auth_headers(&Session::default());
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[CONTENT_TYPE], "application/json");

        let session = Session {
            token: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(auth_headers(&session)[AUTHORIZATION], "Bearer abc");
    }

    #[tokio::test]
    async fn login_fills_identity_from_token() {
        let (store, storage) = store(
            StubUsers::replying(Ok(login_reply(token(42, "customer")))),
            RoleSource::Token,
        );

        let session = store.login(" an@vinfast.vn ", "secret").await.unwrap();

        assert_eq!(session.user_id, Some(42));
        assert_eq!(session.role, Some(Role::Customer));
        assert_eq!(session.display_name.as_deref(), Some(DEFAULT_DISPLAY_NAME));
        assert_eq!(session.email.as_deref(), Some("an@vinfast.vn"));
        assert_eq!(storage.get(), session);
        assert_eq!(store.current_role(), Some(Role::Customer));
        assert_eq!(store.current_user_id(), Some(42));
    }

    #[tokio::test]
    async fn login_failure_uses_server_message_or_default() {
        let (store, storage) = store(
            StubUsers::replying(Err(ClientError::from_status(401, "Account locked"))),
            RoleSource::Token,
        );
        let err = store.login("an@vinfast.vn", "x").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthFailure(msg) if msg == "Account locked"));
        assert!(storage.get().is_empty());

        let (store, _) = store_with_error(ClientError::from_status(401, ""));
        let err = store.login("an@vinfast.vn", "x").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthFailure(msg) if msg == DEFAULT_LOGIN_ERROR));
    }

    fn store_with_error(err: ClientError) -> (SessionStore, Arc<MemorySessionStorage>) {
        store(StubUsers::replying(Err(err)), RoleSource::Token)
    }

    #[tokio::test]
    async fn connectivity_errors_pass_through() {
        let (store, _) = store_with_error(ClientError::Connectivity("refused".into()));
        let err = store.login("an@vinfast.vn", "x").await.unwrap_err();
        assert!(matches!(err, ClientError::Connectivity(_)));
    }

    #[tokio::test]
    async fn malformed_credentials_never_reach_the_gateway() {
        // no reply queued: any gateway call would panic
        let users = Arc::new(StubUsers {
            reply: Mutex::new(None),
        });
        let (store, _) = store(users, RoleSource::Token);
        let err = store.login("not-an-email", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(fields) if fields.len() == 2));
    }

    #[tokio::test]
    async fn login_then_logout_clears_everything() {
        let (store, storage) = store(
            StubUsers::replying(Ok(login_reply(token(1, "admin")))),
            RoleSource::Token,
        );
        store.login("boss@vinfast.vn", "pw").await.unwrap();
        assert!(store.is_authenticated());

        store.logout();

        assert!(storage.get().is_empty());
        assert!(!store.is_authenticated());
        assert_eq!(store.current_role(), None);
        assert_eq!(store.auth_header().get(AUTHORIZATION), None);
    }

    /// Storage that holds a session but refuses every write.
    struct ReadOnlyStorage(MemorySessionStorage);

    impl SessionStorageTrait for ReadOnlyStorage {
        fn get(&self) -> Session {
            self.0.get()
        }
        fn set(&self, _session: Session) -> Result<(), ClientError> {
            Err(ClientError::Storage("disk full".into()))
        }
        fn clear(&self) -> Result<(), ClientError> {
            Err(ClientError::Storage("disk full".into()))
        }
    }

    #[tokio::test]
    async fn failed_write_keeps_the_previous_session() {
        let previous = Session {
            token: Some(token(3, "customer")),
            user_id: Some(3),
            role: Some(Role::Customer),
            display_name: Some("Lan".into()),
            email: Some("lan@vinfast.vn".into()),
        };
        let storage = Arc::new(ReadOnlyStorage(MemorySessionStorage::with_session(
            previous.clone(),
        )));
        let store = SessionStore::new(
            storage.clone(),
            StubUsers::replying(Ok(login_reply(token(42, "admin")))),
            Arc::new(JwtConfig::default()),
            RoleSource::Token,
        );

        let err = store.login("boss@vinfast.vn", "pw").await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        assert_eq!(storage.get(), previous);
        assert_eq!(store.current_user_id(), Some(3));
    }

    #[test]
    fn stored_source_ignores_token_payload() {
        let storage = Arc::new(MemorySessionStorage::with_session(Session {
            token: Some(token(9, "customer")),
            user_id: Some(3),
            role: Some(Role::Admin),
            ..Default::default()
        }));
        let users = Arc::new(StubUsers {
            reply: Mutex::new(None),
        });

        let stored = SessionStore::new(
            storage.clone(),
            users.clone(),
            Arc::new(JwtConfig::default()),
            RoleSource::Stored,
        );
        assert_eq!(stored.current_role(), Some(Role::Admin));
        assert_eq!(stored.current_user_id(), Some(3));

        let decoded = SessionStore::new(
            storage,
            users,
            Arc::new(JwtConfig::default()),
            RoleSource::Token,
        );
        assert_eq!(decoded.current_role(), Some(Role::Customer));
        assert_eq!(decoded.current_user_id(), Some(9));
    }
}
