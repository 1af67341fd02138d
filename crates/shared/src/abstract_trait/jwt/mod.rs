use crate::{config::Claims, errors::ClientError};
use std::sync::Arc;

pub type DynJwtService = Arc<dyn JwtServiceTrait + Send + Sync>;

pub trait JwtServiceTrait: Send + Sync + std::fmt::Debug {
    fn decode_claims(&self, token: &str) -> Result<Claims, ClientError>;
}
