use crate::domain::response::session::Session;
use shared::errors::ClientError;
use std::sync::Arc;

pub type DynSessionStorage = Arc<dyn SessionStorageTrait + Send + Sync>;

/// Persistent home of the local session.
///
/// `set` replaces the whole session; there is no partial update.
pub trait SessionStorageTrait {
    fn get(&self) -> Session;
    fn set(&self, session: Session) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}
