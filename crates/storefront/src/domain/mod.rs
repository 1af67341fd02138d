pub mod requests;
pub mod response;

mod lenient;

pub use self::lenient::{deserialize_id, deserialize_opt_id};
