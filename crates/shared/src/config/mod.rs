mod jwt;

pub use self::jwt::{Claims, JwtConfig};
