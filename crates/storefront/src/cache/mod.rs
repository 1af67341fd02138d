mod session;

pub use self::session::{FileSessionStorage, MemorySessionStorage};
