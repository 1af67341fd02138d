pub mod catalog;
pub mod chat;
pub mod order;
pub mod realtime;
pub mod session;
pub mod user;
