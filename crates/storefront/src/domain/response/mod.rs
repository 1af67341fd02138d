pub mod auth;
pub mod car;
pub mod chat;
pub mod order;
pub mod session;
pub mod user;
pub mod view;
