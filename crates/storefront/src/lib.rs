pub mod abstract_trait;
pub mod aggregator;
pub mod cache;
pub mod chat;
pub mod config;
pub mod di;
pub mod domain;
pub mod handler;
pub mod realtime;
pub mod service;
pub mod state;

#[cfg(test)]
mod testing;
