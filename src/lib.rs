pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod profile;
pub mod query;
pub mod store;
pub mod validation;
