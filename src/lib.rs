pub mod banner;
pub mod catalog;
pub mod chat;
pub mod commands;
pub mod config;
pub mod consts;
pub mod embed;
pub mod engine;
pub mod logging;
pub mod router;
pub mod store;
