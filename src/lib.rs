pub mod access;
pub mod auth;
pub mod collection;
pub mod error;
pub mod server;
pub mod storage;
pub mod user;
pub mod wire;
