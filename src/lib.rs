pub mod binder;
pub mod config;
pub mod data;
pub mod server;
pub mod view;
