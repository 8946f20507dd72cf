pub mod catalog;
pub mod config;
pub mod language_config;
pub mod redis;
pub mod types;
