pub mod config;
pub mod import;
