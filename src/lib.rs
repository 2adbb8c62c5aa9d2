pub mod aggregate;
pub mod cli;
pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod exit_code;
pub mod render;
pub mod resolve;
pub mod sources;
pub mod state;
pub mod template;
