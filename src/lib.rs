pub mod analytics;
pub mod config;
pub mod controllers;
pub mod error;
pub mod export;
pub mod fetch;
pub mod infra;
pub mod program;
pub mod roster;
pub mod services;
pub mod session;
pub mod views;
