pub mod cache;
pub mod classifier;
pub mod command;
pub mod config;
pub mod error;
pub mod glob;
pub mod locator;
pub mod paths;
pub mod platform;
pub mod runner;
pub mod sanitize;
pub mod service;
pub mod status;
pub mod types;
pub mod watcher;

pub use error::{Result, SpecdeckError};
pub use service::SpecifyService;
