pub mod chain;
pub mod config;
pub mod constant;
pub mod contracts;
pub mod error;
pub mod handler;
pub mod report;
pub mod utils;
