pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod news;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
