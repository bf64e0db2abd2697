pub mod app;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod hooks;
pub mod listing;
pub mod model;
pub mod plugins;
pub mod session;
pub mod storage;
pub mod workflow;

pub use error::{Error, Result};
