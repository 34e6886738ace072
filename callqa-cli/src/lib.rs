//! CallQA command-line client.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
