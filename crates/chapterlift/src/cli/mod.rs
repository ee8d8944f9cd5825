//! Command handlers.

pub mod config;
pub mod storage;
pub mod upload;
