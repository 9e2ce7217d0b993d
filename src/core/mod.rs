//! Configuration and domain types shared by every Lambda

pub mod config;
pub mod models;
pub mod universe;
