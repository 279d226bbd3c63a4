pub mod auth;
pub mod config;
pub mod cycle;
pub mod daemon;
pub mod exercise;
pub mod migrate;
pub mod stats;
