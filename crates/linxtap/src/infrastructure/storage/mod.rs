//! Storage infrastructure.
//!
//! - **`config`** – Loads and saves the TOML configuration file from the
//!   platform config directory.

pub mod config;
