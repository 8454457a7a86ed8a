//! Configuration loading
//!
//! Loads application configuration from environment variables and files.

pub mod loader;

pub use loader::{
    load, load_from_env, load_from_file, load_from_lookup, parse_config, probe_config_paths,
};
