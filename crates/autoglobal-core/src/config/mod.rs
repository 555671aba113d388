//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use autoglobal_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Default model: {}", cfg.ai.default_openai_model);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{AiConfig, Config, LoadBalancing, ProviderConfig, ProvidersConfig};
