//! Configuration Module
//!
//! Serde-default config structs plus a Figment loader. One `Config` is
//! constructed per invocation and handed to each component; components
//! never read the environment themselves.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, DiscoveryConfig, ModelConfig, PromptConfig, StoreConfig};
