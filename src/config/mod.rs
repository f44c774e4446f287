//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or --variant preset
//!     → loader.rs (parse, apply preset)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → RequestRouter built from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server rebuilds the router and swaps it in atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Listener address changes only apply on restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, PlatformConfig,
    TimeoutConfig, Variant,
};
pub use validation::{validate_config, ValidationError};
