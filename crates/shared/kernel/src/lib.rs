//! Kernel utilities shared across the relay list binaries.
//! Keep this crate lightweight; today it owns layered config loading and re-exports the domain.
//!
//! ## Config loading
//! ```rust,no_run
//! use rlist_kernel::config::load_config;
//! use rlist_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(Some("rlist.toml")).unwrap_or_default();
//! assert!(cfg.registry.capacity > 0);
//! ```

pub mod config;

pub use rlist_domain as domain;
