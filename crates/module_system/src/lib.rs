//! Extension-point mechanism for a game server core.
//!
//! The server core exposes a fixed catalogue of hooks (world lifecycle,
//! player actions, combat, loot, mail, auctions, battlegrounds, groups) and
//! this crate provides the plumbing that lets self-contained feature modules
//! observe and override them without the core knowing any module exists:
//!
//! - [`Module`]: the capability trait. Every hook has a default body (no-op
//!   for notifications, `false` for overrides), so a module implements only
//!   the handful it cares about.
//! - [`ModuleRegistry`]: owns the registered modules and fans each host call
//!   out to them in registration order.
//! - [`ModuleConfig`] / [`ConfigValues`]: per-module TOML settings loaded
//!   during world pre-initialization.
//! - [`EntityResolver`] / [`Resolved`]: the host-supplied bridge that turns
//!   opaque guids into typed entity handles for guid-based hooks.
//!
//! ```no_run
//! use module_system::{Module, ModuleRegistry};
//!
//! struct Announcer;
//!
//! impl Module for Announcer {
//!     fn name(&self) -> &str {
//!         "announcer"
//!     }
//!
//!     fn on_give_level(&mut self, player: &mut module_system::Player, level: u32) {
//!         tracing::info!("{} reached level {}", player.name, level);
//!     }
//! }
//!
//! let mut registry = ModuleRegistry::new("etc/modules");
//! registry.register(Box::new(Announcer));
//! registry.on_world_pre_initialized();
//! registry.on_world_initialized();
//! ```

pub mod config;
pub mod error;
pub mod module;
pub mod registry;
pub mod resolve;
pub mod types;

pub use config::{ConfigValues, ModuleConfig};
pub use error::ConfigError;
pub use module::{ChatCommandSpec, Module};
pub use registry::ModuleRegistry;
pub use resolve::{EntityResolver, Resolved};
pub use types::*;
