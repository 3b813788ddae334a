//! Chat front end
//!
//! Connects the report machinery to a Discord channel:
//! - `gateway`: websocket session that receives messages
//! - `handler`: command parsing and reply building
//! - `registry`: user → mining address registrations
//! - `rest`: reply delivery

/// Gateway websocket session
pub mod gateway;

/// Command parsing and dispatch
pub mod handler;

/// Persistent address registrations
pub mod registry;

/// REST message delivery
pub mod rest;

// Re-export main components for cleaner imports
pub use gateway::{DiscordConfig, GatewayClient, SessionEnd};
pub use handler::{Command, CommandHandler, Embed, InboundMessage, Reply};
pub use registry::{Registry, RegistryConfig};
pub use rest::RestClient;
