//! Deterministic multi-client simulation for the lumina sync protocol.
//!
//! A seed fully determines a run: the same seed replays the same client
//! actions, the same network faults, and the same server decisions. The
//! clients are real [`lumina_core::sync::SyncClient`] instances; only the
//! transport, the server, and the user are simulated.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` for return types.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`,
//!   `trace!`).

pub mod campaign;
pub mod client;
pub mod network;
pub mod oracle;
pub mod rng;
pub mod server;
pub mod sim;

pub use campaign::{CampaignConfig, CampaignReport, run_campaign};
pub use network::FaultConfig;
pub use sim::{SimulationConfig, SimulationResult, Simulator};
