//! Stellar jobs: background job core for the Stellar game.
//!
//! The crate schedules recurring maintenance tasks and generates game
//! resources with bounded retries and an approval gate.
//!
//! # Architecture
//!
//! Both feature areas follow hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, processes)
//! - **Services**: Orchestration over ports with an injected clock
//!
//! # Modules
//!
//! - [`schedule`]: Toggleable recurring tasks and the tick-driven scheduler
//! - [`resource`]: Bounded-retry generation and approval of resources
//! - [`config`]: TOML configuration for the binary
//! - [`clock`]: Manually driven clock for deterministic schedules

pub mod clock;
pub mod config;
pub mod resource;
pub mod schedule;
pub mod telemetry;
