// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! WardBarn - Integrated Facility Emergency Response Suite
//!
//! A Rust engine that coordinates emergency-response procedures across a
//! secured facility: lockdown, network isolation, service failover,
//! evacuation, backup activation, containment and recovery, driven through
//! narrow actuator interfaces with strictly serialized execution and a
//! single live execution report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WardBarn Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐ │
//! │  │ Request  │→ │ Dispatcher │→ │ Response  │→ │ Report   │ │
//! │  │ Validator│  │ + Lock     │  │ Handlers  │  │ Builder  │ │
//! │  └──────────┘  └────────────┘  └───────────┘  └──────────┘ │
//! │       ↓             ↓               ↓              ↓       │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                    Event Bus                        │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! │       ↓             ↓               ↓              ↓       │
//! │  ┌──────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐ │
//! │  │ Access / │  │ Network /  │  │ Services /│  │ Power /  │ │
//! │  │ Evac     │  │ Surveil    │  │ Backups   │  │ Comms    │ │
//! │  └──────────┘  └────────────┘  └───────────┘  └──────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod actuators;
pub mod config;
pub mod engine;
pub mod response;

// Re-exports for convenience
pub use actuators::{Actuators, SimulatedFacility};
pub use config::{Config, SystemConfig};
pub use engine::{EngineEvent, EventBus, ResponseEngine};
pub use response::{ExecutionReport, ResponseRequest, ResponseType, SystemMode, ZoneMask};

/// WardBarn version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WardBarn name
pub const NAME: &str = "WardBarn";
