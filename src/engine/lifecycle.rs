// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Subsystem lifecycle: staged startup and best-effort teardown.

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::actuators::{
    AccessControl, Actuators, FacilityHardware, NetworkControl, ServiceControl,
};
use crate::response::codes;

/// Lifecycle state machine:
/// `Uninitialized -> Initializing -> Ready -> ShuttingDown -> Uninitialized`.
/// `Ready` is the only stage in which responses execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    /// No subsystem is online
    Uninitialized,
    /// Startup sequence in progress
    Initializing,
    /// All subsystems online, responses accepted
    Ready,
    /// Teardown sequence in progress
    ShuttingDown,
}

impl Default for LifecycleStage {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Startup failure, distinguished by the stage that failed.
#[derive(Debug, Error)]
pub enum InitError {
    /// Facility hardware readiness check failed
    #[error("hardware readiness check failed")]
    HardwareUnavailable,

    /// Network subsystem initialization failed
    #[error("network subsystem initialization failed")]
    Network(#[source] anyhow::Error),

    /// Access control initialization failed
    #[error("access control initialization failed")]
    AccessControl(#[source] anyhow::Error),
}

impl InitError {
    /// Wire-level code for the failed stage.
    pub fn code(&self) -> i32 {
        match self {
            Self::HardwareUnavailable => codes::HARDWARE_UNAVAILABLE,
            Self::Network(_) => codes::NETWORK_FAILURE,
            Self::AccessControl(_) => codes::ACCESS_DENIED,
        }
    }
}

/// Sequences subsystem startup and teardown.
#[derive(Default)]
pub struct LifecycleManager {
    stage: RwLock<LifecycleStage>,
}

impl LifecycleManager {
    /// Manager starting in `Uninitialized`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle stage.
    pub fn stage(&self) -> LifecycleStage {
        *self.stage.read()
    }

    /// Whether the system accepts response execution.
    pub fn is_ready(&self) -> bool {
        self.stage() == LifecycleStage::Ready
    }

    /// Run the startup sequence: hardware readiness, then the network
    /// subsystem, then access control. The first failing stage reverts to
    /// `Uninitialized` and reports its distinct error.
    pub async fn startup(&self, actuators: &Actuators) -> Result<(), InitError> {
        *self.stage.write() = LifecycleStage::Initializing;

        if !actuators.hardware.readiness_check().await {
            error!("hardware subsystem check failed");
            *self.stage.write() = LifecycleStage::Uninitialized;
            return Err(InitError::HardwareUnavailable);
        }

        if let Err(e) = actuators.network.initialize().await {
            error!("network subsystem initialization failed: {e:#}");
            *self.stage.write() = LifecycleStage::Uninitialized;
            return Err(InitError::Network(e));
        }

        if let Err(e) = actuators.access.initialize().await {
            error!("access control initialization failed: {e:#}");
            *self.stage.write() = LifecycleStage::Uninitialized;
            return Err(InitError::AccessControl(e));
        }

        *self.stage.write() = LifecycleStage::Ready;
        info!("all subsystems online");
        Ok(())
    }

    /// Run the teardown sequence unconditionally: restore normal access,
    /// clear the emergency network rules, stop emergency services. No step
    /// failure aborts the rest.
    pub async fn teardown(&self, actuators: &Actuators) {
        *self.stage.write() = LifecycleStage::ShuttingDown;
        warn!("tearing down emergency subsystems");

        actuators.access.restore_normal_access().await;
        actuators.network.clear_emergency_rules().await;
        actuators.services.stop_emergency_services().await;

        *self.stage.write() = LifecycleStage::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::SimulatedFacility;
    use std::sync::Arc;

    #[tokio::test]
    async fn startup_reaches_ready() {
        let sim = Arc::new(SimulatedFacility::healthy());
        let actuators = Actuators::from_simulator(sim.clone());
        let lifecycle = LifecycleManager::new();

        lifecycle.startup(&actuators).await.unwrap();
        assert!(lifecycle.is_ready());
        assert_eq!(
            sim.calls(),
            vec![
                "hardware.readiness_check",
                "network.initialize",
                "access.initialize",
            ]
        );
    }

    #[tokio::test]
    async fn startup_stops_at_first_failing_stage() {
        let sim = Arc::new(SimulatedFacility::healthy().fail_operation("network.initialize"));
        let actuators = Actuators::from_simulator(sim.clone());
        let lifecycle = LifecycleManager::new();

        let err = lifecycle.startup(&actuators).await.unwrap_err();
        assert_eq!(err.code(), codes::NETWORK_FAILURE);
        assert_eq!(lifecycle.stage(), LifecycleStage::Uninitialized);
        // Access control is never reached.
        assert_eq!(sim.call_count("access.initialize"), 0);
    }

    #[tokio::test]
    async fn hardware_failure_has_distinct_code() {
        let actuators =
            Actuators::from_simulator(Arc::new(SimulatedFacility::healthy().hardware_down()));
        let lifecycle = LifecycleManager::new();
        let err = lifecycle.startup(&actuators).await.unwrap_err();
        assert_eq!(err.code(), codes::HARDWARE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn teardown_runs_every_step() {
        let sim = Arc::new(SimulatedFacility::healthy());
        let actuators = Actuators::from_simulator(sim.clone());
        let lifecycle = LifecycleManager::new();

        lifecycle.startup(&actuators).await.unwrap();
        lifecycle.teardown(&actuators).await;

        assert_eq!(lifecycle.stage(), LifecycleStage::Uninitialized);
        assert_eq!(sim.call_count("access.restore_normal_access"), 1);
        assert_eq!(sim.call_count("network.clear_emergency_rules"), 1);
        assert_eq!(sim.call_count("services.stop_emergency_services"), 1);
    }
}
