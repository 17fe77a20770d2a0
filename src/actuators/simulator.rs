// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Facility simulator for demo/testing
//!
//! Implements every actuator capability as a logging stand-in. Operations
//! named in the fault plan fail deterministically, and every call is
//! recorded in order so tests can assert on the exact actuation sequence.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::traits::*;
use crate::response::{ResponseRequest, ZoneMask};

/// Simulated facility backing all actuation domains
pub struct SimulatedFacility {
    fail_ops: HashSet<String>,
    fail_zones: HashSet<u8>,
    hardware_ready: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl SimulatedFacility {
    /// A facility where every operation succeeds.
    pub fn healthy() -> Self {
        Self {
            fail_ops: HashSet::new(),
            fail_zones: HashSet::new(),
            hardware_ready: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make the named operation fail (e.g. `"access.lock_zones"`).
    pub fn fail_operation(mut self, operation: &str) -> Self {
        self.fail_ops.insert(operation.to_string());
        self
    }

    /// Make per-zone network isolation fail for one specific zone.
    pub fn fail_zone(mut self, zone: u8) -> Self {
        self.fail_zones.insert(zone);
        self
    }

    /// Start with the hardware readiness probe failing.
    pub fn hardware_down(self) -> Self {
        self.hardware_ready.store(false, Ordering::SeqCst);
        self
    }

    /// Flip the hardware readiness probe at runtime.
    pub fn set_hardware_ready(&self, ready: bool) {
        self.hardware_ready.store(ready, Ordering::SeqCst);
    }

    /// Ordered log of every actuator call made so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls whose name starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, operation: impl Into<String>) {
        self.calls.lock().push(operation.into());
    }

    fn attempt(&self, operation: &str) -> Result<()> {
        self.record(operation);
        if self.fail_ops.contains(operation) {
            bail!("simulated fault injected for {operation}");
        }
        Ok(())
    }
}

#[async_trait]
impl FacilityHardware for SimulatedFacility {
    async fn readiness_check(&self) -> bool {
        self.record("hardware.readiness_check");
        info!("checking hardware readiness");
        self.hardware_ready.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessControl for SimulatedFacility {
    async fn initialize(&self) -> Result<()> {
        info!("initializing access control");
        self.attempt("access.initialize")
    }

    async fn lock_zones(&self, zones: ZoneMask, duration_secs: u32) -> Result<()> {
        info!("locking physical access, zones {zones}, duration {duration_secs}s");
        self.attempt("access.lock_zones")
    }

    async fn restore_normal_access(&self) {
        info!("restoring normal access posture");
        self.record("access.restore_normal_access");
    }
}

#[async_trait]
impl NetworkControl for SimulatedFacility {
    async fn initialize(&self) -> Result<()> {
        info!("initializing network subsystem");
        self.attempt("network.initialize")
    }

    async fn prepare_emergency_chain(&self) -> Result<()> {
        info!("preparing emergency rule chain");
        self.attempt("network.prepare_emergency_chain")
    }

    async fn isolate_zone(&self, zone: u8, severity: u8) -> Result<()> {
        info!("installing isolation rule for zone {zone}, severity {severity}");
        let operation = format!("network.isolate_zone[{zone}]");
        self.record(&operation);
        if self.fail_zones.contains(&zone) || self.fail_ops.contains("network.isolate_zone") {
            bail!("simulated fault injected for zone {zone}");
        }
        Ok(())
    }

    async fn isolate_segments(&self, zones: ZoneMask, severity: u8) -> Result<()> {
        info!("isolating network segments, zones {zones}, severity {severity}");
        self.attempt("network.isolate_segments")
    }

    async fn apply_emergency_chain(&self) -> Result<()> {
        info!("applying emergency rule chain");
        self.attempt("network.apply_emergency_chain")
    }

    async fn clear_emergency_rules(&self) {
        info!("clearing emergency network rules");
        self.record("network.clear_emergency_rules");
    }
}

#[async_trait]
impl ServiceControl for SimulatedFacility {
    async fn stop_non_critical(&self, zones: ZoneMask) -> Result<()> {
        info!("stopping non-critical services, zones {zones}");
        self.attempt("services.stop_non_critical")
    }

    async fn stop_primary(&self, service: &str) -> Result<()> {
        info!("stopping primary service {service}");
        self.record(format!("services.stop_primary[{service}]"));
        if self.fail_ops.contains("services.stop_primary") {
            bail!("simulated fault stopping {service}");
        }
        Ok(())
    }

    async fn start_backup(&self, service: &str) -> Result<()> {
        info!("starting backup service {service}-backup");
        self.record(format!("services.start_backup[{service}]"));
        if self.fail_ops.contains("services.start_backup") {
            bail!("simulated fault starting {service}-backup");
        }
        Ok(())
    }

    async fn stop_emergency_services(&self) {
        info!("stopping emergency services");
        self.record("services.stop_emergency_services");
    }
}

#[async_trait]
impl SurveillanceControl for SimulatedFacility {
    async fn enhance_coverage(&self, zones: ZoneMask) -> Result<()> {
        info!("enhancing surveillance coverage, zones {zones}");
        self.attempt("surveillance.enhance_coverage")
    }
}

#[async_trait]
impl EvacuationControl for SimulatedFacility {
    async fn unlock_routes(&self, zones: ZoneMask) -> Result<()> {
        info!("unlocking evacuation routes, zones {zones}");
        self.attempt("evacuation.unlock_routes")
    }

    async fn activate_lights(&self, zones: ZoneMask) {
        info!("activating evacuation lighting, zones {zones}");
        self.record("evacuation.activate_lights");
    }
}

#[async_trait]
impl PowerControl for SimulatedFacility {
    async fn shed_non_essential(&self, zones: ZoneMask) {
        info!("powering down non-essential systems, zones {zones}");
        self.record("power.shed_non_essential");
    }
}

#[async_trait]
impl CommsControl for SimulatedFacility {
    async fn enable_emergency_channel(&self) {
        info!("enabling emergency communications channel");
        self.record("comms.enable_emergency_channel");
    }
}

#[async_trait]
impl BackupControl for SimulatedFacility {
    async fn activate(&self, severity: u8) -> Result<()> {
        info!("activating emergency backups, severity {severity}");
        self.attempt("backups.activate")
    }
}

#[async_trait]
impl ContainmentControl for SimulatedFacility {
    async fn partial_containment(&self, request: &ResponseRequest) -> Result<()> {
        info!(
            "executing partial containment, zones {}, severity {}",
            request.target_zones, request.severity
        );
        self.attempt("containment.partial_containment")
    }

    async fn recovery_sequence(&self, request: &ResponseRequest) -> Result<()> {
        info!("executing recovery sequence, severity {}", request.severity);
        self.attempt("containment.recovery_sequence")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseType;

    #[tokio::test]
    async fn records_calls_in_order() {
        let sim = SimulatedFacility::healthy();
        sim.lock_zones(ZoneMask::all(), 60).await.unwrap();
        sim.isolate_zone(3, 5).await.unwrap();
        sim.activate_lights(ZoneMask::all()).await;
        assert_eq!(
            sim.calls(),
            vec![
                "access.lock_zones",
                "network.isolate_zone[3]",
                "evacuation.activate_lights",
            ]
        );
    }

    #[tokio::test]
    async fn fault_plan_is_deterministic() {
        let sim = SimulatedFacility::healthy()
            .fail_operation("backups.activate")
            .fail_zone(7);
        assert!(sim.activate(9).await.is_err());
        assert!(sim.isolate_zone(6, 9).await.is_ok());
        assert!(sim.isolate_zone(7, 9).await.is_err());
        let request = ResponseRequest::new(
            ResponseType::PartialContain,
            5,
            ZoneMask::single(1),
            "sim test",
        );
        assert!(sim.partial_containment(&request).await.is_ok());
    }

    #[tokio::test]
    async fn hardware_readiness_toggles() {
        let sim = SimulatedFacility::healthy();
        assert!(sim.readiness_check().await);
        sim.set_hardware_ready(false);
        assert!(!sim.readiness_check().await);
        assert_eq!(sim.call_count("hardware.readiness_check"), 2);
    }
}
