// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Actuator capability traits, one per actuation domain.
//!
//! The engine drives every external subsystem through these narrow
//! interfaces. A production binding wires them to the real access-control,
//! firewall, service-management and facility-hardware systems; tests and
//! demo mode use the simulator. Zone and service identifiers are passed as
//! structured data, never interpolated into command text.

use anyhow::Result;
use async_trait::async_trait;

use crate::response::{ResponseRequest, ZoneMask};

/// Facility hardware readiness probe.
#[async_trait]
pub trait FacilityHardware: Send + Sync {
    /// Live check that the required hardware interfaces are operational.
    /// Re-evaluated on every call; never cached.
    async fn readiness_check(&self) -> bool;
}

/// Physical access control: door and lock actuation.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Bring the access-control subsystem online.
    async fn initialize(&self) -> Result<()>;

    /// Lock physical access to the given zones for `duration_secs` seconds.
    async fn lock_zones(&self, zones: ZoneMask, duration_secs: u32) -> Result<()>;

    /// Restore the normal access posture. Best-effort teardown.
    async fn restore_normal_access(&self);
}

/// Network segmentation and isolation.
#[async_trait]
pub trait NetworkControl: Send + Sync {
    /// Bring the network subsystem online.
    async fn initialize(&self) -> Result<()>;

    /// Flush and recreate the emergency rule chain.
    async fn prepare_emergency_chain(&self) -> Result<()>;

    /// Install an isolation rule for a single zone.
    async fn isolate_zone(&self, zone: u8, severity: u8) -> Result<()>;

    /// Isolate all given zones in one aggregate operation.
    async fn isolate_segments(&self, zones: ZoneMask, severity: u8) -> Result<()>;

    /// Activate the emergency rule chain.
    async fn apply_emergency_chain(&self) -> Result<()>;

    /// Remove all emergency rules. Best-effort teardown.
    async fn clear_emergency_rules(&self);
}

/// Service lifecycle management.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Stop non-critical services in the given zones.
    async fn stop_non_critical(&self, zones: ZoneMask) -> Result<()>;

    /// Stop the primary instance of a critical service.
    async fn stop_primary(&self, service: &str) -> Result<()>;

    /// Start the backup instance of a critical service.
    async fn start_backup(&self, service: &str) -> Result<()>;

    /// Stop any emergency services left running. Best-effort teardown.
    async fn stop_emergency_services(&self);
}

/// Surveillance camera control.
#[async_trait]
pub trait SurveillanceControl: Send + Sync {
    /// Raise monitoring coverage in the given zones.
    async fn enhance_coverage(&self, zones: ZoneMask) -> Result<()>;
}

/// Evacuation route and signaling control.
#[async_trait]
pub trait EvacuationControl: Send + Sync {
    /// Unlock the evacuation routes through the given zones.
    async fn unlock_routes(&self, zones: ZoneMask) -> Result<()>;

    /// Switch on evacuation guidance lighting. Fire-and-forget: the
    /// lighting loop cannot report failure.
    async fn activate_lights(&self, zones: ZoneMask);
}

/// Facility power control.
#[async_trait]
pub trait PowerControl: Send + Sync {
    /// Power down non-essential systems in the given zones. Fire-and-forget.
    async fn shed_non_essential(&self, zones: ZoneMask);
}

/// Communication routing control.
#[async_trait]
pub trait CommsControl: Send + Sync {
    /// Switch facility communications to the emergency channel.
    /// Fire-and-forget; global, not zone-scoped.
    async fn enable_emergency_channel(&self);
}

/// Backup system activation.
#[async_trait]
pub trait BackupControl: Send + Sync {
    /// Activate emergency backups at the given severity.
    async fn activate(&self, severity: u8) -> Result<()>;
}

/// Composite containment and recovery sequences.
///
/// These subsystems consume the whole request; their internal sequencing is
/// opaque to the engine.
#[async_trait]
pub trait ContainmentControl: Send + Sync {
    /// Execute partial containment measures.
    async fn partial_containment(&self, request: &ResponseRequest) -> Result<()>;

    /// Execute the full recovery sequence.
    async fn recovery_sequence(&self, request: &ResponseRequest) -> Result<()>;
}
