// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Response data model: request parameters, response types, zone masks
//! and the wire-level result codes shared with downstream tooling.

mod report;
mod validator;

pub mod handlers;

pub use report::{ExecutionReport, HandlerRun, SubOpOutcome, SubOpStatus};
pub use validator::validate;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire-level result codes carried in execution reports.
///
/// The numeric values are part of the report contract consumed by external
/// audit tooling and must not be renumbered.
pub mod codes {
    /// Operation completed successfully.
    pub const SUCCESS: i32 = 0;
    /// System initialization failed / system not initialized.
    pub const INIT_FAILED: i32 = -1;
    /// Invalid parameters provided.
    pub const INVALID_PARAM: i32 = -2;
    /// Required hardware not available.
    pub const HARDWARE_UNAVAILABLE: i32 = -3;
    /// Network operation failed.
    pub const NETWORK_FAILURE: i32 = -4;
    /// Insufficient permissions.
    pub const ACCESS_DENIED: i32 = -5;
    /// Operation timed out. Declared for the wire contract; no handler
    /// currently enforces timeouts.
    pub const TIMEOUT: i32 = -6;
    /// Critical system failure, including unhandled response types.
    pub const CRITICAL_FAILURE: i32 = -99;
}

/// Emergency response types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    /// Complete facility lockdown
    Lockdown,
    /// Network segmentation and isolation
    NetworkIsolate,
    /// Critical service failover
    ServiceFailover,
    /// Emergency evacuation procedures
    Evacuation,
    /// Backup system activation
    BackupActivate,
    /// Communication priority routing (declared; no handler registered)
    CommsPriority,
    /// Partial containment measures
    PartialContain,
    /// Full system recovery
    FullRecovery,
}

impl ResponseType {
    /// Human-readable label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lockdown => "full lockdown",
            Self::NetworkIsolate => "network isolation",
            Self::ServiceFailover => "service failover",
            Self::Evacuation => "emergency evacuation",
            Self::BackupActivate => "backup activation",
            Self::CommsPriority => "communication priority routing",
            Self::PartialContain => "partial containment",
            Self::FullRecovery => "full recovery",
        }
    }

    /// Whether this response type requires a non-empty target zone mask.
    pub const fn is_zone_scoped(&self) -> bool {
        matches!(
            self,
            Self::Lockdown | Self::NetworkIsolate | Self::Evacuation | Self::PartialContain
        )
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lockdown" => Ok(Self::Lockdown),
            "network-isolate" => Ok(Self::NetworkIsolate),
            "service-failover" => Ok(Self::ServiceFailover),
            "evacuation" => Ok(Self::Evacuation),
            "backup-activate" => Ok(Self::BackupActivate),
            "comms-priority" => Ok(Self::CommsPriority),
            "partial-contain" => Ok(Self::PartialContain),
            "full-recovery" => Ok(Self::FullRecovery),
            other => Err(format!("unknown response type '{other}'")),
        }
    }
}

/// System operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SystemMode {
    /// Normal operation
    #[default]
    Normal,
    /// Increased security posture
    HeightenedSecurity,
    /// Emergency response active
    Emergency,
    /// Full lockdown active
    Lockdown,
    /// Post-emergency recovery
    Recovery,
}

/// Bitmask of facility zones, bit *i* addressing zone *i* (32 zones total).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ZoneMask(pub u32);

impl ZoneMask {
    /// Number of addressable facility zones.
    pub const ZONE_COUNT: u8 = 32;

    /// The empty mask.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Mask covering every facility zone.
    pub const fn all() -> Self {
        Self(u32::MAX)
    }

    /// Mask covering a single zone.
    pub const fn single(zone: u8) -> Self {
        Self(1 << (zone as u32 % 32))
    }

    /// True when no zone is targeted.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether the given zone bit is set.
    pub const fn contains(&self, zone: u8) -> bool {
        zone < Self::ZONE_COUNT && self.0 & (1 << zone as u32) != 0
    }

    /// Number of targeted zones.
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the targeted zone indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..Self::ZONE_COUNT).filter(|zone| self.contains(*zone))
    }
}

impl fmt::Display for ZoneMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Parameters of one integrated response request. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRequest {
    /// Type of response to execute
    pub response_type: ResponseType,
    /// Severity level, 1-10 scale
    pub severity: u8,
    /// Bitmask of target zones
    pub target_zones: ZoneMask,
    /// How long the response effects should persist, in seconds
    pub duration_secs: u32,
    /// Required authorization level (1-5); carried for downstream audit,
    /// not enforced by the engine
    pub auth_level: u8,
    /// Event that triggered this response
    pub trigger_event: String,
    /// Request creation time
    pub timestamp: DateTime<Utc>,
    /// Retry attempts allowed; declared for wire compatibility, unenforced
    pub retry_count: u32,
    /// Operation timeout in seconds; declared for wire compatibility, unenforced
    pub timeout_secs: u16,
}

impl ResponseRequest {
    /// Build a request with the common defaults (no duration, basic auth level).
    pub fn new(
        response_type: ResponseType,
        severity: u8,
        target_zones: ZoneMask,
        trigger_event: impl Into<String>,
    ) -> Self {
        Self {
            response_type,
            severity,
            target_zones,
            duration_secs: 0,
            auth_level: 1,
            trigger_event: trigger_event.into(),
            timestamp: Utc::now(),
            retry_count: 0,
            timeout_secs: 0,
        }
    }

    /// The maximal lockdown request synthesized by the emergency override
    /// path: severity 10, all zones, one-hour hold, executive auth level.
    pub fn emergency_lockdown(level: u8) -> Self {
        Self {
            response_type: ResponseType::Lockdown,
            severity: 10,
            target_zones: ZoneMask::all(),
            duration_secs: 3600,
            auth_level: 5,
            trigger_event: format!("manual emergency trigger (level {level})"),
            timestamp: Utc::now(),
            retry_count: 0,
            timeout_secs: 0,
        }
    }

    /// Identifier stamped into the execution report, derived from the
    /// request creation time.
    pub fn response_id(&self) -> u64 {
        self.timestamp.timestamp_millis().max(0) as u64
    }
}
