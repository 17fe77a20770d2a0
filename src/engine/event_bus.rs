// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Event bus for engine observers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::response::{ExecutionReport, ResponseType, SystemMode};

/// Event kinds published by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A response execution began
    ResponseStarted,
    /// A response execution finished and its report is final
    ResponseCompleted,
    /// The emergency override path was triggered
    EmergencyTriggered,
    /// The system operating mode changed
    ModeChanged,
    /// Periodic health probe result
    Health,
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    /// Monotonic event id
    pub id: u64,
    /// Event kind
    pub kind: EventKind,
    /// Publication time
    pub timestamp: DateTime<Utc>,
    /// Event payload
    pub payload: EventPayload,
}

/// Payload carried by an [`EngineEvent`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// Execution began
    Started {
        /// Report identifier of the starting execution
        response_id: u64,
        /// Response type being executed
        response_type: ResponseType,
    },
    /// Execution finished
    Completed(ExecutionReport),
    /// Emergency override triggered at this level
    Emergency {
        /// Declared emergency level
        level: u8,
    },
    /// New operating mode
    Mode(SystemMode),
    /// Readiness probe result
    Health {
        /// Whether the subsystem reported ready
        ready: bool,
    },
}

/// Central event bus for engine observers.
///
/// Send failures (no subscribers) are deliberately ignored.
pub struct EventBus {
    report_tx: broadcast::Sender<ExecutionReport>,
    event_tx: broadcast::Sender<EngineEvent>,
    event_counter: std::sync::atomic::AtomicU64,
}

impl EventBus {
    /// Bus with the given per-channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (report_tx, _) = broadcast::channel(capacity);
        let (event_tx, _) = broadcast::channel(capacity);

        Self {
            report_tx,
            event_tx,
            event_counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Publish a finalized execution report.
    pub fn publish_report(&self, report: ExecutionReport) {
        let _ = self.report_tx.send(report.clone());
        self.publish_event(EventKind::ResponseCompleted, EventPayload::Completed(report));
    }

    /// Publish the start of an execution.
    pub fn publish_started(&self, response_id: u64, response_type: ResponseType) {
        self.publish_event(
            EventKind::ResponseStarted,
            EventPayload::Started {
                response_id,
                response_type,
            },
        );
    }

    /// Publish an emergency override trigger.
    pub fn publish_emergency(&self, level: u8) {
        self.publish_event(EventKind::EmergencyTriggered, EventPayload::Emergency { level });
    }

    /// Publish an operating mode change.
    pub fn publish_mode(&self, mode: SystemMode) {
        self.publish_event(EventKind::ModeChanged, EventPayload::Mode(mode));
    }

    /// Publish a health probe result.
    pub fn publish_health(&self, ready: bool) {
        self.publish_event(EventKind::Health, EventPayload::Health { ready });
    }

    fn publish_event(&self, kind: EventKind, payload: EventPayload) {
        let id = self
            .event_counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let event = EngineEvent {
            id,
            kind,
            timestamp: Utc::now(),
            payload,
        };
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to finalized execution reports.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<ExecutionReport> {
        self.report_tx.subscribe()
    }

    /// Subscribe to the full event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_carry_monotonic_ids() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe_events();

        bus.publish_emergency(10);
        bus.publish_mode(SystemMode::Emergency);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::EmergencyTriggered);
        assert_eq!(second.kind, EventKind::ModeChanged);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn report_channel_mirrors_completion_events() {
        let bus = EventBus::new(16);
        let mut reports = bus.subscribe_reports();
        let mut events = bus.subscribe_events();

        let mut report = ExecutionReport::default();
        report.response_id = 42;
        bus.publish_report(report);

        assert_eq!(reports.recv().await.unwrap().response_id, 42);
        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::ResponseCompleted);
    }
}
