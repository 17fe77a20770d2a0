//! Integrated response execution engine: dispatch, serialization, reporting.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::event_bus::EventBus;
use super::lifecycle::{InitError, LifecycleManager};
use crate::actuators::{Actuators, FacilityHardware};
use crate::config::{Config, ConfigError, FailoverConfig, SystemConfig};
use crate::response::{
    codes, handlers, validate, ExecutionReport, ResponseRequest, ResponseType, SystemMode,
};

/// Execution failure surfaced by [`ResponseEngine::execute`]. The wire code
/// is always mirrored in the execution report.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The engine has not been initialized
    #[error("response system not initialized")]
    NotInitialized,

    /// The request failed structural validation
    #[error("invalid response parameters")]
    InvalidRequest,

    /// No handler is registered for the requested response type
    #[error("no handler registered for response type")]
    UnknownResponseType,

    /// The handler ran and at least one sub-operation failed
    #[error("response completed with failures (code {0})")]
    Handler(i32),
}

impl ExecutionError {
    /// Wire-level result code recorded in the report.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized => codes::INIT_FAILED,
            Self::InvalidRequest => codes::INVALID_PARAM,
            Self::UnknownResponseType => codes::CRITICAL_FAILURE,
            Self::Handler(code) => *code,
        }
    }
}

/// Integrated response execution engine.
///
/// Owns the serialization lock and the single live execution report. One
/// engine per process is typical, but nothing prevents independent engines
/// over separate actuator bundles (tests rely on this).
pub struct ResponseEngine {
    actuators: Actuators,
    events: Arc<EventBus>,
    lifecycle: LifecycleManager,
    failover: FailoverConfig,
    system: RwLock<SystemConfig>,

    // Held for the full duration of every execute() call; response bodies
    // are strictly serialized process-wide.
    exec_lock: Mutex<()>,
    // Guards the one-time init/cleanup transitions.
    state_lock: Mutex<()>,

    report: RwLock<ExecutionReport>,
    mode: RwLock<SystemMode>,
    initialized: AtomicBool,
    emergency_mode: AtomicBool,
    current_level: AtomicU8,
}

impl ResponseEngine {
    /// Engine over the given actuator bundle, configured from `config`.
    pub fn new(actuators: Actuators, config: &Config) -> Self {
        Self {
            actuators,
            events: Arc::new(EventBus::new(64)),
            lifecycle: LifecycleManager::new(),
            failover: config.failover.clone(),
            system: RwLock::new(config.system.clone()),
            exec_lock: Mutex::new(()),
            state_lock: Mutex::new(()),
            report: RwLock::new(ExecutionReport::default()),
            mode: RwLock::new(SystemMode::Normal),
            initialized: AtomicBool::new(false),
            emergency_mode: AtomicBool::new(false),
            current_level: AtomicU8::new(0),
        }
    }

    /// The engine's event bus, for observers.
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Initialize all subsystems: hardware readiness, network, access
    /// control, in that order. Idempotent; a second call while initialized
    /// is a no-op returning success.
    pub async fn initialize(&self) -> Result<(), InitError> {
        let _guard = self.state_lock.lock().await;
        if self.initialized.load(Ordering::SeqCst) {
            debug!("response system already initialized");
            return Ok(());
        }

        info!("initializing integrated response system...");
        self.lifecycle.startup(&self.actuators).await?;

        self.initialized.store(true, Ordering::SeqCst);
        self.emergency_mode.store(false, Ordering::SeqCst);
        self.current_level.store(0, Ordering::SeqCst);
        *self.mode.write() = SystemMode::Normal;

        info!("integrated response system ready");
        Ok(())
    }

    /// Execute one integrated response.
    ///
    /// Requires an initialized engine. Holds the serialization lock for the
    /// whole call, resets the shared report, dispatches to the handler for
    /// the request's type and aggregates its outcomes. The lock is released
    /// on every exit path. The returned error's `code()` always equals
    /// `report.overall_result`.
    pub async fn execute(&self, request: &ResponseRequest) -> Result<(), ExecutionError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(ExecutionError::NotInitialized);
        }

        let _guard = self.exec_lock.lock().await;

        // Full recovery runs under the recovery posture.
        if request.response_type == ResponseType::FullRecovery {
            self.set_mode(SystemMode::Recovery);
        }
        let mode = *self.mode.read();

        *self.report.write() = ExecutionReport::begin(request, mode);
        self.events
            .publish_started(request.response_id(), request.response_type);

        info!("=== integrated response execution ===");
        info!("trigger: {}", request.trigger_event);
        info!(
            "type: {:?}, severity: {}, target zones: {}",
            request.response_type, request.severity, request.target_zones
        );

        if !validate(request) {
            self.report.write().finalize_failure(
                codes::INVALID_PARAM,
                "invalid response parameters",
                None,
            );
            self.publish_final_report();
            return Err(ExecutionError::InvalidRequest);
        }

        let run = match request.response_type {
            ResponseType::Lockdown => Some((
                handlers::lockdown(&self.actuators, request).await,
                "full lockdown sequence complete",
            )),
            ResponseType::NetworkIsolate => Some((
                handlers::network_isolation(&self.actuators, request).await,
                "network isolation complete",
            )),
            ResponseType::ServiceFailover => Some((
                handlers::service_failover(&self.actuators, &self.failover).await,
                "service failover complete",
            )),
            ResponseType::Evacuation => Some((
                handlers::evacuation(&self.actuators, request).await,
                "evacuation protocol complete",
            )),
            ResponseType::BackupActivate => Some((
                handlers::backup_activation(&self.actuators, request).await,
                "emergency backup activation complete",
            )),
            ResponseType::PartialContain => Some((
                handlers::partial_containment(&self.actuators, request).await,
                "partial containment complete",
            )),
            ResponseType::FullRecovery => Some((
                handlers::recovery(&self.actuators, request).await,
                "full recovery sequence complete",
            )),
            ResponseType::CommsPriority => None,
        };

        let outcome = match run {
            Some((run, summary)) => {
                let code = run.overall_code();
                self.report.write().finalize(run, summary);
                if code == codes::SUCCESS {
                    Ok(())
                } else {
                    Err(ExecutionError::Handler(code))
                }
            }
            None => {
                warn!(
                    "no handler registered for response type {:?}",
                    request.response_type
                );
                self.report.write().finalize_failure(
                    codes::CRITICAL_FAILURE,
                    "unknown response type",
                    None,
                );
                Err(ExecutionError::UnknownResponseType)
            }
        };

        if outcome.is_ok() {
            self.apply_mode_transition(request.response_type);
        }

        self.publish_final_report();
        info!(
            "=== response execution finished, result {} ===",
            self.report.read().overall_result
        );
        outcome
    }

    /// Snapshot of the most recent execution report.
    ///
    /// Never blocks on an in-flight execution; until a running call
    /// finalizes, readers observe the report as last written.
    pub fn last_report(&self) -> ExecutionReport {
        self.report.read().clone()
    }

    /// Trigger the emergency override: immediately flags emergency mode and
    /// launches a maximal-severity all-zones lockdown on a background task.
    ///
    /// The caller is never blocked; the returned handle may be awaited for
    /// the result code or dropped outright. The background task contends on
    /// the same serialization lock as every other execution. Returns `None`
    /// when the override is disabled by configuration.
    pub fn emergency_sequence(self: Arc<Self>, level: u8) -> Option<JoinHandle<i32>> {
        if !self.system.read().enable_emergency_override {
            warn!("emergency override disabled by configuration, ignoring level {level} trigger");
            return None;
        }

        warn!("emergency sequence triggered, level {level}");
        self.emergency_mode.store(true, Ordering::SeqCst);
        self.current_level.store(level, Ordering::SeqCst);
        self.set_mode(SystemMode::Emergency);
        self.events.publish_emergency(level);

        let engine = self;
        Some(tokio::spawn(async move {
            let request = ResponseRequest::emergency_lockdown(level);
            let code = match engine.execute(&request).await {
                Ok(()) => codes::SUCCESS,
                Err(e) => {
                    error!("emergency lockdown finished with failures: {e}");
                    e.code()
                }
            };

            if engine.system.read().enable_auto_recovery {
                info!("auto recovery enabled, chaining full recovery");
                let recovery = ResponseRequest::new(
                    ResponseType::FullRecovery,
                    level.clamp(1, 10),
                    crate::response::ZoneMask::all(),
                    "automatic recovery after emergency lockdown",
                );
                if let Err(e) = engine.execute(&recovery).await {
                    error!("automatic recovery failed: {e}");
                }
            }

            code
        }))
    }

    /// True iff the engine is initialized, not in emergency mode, and the
    /// hardware readiness probe currently passes. The probe is re-evaluated
    /// on every call.
    pub async fn subsystem_ready(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
            && !self.emergency_mode.load(Ordering::SeqCst)
            && self.actuators.hardware.readiness_check().await
    }

    /// Replace the operator policy configuration.
    pub fn update_config(&self, config: SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.system.write() = config;
        info!("system configuration updated");
        Ok(())
    }

    /// Current operator policy configuration.
    pub fn system_config(&self) -> SystemConfig {
        self.system.read().clone()
    }

    /// Current operating mode.
    pub fn system_status(&self) -> SystemMode {
        *self.mode.read()
    }

    /// Whether emergency mode is currently flagged.
    pub fn emergency_mode(&self) -> bool {
        self.emergency_mode.load(Ordering::SeqCst)
    }

    /// Declared level of the active emergency, 0 when none.
    pub fn emergency_level(&self) -> u8 {
        self.current_level.load(Ordering::SeqCst)
    }

    /// Structural validation of a request, without executing it.
    pub fn validate_parameters(&self, request: &ResponseRequest) -> bool {
        validate(request)
    }

    /// Tear down all subsystems and clear the initialized flag. Safe no-op
    /// on an uninitialized engine.
    pub async fn cleanup(&self) {
        let _guard = self.state_lock.lock().await;
        if !self.initialized.load(Ordering::SeqCst) {
            return;
        }

        info!("cleaning up response system resources...");
        self.lifecycle.teardown(&self.actuators).await;

        self.initialized.store(false, Ordering::SeqCst);
        self.emergency_mode.store(false, Ordering::SeqCst);
        self.current_level.store(0, Ordering::SeqCst);
        *self.mode.write() = SystemMode::Normal;

        info!("resource cleanup complete");
    }

    /// Periodic readiness probe on the configured health-check interval.
    /// Publishes a health event per tick until the shutdown signal fires.
    pub async fn run_health_monitor(&self, mut shutdown: broadcast::Receiver<()>) {
        let interval_secs = u64::from(self.system.read().health_check_interval_secs.max(1));
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        info!("health monitor started, interval {interval_secs}s");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ready = self.subsystem_ready().await;
                    if !ready {
                        warn!("subsystem readiness check failed");
                    }
                    self.events.publish_health(ready);
                }
                _ = shutdown.recv() => {
                    info!("health monitor shutting down...");
                    break;
                }
            }
        }
    }

    fn publish_final_report(&self) {
        let snapshot = self.report.read().clone();
        self.events.publish_report(snapshot);
    }

    fn set_mode(&self, mode: SystemMode) {
        let mut current = self.mode.write();
        if *current != mode {
            *current = mode;
            drop(current);
            info!("system mode changed to {mode:?}");
            self.events.publish_mode(mode);
        }
    }

    // Posture transitions applied after a fully successful execution.
    fn apply_mode_transition(&self, response_type: ResponseType) {
        match response_type {
            ResponseType::Lockdown => self.set_mode(SystemMode::Lockdown),
            ResponseType::PartialContain => self.set_mode(SystemMode::HeightenedSecurity),
            ResponseType::FullRecovery => {
                self.emergency_mode.store(false, Ordering::SeqCst);
                self.current_level.store(0, Ordering::SeqCst);
                self.set_mode(SystemMode::Normal);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::SimulatedFacility;
    use crate::response::{SubOpStatus, ZoneMask};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.failover.settle_ms = 1;
        config
    }

    fn engine_with(sim: SimulatedFacility) -> (Arc<ResponseEngine>, Arc<SimulatedFacility>) {
        let sim = Arc::new(sim);
        let engine = Arc::new(ResponseEngine::new(
            Actuators::from_simulator(sim.clone()),
            &test_config(),
        ));
        (engine, sim)
    }

    fn lockdown_request() -> ResponseRequest {
        let mut request = ResponseRequest::new(
            ResponseType::Lockdown,
            10,
            ZoneMask::all(),
            "engine test",
        );
        request.duration_secs = 3600;
        request
    }

    #[tokio::test]
    async fn full_success_lockdown_report() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        engine.execute(&lockdown_request()).await.unwrap();

        let report = engine.last_report();
        assert_eq!(report.overall_result, 0);
        assert_eq!(report.status_summary, "full lockdown sequence complete");
        assert_eq!(report.sub_operations, 4);
        assert_eq!(report.success_count, 4);
        assert_eq!(report.failed_count, 0);
        assert!(report.start_time.is_some());
        assert!(report.end_time.is_some());
        assert_eq!(engine.system_status(), SystemMode::Lockdown);
    }

    #[tokio::test]
    async fn execute_requires_initialization() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        let err = engine.execute(&lockdown_request()).await.unwrap_err();
        assert_eq!(err.code(), codes::INIT_FAILED);
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();
        engine.initialize().await.unwrap();

        // The second call must not re-run the startup sequence.
        assert_eq!(sim.call_count("network.initialize"), 1);
        assert_eq!(sim.call_count("access.initialize"), 1);
    }

    #[tokio::test]
    async fn lock_released_after_handler_failure() {
        let (engine, _sim) = engine_with(
            SimulatedFacility::healthy()
                .fail_operation("access.lock_zones")
                .fail_operation("services.stop_non_critical"),
        );
        engine.initialize().await.unwrap();

        let err = engine.execute(&lockdown_request()).await.unwrap_err();
        // Operations 1 and 3 failed; the last failure wins.
        assert_eq!(err.code(), -3);
        assert_eq!(engine.last_report().overall_result, -3);

        // A second execution must proceed immediately (lock was released).
        engine
            .execute(&ResponseRequest::new(
                ResponseType::BackupActivate,
                5,
                ZoneMask::none(),
                "engine test",
            ))
            .await
            .unwrap();
        assert_eq!(engine.last_report().overall_result, 0);
    }

    #[tokio::test]
    async fn invalid_request_records_invalid_param() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();
        let init_calls = sim.calls().len();

        let request =
            ResponseRequest::new(ResponseType::NetworkIsolate, 5, ZoneMask::none(), "bad");
        let err = engine.execute(&request).await.unwrap_err();
        assert_eq!(err.code(), codes::INVALID_PARAM);
        assert_eq!(engine.last_report().overall_result, codes::INVALID_PARAM);
        // No actuation happened.
        assert_eq!(sim.calls().len(), init_calls);
    }

    #[tokio::test]
    async fn comms_priority_takes_unknown_type_path() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();
        let init_calls = sim.calls().len();

        let request = ResponseRequest::new(
            ResponseType::CommsPriority,
            5,
            ZoneMask::none(),
            "engine test",
        );
        let err = engine.execute(&request).await.unwrap_err();
        assert_eq!(err.code(), codes::CRITICAL_FAILURE);

        let report = engine.last_report();
        assert_eq!(report.overall_result, -99);
        assert_eq!(report.status_summary, "unknown response type");
        assert_eq!(sim.calls().len(), init_calls);
    }

    #[tokio::test]
    async fn network_isolation_processes_every_zone() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy().fail_zone(2));
        engine.initialize().await.unwrap();

        let zones = ZoneMask(0b10110);
        let request =
            ResponseRequest::new(ResponseType::NetworkIsolate, 7, zones, "engine test");
        let err = engine.execute(&request).await.unwrap_err();
        assert_eq!(err.code(), -1);
        assert_eq!(sim.call_count("network.isolate_zone") as u32, zones.count());

        let report = engine.last_report();
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.success_count as u32, zones.count() - 1 + 2);
    }

    #[tokio::test]
    async fn cleanup_is_safe_and_resets_readiness() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());

        // No-op on an uninitialized engine.
        engine.cleanup().await;
        assert_eq!(sim.call_count("access.restore_normal_access"), 0);

        engine.initialize().await.unwrap();
        assert!(engine.subsystem_ready().await);

        engine.cleanup().await;
        assert!(!engine.subsystem_ready().await);
        assert_eq!(sim.call_count("access.restore_normal_access"), 1);
        assert_eq!(sim.call_count("network.clear_emergency_rules"), 1);
        assert_eq!(sim.call_count("services.stop_emergency_services"), 1);
    }

    #[tokio::test]
    async fn readiness_reflects_live_hardware_state() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();
        assert!(engine.subsystem_ready().await);

        sim.set_hardware_ready(false);
        assert!(!engine.subsystem_ready().await);
        sim.set_hardware_ready(true);
        assert!(engine.subsystem_ready().await);
    }

    #[tokio::test]
    async fn concurrent_executions_never_interleave() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let lockdown_engine = engine.clone();
        let backup_engine = engine.clone();
        let lockdown = tokio::spawn(async move {
            lockdown_engine.execute(&lockdown_request()).await
        });
        let backup = tokio::spawn(async move {
            backup_engine
                .execute(&ResponseRequest::new(
                    ResponseType::BackupActivate,
                    9,
                    ZoneMask::none(),
                    "engine test",
                ))
                .await
        });

        lockdown.await.unwrap().unwrap();
        backup.await.unwrap().unwrap();

        // Whichever call finished last, the report belongs entirely to it.
        let report = engine.last_report();
        let consistent = (report.status_summary == "full lockdown sequence complete"
            && report.sub_operations == 4)
            || (report.status_summary == "emergency backup activation complete"
                && report.sub_operations == 1);
        assert!(consistent, "report mixes two executions: {report:?}");
        assert_eq!(
            report.outcomes.len() as u32,
            report.sub_operations,
            "outcome list inconsistent with counts"
        );
    }

    #[tokio::test]
    async fn emergency_sequence_flags_then_locks_down() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let handle = engine.clone().emergency_sequence(10).expect("override enabled");

        // Flags are set synchronously, before the background task runs.
        assert!(engine.emergency_mode());
        assert_eq!(engine.emergency_level(), 10);
        assert_eq!(engine.system_status(), SystemMode::Emergency);
        assert!(!engine.subsystem_ready().await);

        assert_eq!(handle.await.unwrap(), 0);
        let report = engine.last_report();
        assert_eq!(report.status_summary, "full lockdown sequence complete");
        assert_eq!(report.system_mode, SystemMode::Emergency);
        assert_eq!(engine.system_status(), SystemMode::Lockdown);
    }

    #[tokio::test]
    async fn emergency_override_can_be_disabled() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let mut system = engine.system_config();
        system.enable_emergency_override = false;
        engine.update_config(system).unwrap();

        assert!(engine.clone().emergency_sequence(10).is_none());
        assert!(!engine.emergency_mode());
    }

    #[tokio::test]
    async fn auto_recovery_chains_after_emergency() {
        let (engine, sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let mut system = engine.system_config();
        system.enable_auto_recovery = true;
        engine.update_config(system).unwrap();

        let handle = engine.clone().emergency_sequence(8).expect("override enabled");
        assert_eq!(handle.await.unwrap(), 0);

        assert_eq!(sim.call_count("containment.recovery_sequence"), 1);
        assert!(!engine.emergency_mode());
        assert_eq!(engine.system_status(), SystemMode::Normal);
        assert_eq!(
            engine.last_report().status_summary,
            "full recovery sequence complete"
        );
    }

    #[tokio::test]
    async fn recovery_runs_under_recovery_mode() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let request = ResponseRequest::new(
            ResponseType::FullRecovery,
            3,
            ZoneMask::none(),
            "engine test",
        );
        engine.execute(&request).await.unwrap();

        let report = engine.last_report();
        assert_eq!(report.system_mode, SystemMode::Recovery);
        assert_eq!(engine.system_status(), SystemMode::Normal);
    }

    #[tokio::test]
    async fn update_config_rejects_invalid_values() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        let mut system = engine.system_config();
        system.health_check_interval_secs = 0;
        assert!(engine.update_config(system).is_err());
        // The live configuration is unchanged.
        assert_eq!(engine.system_config().health_check_interval_secs, 30);
    }

    #[tokio::test]
    async fn validate_parameters_matches_validator() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        let mut request = lockdown_request();
        assert!(engine.validate_parameters(&request));
        request.severity = 11;
        assert!(!engine.validate_parameters(&request));
    }

    #[tokio::test]
    async fn evacuation_outcomes_keep_declared_order() {
        let (engine, _sim) = engine_with(SimulatedFacility::healthy());
        engine.initialize().await.unwrap();

        let request =
            ResponseRequest::new(ResponseType::Evacuation, 6, ZoneMask(0xF0), "engine test");
        engine.execute(&request).await.unwrap();

        let report = engine.last_report();
        let order: Vec<&str> = report
            .outcomes
            .iter()
            .map(|o| o.operation.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "evacuation.unlock_routes",
                "evacuation.activate_lights",
                "power.shed_non_essential",
                "comms.enable_emergency_channel",
            ]
        );
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == SubOpStatus::Success));
    }
}
