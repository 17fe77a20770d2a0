// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Response handlers: one fixed sub-operation sequence per response type.
//!
//! Shared policy: every declared sub-operation runs regardless of earlier
//! failures, each is recorded as an ordered [`SubOpOutcome`], and the
//! handler result is the code of the last failing sub-operation.

use std::time::Duration;

use tracing::{error, info, warn};

use super::{HandlerRun, ResponseRequest, SubOpOutcome};
use crate::actuators::{
    AccessControl, Actuators, BackupControl, CommsControl, ContainmentControl, EvacuationControl,
    NetworkControl, PowerControl, ServiceControl, SurveillanceControl,
};
use crate::config::FailoverConfig;

/// Full facility lockdown: lock access, isolate the network, stop
/// non-critical services, raise surveillance.
pub(crate) async fn lockdown(actuators: &Actuators, request: &ResponseRequest) -> HandlerRun {
    info!(
        "executing full lockdown sequence, severity {}",
        request.severity
    );
    let mut run = HandlerRun::new();

    match actuators
        .access
        .lock_zones(request.target_zones, request.duration_secs)
        .await
    {
        Ok(()) => {
            info!("physical access locked, zones {}", request.target_zones);
            run.record(SubOpOutcome::success("access.lock_zones"));
        }
        Err(e) => {
            error!("physical access lock failed: {e:#}");
            run.record(SubOpOutcome::failed("access.lock_zones", -1, &e));
        }
    }

    match actuators
        .network
        .isolate_segments(request.target_zones, request.severity)
        .await
    {
        Ok(()) => {
            info!("network segments isolated");
            run.record(SubOpOutcome::success("network.isolate_segments"));
        }
        Err(e) => {
            error!("network isolation failed: {e:#}");
            run.record(SubOpOutcome::failed("network.isolate_segments", -2, &e));
        }
    }

    match actuators.services.stop_non_critical(request.target_zones).await {
        Ok(()) => {
            info!("non-critical services stopped");
            run.record(SubOpOutcome::success("services.stop_non_critical"));
        }
        Err(e) => {
            error!("service stop failed: {e:#}");
            run.record(SubOpOutcome::failed("services.stop_non_critical", -3, &e));
        }
    }

    // Surveillance failure is advisory only; it never sets the result code.
    match actuators
        .surveillance
        .enhance_coverage(request.target_zones)
        .await
    {
        Ok(()) => {
            info!("surveillance coverage enhanced");
            run.record(SubOpOutcome::success("surveillance.enhance_coverage"));
        }
        Err(e) => {
            warn!("surveillance enhancement failed: {e:#}");
            run.record(SubOpOutcome::warning("surveillance.enhance_coverage", &e));
        }
    }

    info!(
        "lockdown sequence finished: {}/{} operations succeeded",
        run.success_count(),
        run.total()
    );
    run
}

/// Network isolation: one rule per targeted zone, then the aggregate
/// emergency chain. A failing zone never stops the remaining zones.
pub(crate) async fn network_isolation(
    actuators: &Actuators,
    request: &ResponseRequest,
) -> HandlerRun {
    info!(
        "executing network isolation, target zones {}",
        request.target_zones
    );
    let mut run = HandlerRun::new();

    // Chain preparation was unchecked in the reference sequence.
    match actuators.network.prepare_emergency_chain().await {
        Ok(()) => run.record(SubOpOutcome::success("network.prepare_emergency_chain")),
        Err(e) => {
            warn!("emergency chain preparation failed: {e:#}");
            run.record(SubOpOutcome::warning("network.prepare_emergency_chain", &e));
        }
    }

    for zone in request.target_zones.iter() {
        let operation = format!("network.isolate_zone[{zone}]");
        match actuators.network.isolate_zone(zone, request.severity).await {
            Ok(()) => run.record(SubOpOutcome::success(operation)),
            Err(e) => {
                error!("isolation of zone {zone} failed: {e:#}");
                run.record(SubOpOutcome::failed(operation, -1, &e));
            }
        }
    }

    match actuators.network.apply_emergency_chain().await {
        Ok(()) => run.record(SubOpOutcome::success("network.apply_emergency_chain")),
        Err(e) => {
            warn!("emergency chain activation failed: {e:#}");
            run.record(SubOpOutcome::warning("network.apply_emergency_chain", &e));
        }
    }

    info!("network isolation finished");
    run
}

/// Critical service failover: stop each primary, start its backup, settle,
/// then move to the next service. Zones and severity are not consulted.
pub(crate) async fn service_failover(
    actuators: &Actuators,
    failover: &FailoverConfig,
) -> HandlerRun {
    info!("executing service failover");
    let mut run = HandlerRun::new();

    for service in &failover.critical_services {
        match actuators.services.stop_primary(service).await {
            Ok(()) => {
                info!("primary service {service} stopped");
                run.record(SubOpOutcome::success(format!(
                    "services.stop_primary[{service}]"
                )));
            }
            Err(e) => {
                error!("failed to stop primary service {service}: {e:#}");
                run.record(SubOpOutcome::failed(
                    format!("services.stop_primary[{service}]"),
                    -1,
                    &e,
                ));
            }
        }

        match actuators.services.start_backup(service).await {
            Ok(()) => {
                info!("backup service for {service} started");
                run.record(SubOpOutcome::success(format!(
                    "services.start_backup[{service}]"
                )));
            }
            Err(e) => {
                error!("failed to start backup for {service}: {e:#}");
                run.record(SubOpOutcome::failed(
                    format!("services.start_backup[{service}]"),
                    -2,
                    &e,
                ));
            }
        }

        tokio::time::sleep(Duration::from_millis(failover.settle_ms)).await;
    }

    run
}

/// Emergency evacuation: unlock the routes, then fire the signaling chain.
/// Lighting, power shed and comms cannot report failure.
pub(crate) async fn evacuation(actuators: &Actuators, request: &ResponseRequest) -> HandlerRun {
    info!("executing emergency evacuation protocol");
    let mut run = HandlerRun::new();

    match actuators.evacuation.unlock_routes(request.target_zones).await {
        Ok(()) => run.record(SubOpOutcome::success("evacuation.unlock_routes")),
        Err(e) => {
            error!("evacuation route unlock failed: {e:#}");
            run.record(SubOpOutcome::failed("evacuation.unlock_routes", -1, &e));
        }
    }

    actuators
        .evacuation
        .activate_lights(request.target_zones)
        .await;
    run.record(SubOpOutcome::success("evacuation.activate_lights"));

    actuators.power.shed_non_essential(request.target_zones).await;
    run.record(SubOpOutcome::success("power.shed_non_essential"));

    actuators.comms.enable_emergency_channel().await;
    run.record(SubOpOutcome::success("comms.enable_emergency_channel"));

    info!("evacuation protocol finished");
    run
}

/// Backup system activation, scaled by severity alone.
pub(crate) async fn backup_activation(
    actuators: &Actuators,
    request: &ResponseRequest,
) -> HandlerRun {
    let mut run = HandlerRun::new();
    match actuators.backups.activate(request.severity).await {
        Ok(()) => run.record(SubOpOutcome::success("backups.activate")),
        Err(e) => {
            error!("emergency backup activation failed: {e:#}");
            run.record(SubOpOutcome::failed("backups.activate", -1, &e));
        }
    }
    run
}

/// Partial containment: one composite call, whole request passed through.
pub(crate) async fn partial_containment(
    actuators: &Actuators,
    request: &ResponseRequest,
) -> HandlerRun {
    let mut run = HandlerRun::new();
    match actuators.containment.partial_containment(request).await {
        Ok(()) => run.record(SubOpOutcome::success("containment.partial_containment")),
        Err(e) => {
            error!("partial containment failed: {e:#}");
            run.record(SubOpOutcome::failed(
                "containment.partial_containment",
                -1,
                &e,
            ));
        }
    }
    run
}

/// Full recovery: one composite call, whole request passed through.
pub(crate) async fn recovery(actuators: &Actuators, request: &ResponseRequest) -> HandlerRun {
    let mut run = HandlerRun::new();
    match actuators.containment.recovery_sequence(request).await {
        Ok(()) => run.record(SubOpOutcome::success("containment.recovery_sequence")),
        Err(e) => {
            error!("recovery sequence failed: {e:#}");
            run.record(SubOpOutcome::failed("containment.recovery_sequence", -1, &e));
        }
    }
    run
}
