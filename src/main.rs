// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! WardBarn - Integrated Facility Emergency Response Suite
//!
//! Headless coordinator for facility emergency procedures:
//! - Seven integrated response types (lockdown, isolation, failover, ...)
//! - Strictly serialized execution with a single live report
//! - Fire-and-forget emergency override path
//! - Simulated actuators for demo and drill runs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use wardbarn::engine::{EventKind, EventPayload};
use wardbarn::response::{ResponseRequest, ResponseType, ZoneMask};
use wardbarn::{Actuators, Config, ResponseEngine, VERSION};

/// WardBarn - Integrated Facility Emergency Response Suite
#[derive(Parser, Debug)]
#[command(name = "wardbarn")]
#[command(author = "WardBarn Project")]
#[command(version = VERSION)]
#[command(about = "Integrated facility emergency response coordination")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Execute one response drill (e.g. lockdown, evacuation) and print
    /// the report as JSON
    #[arg(long)]
    drill: Option<String>,

    /// Severity for the drill, 1-10
    #[arg(long, default_value_t = 5)]
    severity: u8,

    /// Target zone mask for the drill (hex or decimal)
    #[arg(long, default_value = "0xffffffff", value_parser = parse_zone_mask)]
    zones: ZoneMask,

    /// Effect duration for the drill, in seconds
    #[arg(long, default_value_t = 60)]
    duration: u32,
}

fn parse_zone_mask(s: &str) -> Result<ZoneMask, String> {
    let raw = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    raw.map(ZoneMask).map_err(|e| format!("invalid zone mask '{s}': {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🛡 WardBarn v{} - Integrated Facility Emergency Response Suite", VERSION);

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)?;
    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args))
}

async fn run(config: Config, args: Args) -> Result<()> {
    // Production bindings replace the simulator with real actuator drivers.
    let actuators = Actuators::simulated();
    let engine = Arc::new(ResponseEngine::new(actuators, &config));

    engine.initialize().await?;

    if let Some(kind) = &args.drill {
        return drill(&engine, kind, &args).await;
    }

    // Headless operation: health monitoring + event logging until Ctrl+C.
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut events = engine.event_bus().subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match (&event.kind, &event.payload) {
                (EventKind::Health, EventPayload::Health { ready }) => {
                    debug!("health probe: ready={ready}");
                }
                (kind, _) => info!("engine event: {kind:?}"),
            }
        }
    });

    let monitor_engine = engine.clone();
    let monitor_shutdown = shutdown_tx.subscribe();
    let monitor = tokio::spawn(async move {
        monitor_engine.run_health_monitor(monitor_shutdown).await;
    });

    info!("🚀 WardBarn running, press Ctrl+C to shut down");
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    let _ = shutdown_tx.send(());
    let _ = monitor.await;
    engine.cleanup().await;

    info!("WardBarn shutdown complete");
    Ok(())
}

/// Execute one simulated response and print its report.
async fn drill(engine: &Arc<ResponseEngine>, kind: &str, args: &Args) -> Result<()> {
    let response_type: ResponseType = kind.parse().map_err(|e: String| anyhow!(e))?;

    let mut request = ResponseRequest::new(
        response_type,
        args.severity,
        args.zones,
        format!("manual drill ({kind})"),
    );
    request.duration_secs = args.duration;

    match engine.execute(&request).await {
        Ok(()) => info!("drill completed successfully"),
        Err(e) => warn!("drill finished with failures: {e}"),
    }

    println!("{}", serde_json::to_string_pretty(&engine.last_report())?);

    engine.cleanup().await;
    Ok(())
}
