// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Execution reporting: per-sub-operation outcomes and the aggregated
//! report for the most recently executed response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{codes, ResponseRequest, SystemMode};

/// Result of one sub-operation within a handler sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubOpStatus {
    /// Actuator call succeeded
    Success,
    /// Actuator call failed and contributes to the overall result code
    Failed,
    /// Actuator call failed but is advisory only (does not affect the
    /// overall result code)
    Warning,
}

/// One entry of a handler's ordered sub-operation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubOpOutcome {
    /// Actuator operation name, e.g. `network.isolate_zone[7]`
    pub operation: String,
    /// Outcome classification
    pub status: SubOpStatus,
    /// Handler-local result code; 0 unless `status` is `Failed`
    pub code: i32,
    /// Error detail for failed or warning outcomes
    pub detail: Option<String>,
}

impl SubOpOutcome {
    /// Successful sub-operation.
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: SubOpStatus::Success,
            code: codes::SUCCESS,
            detail: None,
        }
    }

    /// Failed sub-operation carrying its handler-local code.
    pub fn failed(operation: impl Into<String>, code: i32, err: &anyhow::Error) -> Self {
        Self {
            operation: operation.into(),
            status: SubOpStatus::Failed,
            code,
            detail: Some(format!("{err:#}")),
        }
    }

    /// Advisory failure that must not alter the handler result code.
    pub fn warning(operation: impl Into<String>, err: &anyhow::Error) -> Self {
        Self {
            operation: operation.into(),
            status: SubOpStatus::Warning,
            code: codes::SUCCESS,
            detail: Some(format!("{err:#}")),
        }
    }
}

/// Ordered record of every sub-operation a handler executed.
///
/// Handlers never short-circuit: each declared sub-operation runs and is
/// recorded here regardless of earlier failures.
#[derive(Debug, Default)]
pub struct HandlerRun {
    /// Outcomes in execution order
    pub outcomes: Vec<SubOpOutcome>,
}

impl HandlerRun {
    /// Empty run record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome.
    pub fn record(&mut self, outcome: SubOpOutcome) {
        self.outcomes.push(outcome);
    }

    /// Overall handler result: the code of the most recently failed
    /// sub-operation, or 0 when nothing failed. Last failure wins; earlier
    /// failure codes are masked. This mirrors the established report
    /// contract (see DESIGN.md) and is asserted by tests.
    pub fn overall_code(&self) -> i32 {
        self.outcomes
            .iter()
            .rev()
            .find(|o| o.status == SubOpStatus::Failed)
            .map(|o| o.code)
            .unwrap_or(codes::SUCCESS)
    }

    /// Total sub-operations executed.
    pub fn total(&self) -> u32 {
        self.outcomes.len() as u32
    }

    /// Count of successful sub-operations.
    pub fn success_count(&self) -> u32 {
        self.count(SubOpStatus::Success)
    }

    /// Count of failed sub-operations.
    pub fn failed_count(&self) -> u32 {
        self.count(SubOpStatus::Failed)
    }

    /// Count of advisory failures.
    pub fn warning_count(&self) -> u32 {
        self.count(SubOpStatus::Warning)
    }

    fn count(&self, status: SubOpStatus) -> u32 {
        self.outcomes.iter().filter(|o| o.status == status).count() as u32
    }
}

/// Aggregated record of the most recently executed response.
///
/// There is exactly one live report per engine; it is reset at the start of
/// every execution and fully overwritten during that call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutionReport {
    /// Identifier derived from the request creation time
    pub response_id: u64,
    /// 0 on full success, otherwise the code of the last failing
    /// sub-operation (or an engine-level error code)
    pub overall_result: i32,
    /// Execution start time
    pub start_time: Option<DateTime<Utc>>,
    /// Execution end time
    pub end_time: Option<DateTime<Utc>>,
    /// Total number of sub-operations executed
    pub sub_operations: u32,
    /// Number of successful sub-operations
    pub success_count: u32,
    /// Number of failed sub-operations
    pub failed_count: u32,
    /// Number of sub-operations with advisory failures
    pub warning_count: u32,
    /// Operating mode in effect during execution
    pub system_mode: SystemMode,
    /// Human-readable status summary
    pub status_summary: String,
    /// Detailed error information, if any
    pub error_details: Option<String>,
    /// Ordered per-sub-operation outcomes
    pub outcomes: Vec<SubOpOutcome>,
}

impl ExecutionReport {
    /// Fresh report for a starting execution: everything zeroed except the
    /// identity and start stamps.
    pub fn begin(request: &ResponseRequest, mode: SystemMode) -> Self {
        Self {
            response_id: request.response_id(),
            start_time: Some(Utc::now()),
            system_mode: mode,
            ..Self::default()
        }
    }

    /// Fold a completed handler run into the report.
    pub fn finalize(&mut self, run: HandlerRun, summary: &str) {
        self.overall_result = run.overall_code();
        self.sub_operations = run.total();
        self.success_count = run.success_count();
        self.failed_count = run.failed_count();
        self.warning_count = run.warning_count();
        self.status_summary = summary.to_string();
        self.error_details = collect_details(&run.outcomes);
        self.outcomes = run.outcomes;
        self.end_time = Some(Utc::now());
    }

    /// Close the report without any handler having run (validation failure,
    /// unknown response type).
    pub fn finalize_failure(&mut self, code: i32, summary: &str, detail: Option<String>) {
        self.overall_result = code;
        self.status_summary = summary.to_string();
        self.error_details = detail;
        self.end_time = Some(Utc::now());
    }
}

fn collect_details(outcomes: &[SubOpOutcome]) -> Option<String> {
    let details: Vec<String> = outcomes
        .iter()
        .filter(|o| o.status != SubOpStatus::Success)
        .filter_map(|o| o.detail.as_ref().map(|d| format!("{}: {}", o.operation, d)))
        .collect();

    if details.is_empty() {
        None
    } else {
        Some(details.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ResponseType, ZoneMask};

    fn failed(op: &str, code: i32) -> SubOpOutcome {
        SubOpOutcome::failed(op, code, &anyhow::anyhow!("simulated"))
    }

    #[test]
    fn last_failure_wins() {
        let mut run = HandlerRun::new();
        run.record(failed("one", -1));
        run.record(SubOpOutcome::success("two"));
        run.record(failed("three", -3));
        assert_eq!(run.overall_code(), -3);
    }

    #[test]
    fn warnings_do_not_set_result() {
        let mut run = HandlerRun::new();
        run.record(SubOpOutcome::success("one"));
        run.record(SubOpOutcome::warning("two", &anyhow::anyhow!("degraded")));
        assert_eq!(run.overall_code(), 0);
        assert_eq!(run.warning_count(), 1);
    }

    #[test]
    fn report_counts_match_outcomes() {
        let request = ResponseRequest::new(
            ResponseType::Lockdown,
            5,
            ZoneMask(0xF),
            "unit test",
        );
        let mut report = ExecutionReport::begin(&request, SystemMode::Normal);
        assert_eq!(report.response_id, request.response_id());

        let mut run = HandlerRun::new();
        run.record(SubOpOutcome::success("one"));
        run.record(failed("two", -2));
        run.record(SubOpOutcome::warning("three", &anyhow::anyhow!("degraded")));
        report.finalize(run, "unit test complete");

        assert_eq!(report.overall_result, -2);
        assert_eq!(report.sub_operations, 3);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.warning_count, 1);
        assert!(report.end_time.is_some());
        let details = report.error_details.unwrap();
        assert!(details.contains("two"));
        assert!(details.contains("three"));
    }

    #[test]
    fn failure_report_without_handler() {
        let request = ResponseRequest::new(
            ResponseType::CommsPriority,
            5,
            ZoneMask::none(),
            "unit test",
        );
        let mut report = ExecutionReport::begin(&request, SystemMode::Normal);
        report.finalize_failure(super::codes::CRITICAL_FAILURE, "unknown response type", None);
        assert_eq!(report.overall_result, -99);
        assert_eq!(report.sub_operations, 0);
        assert!(report.outcomes.is_empty());
    }
}
