// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Structural validation of response requests.

use tracing::warn;

use super::ResponseRequest;

/// Check that a request is structurally valid: severity and authorization
/// level within their declared ranges, and a non-empty zone mask for
/// zone-scoped response types. Invalid requests never reach a handler.
///
/// No side effects beyond a diagnostic log line.
pub fn validate(request: &ResponseRequest) -> bool {
    if request.severity < 1 || request.severity > 10 {
        warn!(
            "rejecting request: severity {} outside 1-10",
            request.severity
        );
        return false;
    }

    if request.auth_level < 1 || request.auth_level > 5 {
        warn!(
            "rejecting request: auth level {} outside 1-5",
            request.auth_level
        );
        return false;
    }

    if request.response_type.is_zone_scoped() && request.target_zones.is_empty() {
        warn!(
            "rejecting request: {} requires a target zone mask",
            request.response_type.label()
        );
        return false;
    }

    true
}
