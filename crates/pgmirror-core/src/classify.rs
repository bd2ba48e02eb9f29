// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Restore diagnostic classifier.
//!
//! pg_restore reports problems as free text on stderr, and its output format
//! is not a stable contract. This module keeps all of the parsing heuristics
//! behind one narrow function, [`classify`], so they can be hardened or
//! swapped without touching the workflow controller.
//!
//! The classifier never fails on malformed input; the worst case is an
//! overly conservative [`RestoreVerdict::Critical`] with no parsed detail.

/// Marker for error lines attributed to pg_restore's own error channel,
/// as opposed to any line that happens to contain "error:".
const ERROR_MARKER: &str = "pg_restore: error:";

/// Attributed error lines containing any of these are benign: they reflect
/// restoring into a target with a different role/ownership setup and do not
/// indicate data loss.
const BENIGN_MARKERS: [&str; 4] = [
    "must be owner",
    "permission denied",
    "role",
    "does not exist",
];

/// Summary line pg_restore prints when it ignored errors.
const IGNORED_SUMMARY_MARKER: &str = "errors ignored on restore:";

/// How many critical lines get surfaced to the operator; the rest are
/// reported as a count.
pub const MAX_REPORTED_ERRORS: usize = 5;

/// Structured judgment of one restore run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreVerdict {
    /// Clean exit, no critical errors.
    Ok,
    /// Exit code 1 with a nonzero "errors ignored on restore" count;
    /// usually permission noise, data is intact.
    OkWithWarnings(u32),
    /// At least one non-benign attributed error line, or an unclassifiable
    /// nonzero exit (in which case the list is empty).
    Critical(Vec<String>),
}

impl RestoreVerdict {
    /// The single success boolean the workflow controller observes.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Critical(_))
    }
}

/// Classify a restore run from its full stderr text and exit code.
pub fn classify(diagnostics: &str, exit_code: i32) -> RestoreVerdict {
    let mut critical: Vec<String> = Vec::new();
    let mut ignored_count: u32 = 0;

    for line in diagnostics.lines() {
        let lower = line.to_lowercase();

        if lower.contains(ERROR_MARKER)
            && !BENIGN_MARKERS.iter().any(|marker| lower.contains(marker))
        {
            critical.push(line.trim().to_string());
        }

        if lower.contains(IGNORED_SUMMARY_MARKER) {
            // Trailing integer after the last ':'; a parse failure is
            // tolerated and counts as zero.
            ignored_count = line
                .rsplit(':')
                .next()
                .and_then(|tail| tail.trim().parse().ok())
                .unwrap_or(0);
        }
    }

    if !critical.is_empty() {
        return RestoreVerdict::Critical(critical);
    }
    if exit_code == 0 {
        return RestoreVerdict::Ok;
    }
    if exit_code == 1 && ignored_count > 0 {
        return RestoreVerdict::OkWithWarnings(ignored_count);
    }
    // Neither a clean exit nor the known warning shape. Collapse to a
    // detail-free critical verdict so the controller's boolean stays simple.
    RestoreVerdict::Critical(Vec::new())
}
