// SPDX-License-Identifier: MIT OR Apache-2.0
//! Terminal values of the async-operation poll contract (§4.3).

/// Outcome of a completed poll loop. `Running` only appears internally —
/// reaching the deadline while `Running` is surfaced by the caller as a
/// `Timeout` error, never returned as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Completed(String),
    Failed(String),
    Running,
}
