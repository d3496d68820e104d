// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stateful ADT/BW HTTP session kernel: CSRF handling, cookie jar, and
//! async-operation polling.

pub mod config;
pub mod kernel;
pub mod poll;
pub mod state;

pub use config::SessionConfig;
pub use kernel::AdtSession;
pub use poll::PollResult;
pub use state::SessionState;
