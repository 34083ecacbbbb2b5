// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! foreman-serve: the background server process — the HTTP control plane
//! over the workspace store, DAG runner, and scheduled-run controller, plus
//! the lifecycle concerns around running as a singleton per workspace
//! (writer lock, discovery record, graceful shutdown on signal or request).

pub mod config;
pub mod error;
pub mod http;
pub mod lock;
pub mod probe;
pub mod signal;

pub use config::{OperatorConfig, RunDefaults, WorkspaceConfig};
pub use error::{ServeError, ServeResult};
pub use http::AppState;
pub use lock::WriterLock;
