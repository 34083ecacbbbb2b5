// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! foreman-core: shared ids, clock, and error kinds for the foreman workspace.

pub mod clock;
pub mod error;
pub mod ids;
pub mod macros;
pub mod toml_defaults;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::ErrorKind;
pub use ids::{
    short, BindingId, IdBuf, IssueId, OperatorSessionId, ProgramId, RunId, TurnId, ID_MAX_LEN,
};
