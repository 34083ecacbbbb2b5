// SPDX-License-Identifier: MIT

//! Environment variables the CLI honors.

/// Non-empty disables ANSI color output, alongside the standard `NO_COLOR`.
pub const NO_COLOR: &str = "NO_COLOR";
/// Forces color output even when stdout is not a TTY.
pub const FORCE_COLOR: &str = "FOREMAN_COLOR";
/// Non-empty suppresses the embedded mock backend's startup banner.
pub const NO_BANNER: &str = "FOREMAN_NO_BANNER";
/// Overrides discovery: if set, the CLI talks to this URL instead of
/// reading `control-plane/server.json`.
pub const SERVER_URL: &str = "FOREMAN_SERVER_URL";

pub fn is_set(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.is_empty())
}

pub fn server_url_override() -> Option<String> {
    std::env::var(SERVER_URL).ok().filter(|v| !v.is_empty())
}

pub fn banner_suppressed() -> bool {
    is_set(NO_BANNER)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
