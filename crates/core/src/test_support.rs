// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core types.
pub mod strategies {
    use proptest::prelude::*;

    /// A short ASCII title/body-ish string, deliberately small so property
    /// tests stay fast while still exercising whitespace and punctuation.
    pub fn arb_short_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{1,24}"
    }

    /// A small tag-like token (lowercase, colon-separated namespace allowed).
    pub fn arb_tag() -> impl Strategy<Value = String> {
        "[a-z]{2,8}(:[a-z]{2,8})?"
    }

    /// A priority value in the valid `[1..5]` range.
    pub fn arb_priority() -> impl Strategy<Value = u8> {
        1u8..=5u8
    }
}
