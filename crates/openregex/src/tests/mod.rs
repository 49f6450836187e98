//! Tests for the CLI runtime.

pub(crate) mod support;
