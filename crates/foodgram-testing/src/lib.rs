//! Test utilities for Foodgram services.
//!
//! Import from `[dev-dependencies]` only, not from production code.

pub mod auth;
