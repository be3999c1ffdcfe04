//! Auth types shared across Foodgram services.
//!
//! Token issuance lives in front of the service; this crate only reads the
//! identity it injects.

pub mod identity;
