//! Service plumbing shared by Foodgram binaries: configuration loading,
//! tracing, health probes, request ids, pagination links and sea-orm helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod pagination;
pub mod sea_ext;
pub mod tracing;
