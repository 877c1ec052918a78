//! ldap-bench library
//!
//! Concurrent load generator for LDAP servers: a fixed pool of worker
//! threads, each owning one connection, runs a pluggable job until its
//! request quota is exhausted or the run is cancelled.

pub mod benchmark;
pub mod client;
pub mod config;
pub mod jobs;
pub mod metrics;
pub mod setup;
pub mod utils;
