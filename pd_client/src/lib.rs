//! Internal modules for the deal client.
//!
//! This library provides argument parsing, report rendering and the HTTP
//! client used by the pd_client binary.

pub mod api_client;
pub mod commands;
pub mod report;
