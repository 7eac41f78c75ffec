//! Inbound/outbound adapters for the CLI.

pub mod csv;
