//! Keyra payment pipeline: manual payment-receipt submission, bounded-retry
//! queue processing, admin approve/reject decisions, and an in-process event
//! bus fanning lifecycle notifications out to any interested listener.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
