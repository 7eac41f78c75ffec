//! Application layer containing the payment pipeline orchestration.
//!
//! This module defines the `PaymentProcessor`, which owns the lifecycle of a
//! payment-approval request from submission through terminal decision and
//! emits lifecycle events through the injected `EventSink`.

pub mod processor;
