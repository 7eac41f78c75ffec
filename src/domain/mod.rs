//! Domain layer: the payment receipt data model, the realtime event model,
//! and the ports implemented by infrastructure adapters.

pub mod event;
pub mod ports;
pub mod receipt;
