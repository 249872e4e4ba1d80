#![deny(missing_docs)]
//! Vidrelay runtime.
//!
//! Transport-agnostic delivery workflow: acknowledge, extract, size-check,
//! upload and clean up one video request.

/// User-facing message texts.
pub mod texts;
/// Transport abstraction used by the workflow.
pub mod transport;
/// Delivery workflow state machine.
pub mod workflow;

pub use transport::{ChatTransport, StatusHandle};
pub use workflow::{DeliveryOutcome, DeliveryRequest, DeliveryState, DeliveryWorkflow};
