//! Application layer containing the core business logic orchestration.
//!
//! `TransactionWorkflow` advances transaction state against the stores,
//! `routing` maps topic names in and out, and `EventProcessor` ties both to
//! the inbound source and the outbound publisher.

pub mod processor;
pub mod routing;
pub mod workflow;
