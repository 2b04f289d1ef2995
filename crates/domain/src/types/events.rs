//! Router lifecycle events

use serde::{Deserialize, Serialize};

use crate::errors::DocRouterError;

/// Lifecycle events emitted while a file is being routed
///
/// Consumed by whatever surface hosts the router (GUI, CLI). Failures carry
/// the full error so consumers can distinguish non-alarming cancellations
/// from real faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RouterEvent {
    /// A routing flow began; the payload is a human-readable description.
    Started(String),
    /// The flow completed; the payload describes the outcome.
    Finished(String),
    /// The flow failed with the carried error.
    Failed(DocRouterError),
}
