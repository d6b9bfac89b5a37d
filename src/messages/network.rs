//! Network messages - communication between App and Network layers

use crate::network::request::PreparedRequest;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a validated probe request
    ExecuteProbe { id: u64, request: PreparedRequest },
    /// Abort an in-flight probe
    CancelProbe(u64),
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The server answered, whatever the status
    Completed {
        id: u64,
        status: u16,
        body: String,
        time_ms: u64,
    },
    /// No response was obtained; `body` is already formatted for display
    Failed {
        id: u64,
        message: String,
        body: String,
        time_ms: u64,
    },
    Cancelled { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Failed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }
}
