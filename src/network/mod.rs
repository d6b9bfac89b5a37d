//! Network layer - request assembly and HTTP probe execution
//!
//! The Network actor receives probe commands and sends back responses.

pub mod actor;
pub mod client;
pub mod request;

pub use actor::NetworkActor;
pub use request::{prepare, PreparedRequest};
