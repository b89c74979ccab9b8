//! Wire types for the sfpilot control protocol.
//!
//! Every operation is requested with a [`CommandRequest`] and answered with a
//! [`CommandResponse`]. Failures always carry a machine-readable [`ErrorCode`]
//! plus a remediation suggestion so a client can act without parsing prose.
//!
//! # Main Types
//!
//! - [`CommandRequest`] / [`CommandResponse`] - one line each on the wire
//! - [`ErrorCode`] / [`CommandError`] - failure classification
//! - [`args`] - typed argument records, one per operation
//! - [`ImagePayload`] - base64 binary results with a declared MIME type

pub mod args;
mod envelope;
mod payload;

pub use envelope::{CommandError, CommandRequest, CommandResponse, ErrorCode, SCHEMA_VERSION};
pub use payload::ImagePayload;
