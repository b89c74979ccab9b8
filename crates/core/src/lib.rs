//! Reliable automation primitives for Salesforce Lightning Experience.
//!
//! The crate is engine-agnostic: it drives pages through the traits in
//! [`engine`] and gets org credentials through [`credentials::CredentialSource`].
//! The `sfpilot` binary wires both to Playwright and the `sf` CLI.
//!
//! - [`selectors`]: ordered selector candidates per UI concept
//! - [`wait`]: polling readiness waits with shrinking sub-deadlines
//! - [`ui`]: picklists, lookups, checkboxes, dates, App Launcher, save, Quick Find
//! - [`session`]: the single browser session and its lifecycle
//! - [`url`]: Lightning path builders

pub mod config;
pub mod credentials;
pub mod engine;
mod error;
pub mod locate;
pub mod poll;
pub mod selectors;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod ui;
pub mod url;
pub mod wait;

pub use error::{Error, Result};
pub use session::{SessionConfig, SessionCoordinator, SessionInfo, SessionStatus};
pub use sfpilot_protocol as protocol;
