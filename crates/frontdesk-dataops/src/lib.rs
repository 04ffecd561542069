//! Adapter for the "dataops" hotel-reservation backend.
//!
//! This crate owns everything wire-specific:
//!
//! - `client` - `DataOpsClient`, the reqwest HTTP client
//! - `wire` - response decoding, including the string-typed sentinel
//!   channel (`"Not Found"`, the authorization-denial sentences)
//! - `datasource` - the `frontdesk::Backend` implementation
//! - `fake` - an in-memory backend for tests and offline use
//!
//! Nothing above this crate ever sees a sentinel string; absence and
//! denial cross the seam as typed values.

pub mod client;
pub mod datasource;
pub mod fake;
mod wire;

pub use client::DataOpsClient;
pub use fake::{FakeBackend, MutationCall};
