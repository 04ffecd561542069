//! Core layer for a hotel-reservation administrative dashboard.
//!
//! Every record lives in a remote HTTP service (the "dataops" backend); this
//! crate owns everything the client side is responsible for before a request
//! leaves the machine:
//!
//! - `validate` - pure field predicates for raw form text
//! - `schema` - the static registry describing each manageable entity
//! - `ops` - the CRUD orchestrator and the dependent-record guard
//! - `session` - the logged-in identity and what its role can reach
//! - `report` - the pre-aggregated statistics catalog
//! - `backend` - the seam behind which the remote service sits
//!
//! The concrete HTTP adapter (and an in-memory fake for tests) lives in the
//! `frontdesk-dataops` crate.

pub mod backend;
pub mod error;
pub mod ops;
pub mod report;
pub mod schema;
pub mod session;
pub mod validate;
pub mod value;

pub use backend::{Backend, BackendResult, Lookup, PLACEHOLDER_ID, Record, record_id, valid_ids};
pub use error::{BackendError, FieldIssue, IssueReason, OperationError};
pub use ops::{BlockingSet, CrudOrchestrator, DeleteCheck, DeleteOutcome};
pub use report::{Denial, GlobalReport, HotelReport, ReportOutcome};
pub use schema::{
    DependentLink, EntityKind, FieldSpec, FieldType, Schema, UniquenessRule,
};
pub use session::{LoginError, Role, Session};
pub use validate::{SignPolicy, is_integer_like, is_real_like};
pub use value::{FieldValue, Payload};
