//! Error taxonomy for the client layer.
//!
//! Four families, mirroring how failures actually occur:
//! field-level validation issues (no network I/O has happened),
//! conflict/reference rejections (lookup calls only, no mutation),
//! role-gate refusals, and backend transport failures. Transport problems
//! are always surfaced as their own variants; they are never folded into
//! "no data".

use serde::Serialize;
use thiserror::Error;

use crate::schema::EntityKind;
use crate::session::Role;

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueReason {
    Missing,
    NotAnInteger,
    NotANumber,
    UnknownChoice,
    InvalidDate,
    EndBeforeStart,
    GradeMismatch,
}

impl IssueReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Missing => "a value is required",
            Self::NotAnInteger => "must be a positive whole number",
            Self::NotANumber => "must be a numerical value",
            Self::UnknownChoice => "is not one of the allowed choices",
            Self::InvalidDate => "must be a date in YYYY-MM-DD form",
            Self::EndBeforeStart => "must not precede the start date",
            Self::GradeMismatch => "is not allowed for the selected room grade",
        }
    }
}

/// A field-attributable validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub reason: IssueReason,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason.message())
    }
}

/// Failures at the HTTP boundary. Fail closed: none of these are ever
/// interpreted as an empty result set.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {message}")]
    Transport { message: String },

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend response could not be decoded: {message}")]
    Decode { message: String },
}

/// Failures of a single orchestrated operation. Every variant is terminal
/// for that user action; nothing is retried and nothing is partially
/// applied.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("validation failed on {} field(s)", .issues.len())]
    Invalid { issues: Vec<FieldIssue> },

    #[error("{field} {id} does not match any existing {entity} record")]
    UnknownReference {
        entity: EntityKind,
        field: &'static str,
        id: i64,
    },

    #[error("another {entity} record already uses this {field}")]
    Conflict {
        entity: EntityKind,
        field: &'static str,
    },

    #[error("a {role} session cannot {action}")]
    NotPermitted { role: Role, action: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl OperationError {
    /// The field issues carried by a validation failure, if that is what
    /// this error is.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Invalid { issues } => issues,
            _ => &[],
        }
    }
}
