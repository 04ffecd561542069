//! The seam behind which the remote dataops service sits.
//!
//! The orchestrator, the guard, the session gate, and the report helpers
//! all talk to a `dyn Backend`; the concrete HTTP adapter lives in the
//! `frontdesk-dataops` crate, and tests substitute an in-memory fake. The
//! adapter is the only place that knows the wire encodes absence as the
//! literal string `"Not Found"` - above this trait, absence is `Lookup::
//! Missing` and authorization denials are typed `ReportOutcome::Denied`
//! values.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::report::{GlobalReport, HotelReport, ReportOutcome};
use crate::schema::{DependentLink, EntityKind};
use crate::value::Payload;

/// A remote record. Field sets are described by the schema registry, so
/// records stay dynamic at this layer.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The backend pads every listing with one placeholder row carrying this
/// identifier; it must be excluded from every valid-ID list.
pub const PLACEHOLDER_ID: i64 = -1;

/// Typed absence marker. The wire-level `"Not Found"` sentinel decodes to
/// `Missing`; an empty list and a missing record are different things.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
}

impl<T> Lookup<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing => None,
        }
    }
}

/// One synchronous request/response surface of the remote service.
///
/// No retries, no caching, no idempotency keys: every call maps to exactly
/// one HTTP exchange, and a failure is terminal for the user action that
/// triggered it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /dataops/<segment>` - every record, including the placeholder
    /// row.
    async fn list(&self, entity: EntityKind) -> BackendResult<Vec<Record>>;

    /// `GET /dataops/<segment>/<id>`.
    async fn fetch(&self, entity: EntityKind, id: i64) -> BackendResult<Lookup<Record>>;

    /// `POST /dataops/<segment>` - returns the created record with its
    /// backend-assigned identifier.
    async fn insert(&self, entity: EntityKind, payload: &Payload) -> BackendResult<Record>;

    /// `PUT /dataops/<segment>/<id>` with a full replacement payload.
    async fn replace(
        &self,
        entity: EntityKind,
        id: i64,
        payload: &Payload,
    ) -> BackendResult<Record>;

    /// `DELETE /dataops/<segment>/<id>` - no body.
    async fn remove(&self, entity: EntityKind, id: i64) -> BackendResult<()>;

    /// `GET /dataops/<dependent-segment>/by<via>/<id>` - the rows of a
    /// dependent entity that reference `id`.
    async fn referencing(&self, link: DependentLink, id: i64)
    -> BackendResult<Lookup<Vec<Record>>>;

    /// `GET /dataops/login/byusername`.
    async fn login_by_username(&self, username: &str) -> BackendResult<Lookup<Record>>;

    /// `GET /dataops/login/byemployeeid/<eid>`.
    async fn login_by_employee(&self, eid: i64) -> BackendResult<Lookup<Record>>;

    /// `GET /dataops/login/byusernamepassword` - the profile row carries
    /// the employee id and position alongside the credentials.
    async fn authenticate(&self, username: &str, password: &str)
    -> BackendResult<Lookup<Record>>;

    /// `GET /dataops/reserve/totalcost/<ruid>/<clid>[/<exclude>]`.
    ///
    /// `None` means the (room-slot, client) pair is already taken by a
    /// record other than `exclude`; `Some` carries the quoted total cost
    /// to embed in the mutation payload.
    async fn reservation_quote(
        &self,
        ruid: i64,
        clid: i64,
        exclude: Option<i64>,
    ) -> BackendResult<Option<f64>>;

    /// `POST /dataops/<report-path>` with the acting employee id.
    async fn global_report(
        &self,
        report: GlobalReport,
        acting_eid: i64,
    ) -> BackendResult<ReportOutcome>;

    /// `POST /dataops/hotel/<hid>/<report-segment>` with the acting
    /// employee id.
    async fn hotel_report(
        &self,
        report: HotelReport,
        hid: i64,
        acting_eid: i64,
    ) -> BackendResult<ReportOutcome>;
}

/// Extract a record's integer identifier.
pub fn record_id(record: &Record, id_field: &str) -> Option<i64> {
    record.get(id_field).and_then(serde_json::Value::as_i64)
}

/// The identifiers a foreign-key field may legally reference right now:
/// the entity's current listing minus the placeholder row. Fetched fresh
/// on every call; referential state is never cached client-side.
pub async fn valid_ids(backend: &dyn Backend, entity: EntityKind) -> BackendResult<Vec<i64>> {
    let rows = backend.list(entity).await?;
    let id_field = entity.id_field();
    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows {
        let id = record_id(row, id_field).ok_or_else(|| BackendError::Decode {
            message: format!("{entity} row is missing its {id_field} field"),
        })?;
        if id != PLACEHOLDER_ID {
            ids.push(id);
        }
    }
    Ok(ids)
}
