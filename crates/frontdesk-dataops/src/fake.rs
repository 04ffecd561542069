//! In-memory stand-in for the dataops service.
//!
//! Backs the orchestrator and session tests without a network: tables per
//! entity, backend-style id assignment, the dependent and uniqueness
//! lookups, and the reservation quote. Every mutating call is recorded so
//! tests can assert that a rejected operation issued no mutation at all.
//!
//! Report outcomes are canned per report; the administrator rule for
//! global reports is simulated from the seeded Employee table the same way
//! the real service resolves the acting employee.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use frontdesk::{
    Backend, BackendError, BackendResult, Denial, DependentLink, EntityKind, GlobalReport,
    HotelReport, Lookup, Payload, Record, ReportOutcome, record_id,
};

/// One mutating call the fake has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationCall {
    Insert(EntityKind),
    Replace(EntityKind, i64),
    Remove(EntityKind, i64),
}

#[derive(Default)]
struct FakeState {
    tables: HashMap<EntityKind, Vec<Record>>,
    mutations: Vec<MutationCall>,
    global_reports: HashMap<GlobalReport, ReportOutcome>,
    hotel_reports: HashMap<(i64, HotelReport), ReportOutcome>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the mutation log. Assigns the next
    /// identifier unless the row already carries one; returns the id.
    pub fn seed(&self, entity: EntityKind, row: Value) -> i64 {
        let Value::Object(mut row) = row else {
            panic!("seed row must be a JSON object");
        };
        let mut state = self.state();
        let id = match record_id(&row, entity.id_field()) {
            Some(id) => id,
            None => {
                let id = next_id(&state, entity);
                row.insert(entity.id_field().to_string(), Value::from(id));
                id
            }
        };
        state.tables.entry(entity).or_default().push(row);
        id
    }

    pub fn set_global_report(&self, report: GlobalReport, outcome: ReportOutcome) {
        self.state().global_reports.insert(report, outcome);
    }

    pub fn set_hotel_report(&self, hid: i64, report: HotelReport, outcome: ReportOutcome) {
        self.state().hotel_reports.insert((hid, report), outcome);
    }

    /// Every mutating call received so far, in order.
    pub fn mutations(&self) -> Vec<MutationCall> {
        self.state().mutations.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.state().mutations.len()
    }

    pub fn rows(&self, entity: EntityKind) -> Vec<Record> {
        self.state().tables.get(&entity).cloned().unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }
}

fn next_id(state: &FakeState, entity: EntityKind) -> i64 {
    state
        .tables
        .get(&entity)
        .into_iter()
        .flatten()
        .filter_map(|row| record_id(row, entity.id_field()))
        .max()
        .unwrap_or(0)
        + 1
}

fn field_i64(row: &Record, name: &str) -> Option<i64> {
    row.get(name).and_then(Value::as_i64)
}

fn field_str<'a>(row: &'a Record, name: &str) -> Option<&'a str> {
    row.get(name).and_then(Value::as_str)
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list(&self, entity: EntityKind) -> BackendResult<Vec<Record>> {
        Ok(self.rows(entity))
    }

    async fn fetch(&self, entity: EntityKind, id: i64) -> BackendResult<Lookup<Record>> {
        let state = self.state();
        let row = state
            .tables
            .get(&entity)
            .into_iter()
            .flatten()
            .find(|row| record_id(row, entity.id_field()) == Some(id))
            .cloned();
        Ok(match row {
            Some(row) => Lookup::Found(row),
            None => Lookup::Missing,
        })
    }

    async fn insert(&self, entity: EntityKind, payload: &Payload) -> BackendResult<Record> {
        let mut state = self.state();
        state.mutations.push(MutationCall::Insert(entity));

        let Value::Object(mut row) = payload.to_json() else {
            return Err(BackendError::Decode {
                message: "payload did not serialize to an object".to_string(),
            });
        };
        if record_id(&row, entity.id_field()).is_none() {
            let id = next_id(&state, entity);
            row.insert(entity.id_field().to_string(), Value::from(id));
        }
        state.tables.entry(entity).or_default().push(row.clone());
        Ok(row)
    }

    async fn replace(
        &self,
        entity: EntityKind,
        id: i64,
        payload: &Payload,
    ) -> BackendResult<Record> {
        let mut state = self.state();
        state.mutations.push(MutationCall::Replace(entity, id));

        let Value::Object(mut row) = payload.to_json() else {
            return Err(BackendError::Decode {
                message: "payload did not serialize to an object".to_string(),
            });
        };
        row.insert(entity.id_field().to_string(), Value::from(id));

        let table = state.tables.entry(entity).or_default();
        match table
            .iter_mut()
            .find(|existing| record_id(existing, entity.id_field()) == Some(id))
        {
            Some(existing) => {
                *existing = row.clone();
                Ok(row)
            }
            None => Err(BackendError::Status {
                status: 404,
                body: format!("no {entity} record with id {id}"),
            }),
        }
    }

    async fn remove(&self, entity: EntityKind, id: i64) -> BackendResult<()> {
        let mut state = self.state();
        state.mutations.push(MutationCall::Remove(entity, id));
        state
            .tables
            .entry(entity)
            .or_default()
            .retain(|row| record_id(row, entity.id_field()) != Some(id));
        Ok(())
    }

    async fn referencing(
        &self,
        link: DependentLink,
        id: i64,
    ) -> BackendResult<Lookup<Vec<Record>>> {
        let state = self.state();
        let rows: Vec<Record> = state
            .tables
            .get(&link.entity)
            .into_iter()
            .flatten()
            .filter(|row| field_i64(row, link.via) == Some(id))
            .cloned()
            .collect();
        // The real service answers "Not Found" instead of an empty array.
        Ok(if rows.is_empty() {
            Lookup::Missing
        } else {
            Lookup::Found(rows)
        })
    }

    async fn login_by_username(&self, username: &str) -> BackendResult<Lookup<Record>> {
        let state = self.state();
        let row = state
            .tables
            .get(&EntityKind::Login)
            .into_iter()
            .flatten()
            .find(|row| field_str(row, "username") == Some(username))
            .cloned();
        Ok(match row {
            Some(row) => Lookup::Found(row),
            None => Lookup::Missing,
        })
    }

    async fn login_by_employee(&self, eid: i64) -> BackendResult<Lookup<Record>> {
        let state = self.state();
        let row = state
            .tables
            .get(&EntityKind::Login)
            .into_iter()
            .flatten()
            .find(|row| field_i64(row, "eid") == Some(eid))
            .cloned();
        Ok(match row {
            Some(row) => Lookup::Found(row),
            None => Lookup::Missing,
        })
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> BackendResult<Lookup<Record>> {
        let state = self.state();
        let login = state
            .tables
            .get(&EntityKind::Login)
            .into_iter()
            .flatten()
            .find(|row| {
                field_str(row, "username") == Some(username)
                    && field_str(row, "password") == Some(password)
            })
            .cloned();

        let Some(mut profile) = login else {
            return Ok(Lookup::Missing);
        };

        // The real profile row is joined with the employee's position.
        if let Some(eid) = field_i64(&profile, "eid")
            && let Some(employee) = state
                .tables
                .get(&EntityKind::Employee)
                .into_iter()
                .flatten()
                .find(|row| record_id(row, "eid") == Some(eid))
            && let Some(position) = employee.get("position")
        {
            profile.insert("position".to_string(), position.clone());
        }
        Ok(Lookup::Found(profile))
    }

    async fn reservation_quote(
        &self,
        ruid: i64,
        clid: i64,
        exclude: Option<i64>,
    ) -> BackendResult<Option<f64>> {
        let state = self.state();
        let taken = state
            .tables
            .get(&EntityKind::Reserve)
            .into_iter()
            .flatten()
            .any(|row| {
                field_i64(row, "ruid") == Some(ruid)
                    && field_i64(row, "clid") == Some(clid)
                    && record_id(row, "reid") != exclude
            });
        if taken {
            return Ok(None);
        }

        // Quote from the slot's room price, like the real cost query.
        let price = state
            .tables
            .get(&EntityKind::RoomUnavailable)
            .into_iter()
            .flatten()
            .find(|row| record_id(row, "ruid") == Some(ruid))
            .and_then(|slot| field_i64(slot, "rid"))
            .and_then(|rid| {
                state
                    .tables
                    .get(&EntityKind::Room)
                    .into_iter()
                    .flatten()
                    .find(|room| record_id(room, "rid") == Some(rid))
            })
            .and_then(|room| room.get("rprice"))
            .and_then(Value::as_f64)
            .unwrap_or(100.0);
        Ok(Some(price))
    }

    async fn global_report(
        &self,
        report: GlobalReport,
        acting_eid: i64,
    ) -> BackendResult<ReportOutcome> {
        let state = self.state();
        let position = state
            .tables
            .get(&EntityKind::Employee)
            .into_iter()
            .flatten()
            .find(|row| record_id(row, "eid") == Some(acting_eid))
            .and_then(|row| field_str(row, "position").map(str::to_string));
        if position.as_deref() != Some("Administrator") {
            return Ok(ReportOutcome::Denied(Denial::NotAdministrator));
        }
        Ok(state
            .global_reports
            .get(&report)
            .cloned()
            .unwrap_or(ReportOutcome::Table(Vec::new())))
    }

    async fn hotel_report(
        &self,
        report: HotelReport,
        hid: i64,
        _acting_eid: i64,
    ) -> BackendResult<ReportOutcome> {
        let state = self.state();
        Ok(state
            .hotel_reports
            .get(&(hid, report))
            .cloned()
            .unwrap_or(ReportOutcome::Table(Vec::new())))
    }
}
