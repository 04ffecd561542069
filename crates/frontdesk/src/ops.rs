//! The CRUD orchestrator and the dependent-record guard.
//!
//! One pipeline replaces the per-entity branches the dashboard used to
//! hand-write: validate raw form text against the schema, coerce it into a
//! typed payload, confirm every foreign key against the backend's current
//! id lists, run the entity's uniqueness lookups, and only then issue the
//! single mutating call. A validation or conflict failure leaves the
//! backend untouched.
//!
//! Destructive operations move through
//! `Idle -> Validating -> (Blocked | Guarded-Delete -> Deleted)`: the
//! guard re-queries every declared dependent immediately before the
//! delete, and its verdict is never cached across attempts.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::backend::{Backend, Lookup, Record, record_id, valid_ids};
use crate::error::{BackendError, FieldIssue, IssueReason, OperationError};
use crate::schema::{EntityKind, FieldType, Schema, UniquenessRule};
use crate::session::Session;
use crate::validate;
use crate::value::{DATE_FORMAT, FieldValue, Payload};

/// The dependent rows of one entity that currently reference a record
/// slated for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockingSet {
    pub entity: EntityKind,
    pub via: &'static str,
    pub rows: Vec<Record>,
}

/// Result of the dependent-record guard. Valid for the single delete
/// attempt that follows it; dependency state can go stale the moment
/// another session writes.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCheck {
    pub blocking: Vec<BlockingSet>,
}

impl DeleteCheck {
    pub fn allowed(&self) -> bool {
        self.blocking.is_empty()
    }
}

/// Outcome of a guarded delete. A blocked delete is a normal answer, not
/// an error: the caller shows the blocking rows and moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    Blocked(DeleteCheck),
}

/// Schema-driven create/update/delete against the remote backend, gated by
/// the acting session's role.
pub struct CrudOrchestrator<'a> {
    backend: &'a dyn Backend,
    session: &'a Session,
}

impl<'a> CrudOrchestrator<'a> {
    pub fn new(backend: &'a dyn Backend, session: &'a Session) -> Self {
        Self { backend, session }
    }

    /// Validate `input`, resolve references and uniqueness, and create the
    /// record. No mutating call is issued unless every local and lookup
    /// check passes.
    pub async fn create(
        &self,
        entity: EntityKind,
        input: &HashMap<String, String>,
    ) -> Result<Record, OperationError> {
        if !self.session.role.can_create(entity) {
            return Err(self.refusal(format!("create {entity} records")));
        }
        let schema = entity.schema();
        let mut payload = coerce(schema, input)?;
        self.check_references(schema, &payload).await?;
        self.check_uniqueness(entity, schema, &mut payload, None)
            .await?;

        let record = self.backend.insert(entity, &payload).await?;
        info!("[CrudOrchestrator] created {} record", entity);
        Ok(record)
    }

    /// Same pipeline as `create`, but uniqueness lookups that land on the
    /// record's own identifier are not conflicts, and the replacement
    /// payload carries the id field the wire contract expects.
    pub async fn update(
        &self,
        entity: EntityKind,
        id: i64,
        input: &HashMap<String, String>,
    ) -> Result<Record, OperationError> {
        if !self.session.role.can_mutate() {
            return Err(self.refusal(format!("update {entity} records")));
        }
        let schema = entity.schema();
        let mut payload = coerce(schema, input)?;
        self.check_references(schema, &payload).await?;
        self.check_uniqueness(entity, schema, &mut payload, Some(id))
            .await?;
        payload.insert(schema.id_field, FieldValue::Integer(id));

        let record = self.backend.replace(entity, id, &payload).await?;
        info!("[CrudOrchestrator] updated {} record {}", entity, id);
        Ok(record)
    }

    /// Guarded delete: the dependent check runs immediately before the
    /// destructive call, and no `DELETE` is issued while any dependent
    /// rows exist.
    pub async fn delete(
        &self,
        entity: EntityKind,
        id: i64,
    ) -> Result<DeleteOutcome, OperationError> {
        if !self.session.role.can_mutate() {
            return Err(self.refusal(format!("delete {entity} records")));
        }
        let check = self.can_delete(entity, id).await?;
        if !check.allowed() {
            warn!(
                "[CrudOrchestrator] delete of {} {} blocked by {} dependent set(s)",
                entity,
                id,
                check.blocking.len()
            );
            return Ok(DeleteOutcome::Blocked(check));
        }
        self.backend.remove(entity, id).await?;
        info!("[CrudOrchestrator] deleted {} record {}", entity, id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Query every dependent link declared for `entity` and collect the
    /// rows that still reference `id`. A fresh check precedes every delete
    /// attempt; callers must not reuse the result.
    pub async fn can_delete(
        &self,
        entity: EntityKind,
        id: i64,
    ) -> Result<DeleteCheck, OperationError> {
        let mut blocking = Vec::new();
        for link in entity.schema().dependents {
            if let Lookup::Found(rows) = self.backend.referencing(*link, id).await?
                && !rows.is_empty()
            {
                blocking.push(BlockingSet {
                    entity: link.entity,
                    via: link.via,
                    rows,
                });
            }
        }
        Ok(DeleteCheck { blocking })
    }

    /// Every foreign-key value must be among the referenced entity's
    /// current identifiers (placeholder row excluded).
    async fn check_references(
        &self,
        schema: &Schema,
        payload: &Payload,
    ) -> Result<(), OperationError> {
        for field in schema.fields {
            let FieldType::ForeignKey(target) = field.ty else {
                continue;
            };
            let Some(id) = payload.integer(field.name) else {
                continue;
            };
            let ids = valid_ids(self.backend, target).await?;
            if !ids.contains(&id) {
                return Err(OperationError::UnknownReference {
                    entity: target,
                    field: field.name,
                    id,
                });
            }
        }
        Ok(())
    }

    /// Run the schema's uniqueness lookups. `exclude` carries the id of
    /// the record being updated, so a hit on its own row is not a
    /// conflict. The reservation rule also injects the quoted
    /// `total_cost` into the payload.
    async fn check_uniqueness(
        &self,
        entity: EntityKind,
        schema: &Schema,
        payload: &mut Payload,
        exclude: Option<i64>,
    ) -> Result<(), OperationError> {
        for rule in schema.uniqueness {
            match rule {
                UniquenessRule::LoginEmployee => {
                    let Some(eid) = payload.integer("eid") else {
                        continue;
                    };
                    if let Lookup::Found(row) = self.backend.login_by_employee(eid).await?
                        && is_other_record(&row, schema.id_field, exclude)?
                    {
                        return Err(OperationError::Conflict {
                            entity,
                            field: "eid",
                        });
                    }
                }
                UniquenessRule::LoginUsername => {
                    let Some(username) = payload.text("username") else {
                        continue;
                    };
                    if let Lookup::Found(row) = self.backend.login_by_username(username).await?
                        && is_other_record(&row, schema.id_field, exclude)?
                    {
                        return Err(OperationError::Conflict {
                            entity,
                            field: "username",
                        });
                    }
                }
                UniquenessRule::ReservationSlot => {
                    let (Some(ruid), Some(clid)) =
                        (payload.integer("ruid"), payload.integer("clid"))
                    else {
                        continue;
                    };
                    match self.backend.reservation_quote(ruid, clid, exclude).await? {
                        None => {
                            return Err(OperationError::Conflict {
                                entity,
                                field: "ruid and clid",
                            });
                        }
                        Some(cost) => payload.insert("total_cost", FieldValue::Real(cost)),
                    }
                }
            }
        }
        Ok(())
    }

    fn refusal(&self, action: String) -> OperationError {
        debug!(
            "[CrudOrchestrator] refused: a {} session tried to {}",
            self.session.role, action
        );
        OperationError::NotPermitted {
            role: self.session.role,
            action,
        }
    }
}

/// A uniqueness lookup hit is a conflict unless it landed on the record
/// being updated.
fn is_other_record(
    row: &Record,
    id_field: &str,
    exclude: Option<i64>,
) -> Result<bool, OperationError> {
    let row_id = record_id(row, id_field).ok_or_else(|| {
        OperationError::Backend(BackendError::Decode {
            message: format!("lookup row is missing its {id_field} field"),
        })
    })?;
    Ok(exclude != Some(row_id))
}

/// Validate raw form text against the schema and coerce it into a typed
/// payload. Purely local: by the time this returns, either every field has
/// passed, or the caller holds one issue per offending field and nothing
/// has gone near the network.
fn coerce(schema: &Schema, input: &HashMap<String, String>) -> Result<Payload, OperationError> {
    let mut payload = Payload::new();
    let mut issues = Vec::new();

    for field in schema.fields {
        let raw = input.get(field.name).map(String::as_str).unwrap_or("");
        if raw.is_empty() {
            if field.required {
                issues.push(FieldIssue {
                    field: field.name,
                    reason: IssueReason::Missing,
                });
            }
            continue;
        }
        match field.ty {
            FieldType::Integer | FieldType::ForeignKey(_) => {
                match validate::parse_integer(raw) {
                    Some(n) => payload.insert(field.name, FieldValue::Integer(n)),
                    None => issues.push(FieldIssue {
                        field: field.name,
                        reason: IssueReason::NotAnInteger,
                    }),
                }
            }
            FieldType::Real(sign) => match validate::parse_real(raw, sign) {
                Some(v) => payload.insert(field.name, FieldValue::Real(v)),
                None => issues.push(FieldIssue {
                    field: field.name,
                    reason: IssueReason::NotANumber,
                }),
            },
            FieldType::Text | FieldType::Secret => {
                payload.insert(field.name, FieldValue::Text(raw.to_string()));
            }
            FieldType::Choice(options) => {
                if options.contains(&raw) {
                    payload.insert(field.name, FieldValue::Text(raw.to_string()));
                } else {
                    issues.push(FieldIssue {
                        field: field.name,
                        reason: IssueReason::UnknownChoice,
                    });
                }
            }
            FieldType::Date => match chrono::NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(d) => payload.insert(field.name, FieldValue::Date(d)),
                Err(_) => issues.push(FieldIssue {
                    field: field.name,
                    reason: IssueReason::InvalidDate,
                }),
            },
            FieldType::Flag => match raw {
                "true" | "True" => payload.insert(field.name, FieldValue::Flag(true)),
                "false" | "False" => payload.insert(field.name, FieldValue::Flag(false)),
                _ => issues.push(FieldIssue {
                    field: field.name,
                    reason: IssueReason::UnknownChoice,
                }),
            },
        }
    }

    // Cross-field rules only make sense once every field coerced cleanly.
    if issues.is_empty()
        && let Some(refine) = schema.refine
    {
        issues.extend(refine(&payload));
    }

    if issues.is_empty() {
        Ok(payload)
    } else {
        debug!(
            "[CrudOrchestrator] {} rejected locally with {} field issue(s)",
            schema.label,
            issues.len()
        );
        Err(OperationError::Invalid { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn issues(result: Result<Payload, OperationError>) -> Vec<FieldIssue> {
        match result {
            Err(OperationError::Invalid { issues }) => issues,
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[test]
    fn chain_with_text_markup_is_rejected_per_field() {
        let result = coerce(
            EntityKind::Chain.schema(),
            &input(&[
                ("cname", "Acme"),
                ("springmkup", "10.5"),
                ("summermkup", "abc"),
                ("wintermkup", "3"),
                ("fallmkup", "4.25"),
            ]),
        );
        let issues = issues(result);
        assert_eq!(
            issues,
            vec![FieldIssue {
                field: "summermkup",
                reason: IssueReason::NotANumber,
            }]
        );
    }

    #[test]
    fn missing_fields_are_each_reported() {
        let result = coerce(EntityKind::Client.schema(), &input(&[("fname", "Ana")]));
        let issues = issues(result);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.reason == IssueReason::Missing));
    }

    #[test]
    fn employee_coerces_to_typed_payload() {
        let payload = coerce(
            EntityKind::Employee.schema(),
            &input(&[
                ("hid", "2"),
                ("fname", "Jean"),
                ("lname", "Vega"),
                ("age", "35"),
                ("position", "Supervisor"),
                ("salary", "41200.50"),
            ]),
        )
        .unwrap();
        assert_eq!(payload.integer("hid"), Some(2));
        assert_eq!(payload.integer("age"), Some(35));
        assert_eq!(payload.text("position"), Some("Supervisor"));
        assert_eq!(payload.get("salary"), Some(&FieldValue::Real(41200.50)));
    }

    #[test]
    fn negative_salary_is_rejected() {
        let result = coerce(
            EntityKind::Employee.schema(),
            &input(&[
                ("hid", "2"),
                ("fname", "Jean"),
                ("lname", "Vega"),
                ("age", "35"),
                ("position", "Regular"),
                ("salary", "-1.0"),
            ]),
        );
        assert_eq!(issues(result)[0].field, "salary");
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let result = coerce(
            EntityKind::Reserve.schema(),
            &input(&[
                ("ruid", "1"),
                ("clid", "2"),
                ("payment", "bitcoin"),
                ("guests", "2"),
            ]),
        );
        assert_eq!(
            issues(result),
            vec![FieldIssue {
                field: "payment",
                reason: IssueReason::UnknownChoice,
            }]
        );
    }

    #[test]
    fn room_grade_table_is_enforced() {
        let result = coerce(
            EntityKind::RoomDescription.schema(),
            &input(&[
                ("rname", "Standard"),
                ("rtype", "Suite"),
                ("capacity", "1"),
                ("ishandicap", "false"),
            ]),
        );
        assert_eq!(
            issues(result),
            vec![FieldIssue {
                field: "rtype",
                reason: IssueReason::GradeMismatch,
            }]
        );
    }

    #[test]
    fn date_range_must_be_ordered() {
        let result = coerce(
            EntityKind::RoomUnavailable.schema(),
            &input(&[
                ("rid", "1"),
                ("startdate", "2024-05-10"),
                ("enddate", "2024-05-01"),
            ]),
        );
        assert_eq!(
            issues(result),
            vec![FieldIssue {
                field: "enddate",
                reason: IssueReason::EndBeforeStart,
            }]
        );
    }

    #[test]
    fn malformed_dates_are_field_issues() {
        let result = coerce(
            EntityKind::RoomUnavailable.schema(),
            &input(&[
                ("rid", "1"),
                ("startdate", "05/10/2024"),
                ("enddate", "2024-05-20"),
            ]),
        );
        assert_eq!(
            issues(result),
            vec![FieldIssue {
                field: "startdate",
                reason: IssueReason::InvalidDate,
            }]
        );
    }
}
