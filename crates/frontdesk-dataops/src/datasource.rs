//! `frontdesk::Backend` implementation over the dataops wire format.
//!
//! URL construction lives here and nowhere else. Path segments come from
//! the schema registry (including the irregular `chains`), lookups use the
//! exact endpoint shapes the service exposes, and every response body goes
//! through the sentinel-aware decoders in `wire`.

use async_trait::async_trait;
use serde_json::json;

use frontdesk::{
    Backend, BackendResult, DependentLink, EntityKind, GlobalReport, HotelReport, Lookup, Payload,
    Record, ReportOutcome,
};

use crate::client::DataOpsClient;
use crate::wire;

#[async_trait]
impl Backend for DataOpsClient {
    async fn list(&self, entity: EntityKind) -> BackendResult<Vec<Record>> {
        let value = self
            .get(&format!("/dataops/{}", entity.segment()), &[])
            .await?;
        wire::decode_rows(value)
    }

    async fn fetch(&self, entity: EntityKind, id: i64) -> BackendResult<Lookup<Record>> {
        let value = self
            .get(&format!("/dataops/{}/{}", entity.segment(), id), &[])
            .await?;
        wire::decode_lookup(value)
    }

    async fn insert(&self, entity: EntityKind, payload: &Payload) -> BackendResult<Record> {
        let value = self
            .post(&format!("/dataops/{}", entity.segment()), &payload.to_json())
            .await?;
        wire::decode_record(value)
    }

    async fn replace(
        &self,
        entity: EntityKind,
        id: i64,
        payload: &Payload,
    ) -> BackendResult<Record> {
        let value = self
            .put(
                &format!("/dataops/{}/{}", entity.segment(), id),
                &payload.to_json(),
            )
            .await?;
        wire::decode_record(value)
    }

    async fn remove(&self, entity: EntityKind, id: i64) -> BackendResult<()> {
        self.delete(&format!("/dataops/{}/{}", entity.segment(), id))
            .await
    }

    async fn referencing(
        &self,
        link: DependentLink,
        id: i64,
    ) -> BackendResult<Lookup<Vec<Record>>> {
        let value = self
            .get(
                &format!("/dataops/{}/by{}/{}", link.entity.segment(), link.via, id),
                &[],
            )
            .await?;
        wire::decode_lookup_rows(value)
    }

    async fn login_by_username(&self, username: &str) -> BackendResult<Lookup<Record>> {
        let value = self
            .get("/dataops/login/byusername", &[("username", username)])
            .await?;
        wire::decode_lookup(value)
    }

    async fn login_by_employee(&self, eid: i64) -> BackendResult<Lookup<Record>> {
        let value = self
            .get(&format!("/dataops/login/byemployeeid/{eid}"), &[])
            .await?;
        wire::decode_lookup(value)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> BackendResult<Lookup<Record>> {
        let value = self
            .get(
                "/dataops/login/byusernamepassword",
                &[("username", username), ("password", password)],
            )
            .await?;
        wire::decode_lookup(value)
    }

    async fn reservation_quote(
        &self,
        ruid: i64,
        clid: i64,
        exclude: Option<i64>,
    ) -> BackendResult<Option<f64>> {
        let path = match exclude {
            Some(reid) => format!("/dataops/reserve/totalcost/{ruid}/{clid}/{reid}"),
            None => format!("/dataops/reserve/totalcost/{ruid}/{clid}"),
        };
        let value = self.get(&path, &[]).await?;
        wire::decode_quote(value)
    }

    async fn global_report(
        &self,
        report: GlobalReport,
        acting_eid: i64,
    ) -> BackendResult<ReportOutcome> {
        let value = self
            .post(
                &format!("/dataops/{}", report.path()),
                &json!({ "eid": acting_eid }),
            )
            .await?;
        wire::decode_report(value)
    }

    async fn hotel_report(
        &self,
        report: HotelReport,
        hid: i64,
        acting_eid: i64,
    ) -> BackendResult<ReportOutcome> {
        let value = self
            .post(
                &format!("/dataops/hotel/{}/{}", hid, report.segment()),
                &json!({ "eid": acting_eid }),
            )
            .await?;
        wire::decode_report(value)
    }
}
