//! Session lifecycle and report-channel behavior against the in-memory
//! backend: credential lookup, role resolution, the local report gate, and
//! the typed translation of the backend's denial sentinels.

use anyhow::Result;
use serde_json::json;

use frontdesk::{
    Denial, EntityKind, GlobalReport, HotelReport, LoginError, OperationError, ReportOutcome,
    Role, Session, report,
};
use frontdesk_dataops::FakeBackend;

fn seeded() -> FakeBackend {
    let fake = FakeBackend::new();
    fake.seed(
        EntityKind::Chain,
        json!({"chid": 1, "cname": "Acme", "springmkup": 10.0, "summermkup": 10.0,
               "wintermkup": 10.0, "fallmkup": 10.0}),
    );
    fake.seed(
        EntityKind::Hotel,
        json!({"hid": 1, "chid": 1, "hname": "Acme Plaza", "hcity": "Ponce"}),
    );
    fake.seed(
        EntityKind::Employee,
        json!({"eid": 1, "hid": 1, "fname": "Ada", "lname": "Ruiz", "age": 40,
               "position": "Administrator", "salary": 50000.0}),
    );
    fake.seed(
        EntityKind::Employee,
        json!({"eid": 2, "hid": 1, "fname": "Bea", "lname": "Cruz", "age": 31,
               "position": "Supervisor", "salary": 30000.0}),
    );
    fake.seed(
        EntityKind::Login,
        json!({"lid": 1, "eid": 1, "username": "ada", "password": "secret"}),
    );
    fake.seed(
        EntityKind::Login,
        json!({"lid": 2, "eid": 2, "username": "bea", "password": "secret"}),
    );
    fake
}

#[tokio::test]
async fn login_resolves_the_employee_role() -> Result<()> {
    let fake = seeded();

    let session = Session::login(&fake, "ada", "secret").await?;
    assert_eq!(session.eid, 1);
    assert_eq!(session.role, Role::Administrator);

    let session = Session::login(&fake, "bea", "secret").await?;
    assert_eq!(session.role, Role::Supervisor);
    session.logout();
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_are_a_typed_failure() {
    let fake = seeded();
    let err = Session::login(&fake, "ada", "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::BadCredentials));
    let err = Session::login(&fake, "nobody", "secret").await.unwrap_err();
    assert!(matches!(err, LoginError::BadCredentials));
}

#[tokio::test]
async fn global_reports_require_an_administrator_session() -> Result<()> {
    let fake = seeded();
    fake.set_global_report(
        GlobalReport::TopRevenueChains,
        ReportOutcome::Table(vec![
            json!({"Chain": "Acme", "Revenue": 125000.0})
                .as_object()
                .cloned()
                .unwrap(),
        ]),
    );

    let admin = Session::login(&fake, "ada", "secret").await?;
    let outcome = report::global(&fake, &admin, GlobalReport::TopRevenueChains).await?;
    let ReportOutcome::Table(rows) = outcome else {
        panic!("expected report rows");
    };
    assert_eq!(rows[0].get("Chain"), Some(&json!("Acme")));

    let supervisor = Session::login(&fake, "bea", "secret").await?;
    let err = report::global(&fake, &supervisor, GlobalReport::TopRevenueChains)
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::NotPermitted { .. }));
    Ok(())
}

#[tokio::test]
async fn backend_denials_arrive_typed_not_as_strings() -> Result<()> {
    let fake = seeded();

    // A session whose role claim is stale: the backend still refuses.
    let stale = Session {
        eid: 2,
        username: "bea".to_string(),
        role: Role::Administrator,
    };
    let outcome = report::global(&fake, &stale, GlobalReport::PaymentMethodShare).await?;
    assert_eq!(outcome, ReportOutcome::Denied(Denial::NotAdministrator));

    fake.set_hotel_report(
        1,
        HotelReport::HighestPaidRegulars,
        ReportOutcome::Denied(Denial::ChainNotAccessible),
    );
    let supervisor = Session::login(&fake, "bea", "secret").await?;
    let outcome =
        report::hotel(&fake, &supervisor, 1, HotelReport::HighestPaidRegulars).await?;
    assert_eq!(outcome, ReportOutcome::Denied(Denial::ChainNotAccessible));
    assert_eq!(
        outcome,
        ReportOutcome::Denied(
            Denial::from_sentinel("The hotel's chain is not accessible to this employee").unwrap()
        )
    );
    Ok(())
}

#[tokio::test]
async fn an_empty_hotel_report_is_data_not_a_denial() -> Result<()> {
    let fake = seeded();
    let supervisor = Session::login(&fake, "bea", "secret").await?;
    let outcome = report::hotel(&fake, &supervisor, 1, HotelReport::RoomTypeShare).await?;
    assert_eq!(outcome, ReportOutcome::Table(vec![]));
    assert!(!outcome.is_denied());
    Ok(())
}
