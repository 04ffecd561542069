//! Drive the CRUD pipeline against a live dataops service.
//!
//! Usage:
//!   DATAOPS_URL=https://... DATAOPS_USER=... DATAOPS_PASSWORD=... \
//!     cargo run --example manage_chains

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};
use frontdesk::{CrudOrchestrator, DeleteOutcome, EntityKind, Session, record_id};
use frontdesk_dataops::DataOpsClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let base_url = env::var("DATAOPS_URL").context("DATAOPS_URL is not set")?;
    let username = env::var("DATAOPS_USER").context("DATAOPS_USER is not set")?;
    let password = env::var("DATAOPS_PASSWORD").context("DATAOPS_PASSWORD is not set")?;

    let client = DataOpsClient::new(base_url);
    let session = Session::login(&client, &username, &password).await?;
    println!("logged in as {} ({})", session.username, session.role);

    let ops = CrudOrchestrator::new(&client, &session);

    let mut fields = HashMap::new();
    fields.insert("cname".to_string(), "Borealis".to_string());
    fields.insert("springmkup".to_string(), "10.5".to_string());
    fields.insert("summermkup".to_string(), "12.25".to_string());
    fields.insert("wintermkup".to_string(), "8".to_string());
    fields.insert("fallmkup".to_string(), "9.75".to_string());

    let record = ops.create(EntityKind::Chain, &fields).await?;
    let id = record_id(&record, "chid").context("created chain has no id")?;
    println!("created chain {id}");

    match ops.delete(EntityKind::Chain, id).await? {
        DeleteOutcome::Deleted => println!("deleted chain {id}"),
        DeleteOutcome::Blocked(check) => {
            for set in check.blocking {
                println!(
                    "delete blocked: {} row(s) in {} reference it via {}",
                    set.rows.len(),
                    set.entity,
                    set.via
                );
            }
        }
    }

    session.logout();
    Ok(())
}
