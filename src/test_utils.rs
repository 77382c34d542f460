//! Shared test utilities for the CRM core.
//!
//! Helpers for setting up in-memory databases, signing in as a demo user, and building
//! records with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    config::AuthSettings,
    core::{
        seed::{demo_data, seed_demo_data},
        session::Session,
        store::Records,
    },
    entities::{JobStatus, Role, invoice, job, user},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Demo hunter's user id
pub const HUNTER_ID: &str = "1";
/// Demo taxidermist's user id
pub const TAXIDERMIST_ID: &str = "2";
/// Demo admin's user id
pub const ADMIN_ID: &str = "3";

/// Installs a tracing subscriber that writes through the test harness.
/// Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Like [`setup_test_db`], with the demo dataset loaded.
pub async fn seeded_test_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    seed_demo_data(&db).await?;
    Ok(db)
}

/// Auth settings without the login delay.
pub fn fast_auth_settings() -> AuthSettings {
    AuthSettings {
        login_delay_ms: 0,
        ..Default::default()
    }
}

/// Signs in as the demo user for `role`.
pub async fn signed_in(db: &DatabaseConnection, role: Role) -> Result<Session> {
    let email = match role {
        Role::Hunter => "hunter@demo.com",
        Role::Taxidermist => "taxidermist@demo.com",
        Role::Admin => "admin@demo.com",
    };
    let mut session = Session::new(fast_auth_settings());
    session.login(db, email, "demo123", role).await?;
    Ok(session)
}

/// Midnight UTC on the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// The demo user holding `role`.
pub fn demo_user(role: Role) -> user::Model {
    demo_data()
        .unwrap()
        .users
        .into_iter()
        .find(|u| u.role == role)
        .unwrap()
}

/// The demo clients, jobs, invoices, and payments.
pub fn demo_records() -> Records {
    demo_data().unwrap().records
}

/// Creates a job model with sensible defaults.
///
/// # Defaults
/// * `job_type` / `species`: "Shoulder Mount" / "Elk"
/// * `estimated_price`: 100.0
/// * all dates: 2024-03-01
pub fn job_fixture(
    id: &str,
    client_id: &str,
    status: JobStatus,
    hunter_id: Option<&str>,
    taxidermist_id: Option<&str>,
) -> job::Model {
    let date = at(2024, 3, 1);
    job::Model {
        id: id.to_string(),
        client_id: client_id.to_string(),
        job_type: "Shoulder Mount".to_string(),
        species: "Elk".to_string(),
        status,
        description: None,
        drop_off_date: date,
        due_date: date,
        completed_date: None,
        estimated_price: 100.0,
        special_instructions: None,
        hunter_id: hunter_id.map(str::to_string),
        taxidermist_id: taxidermist_id.map(str::to_string),
        created_at: date,
        updated_at: date,
    }
}

/// Creates an invoice model whose subtotal is the whole total.
///
/// # Defaults
/// * no tax, fees, discount, or deposit
/// * issued and created 30 days before `due_date`
pub fn invoice_fixture(
    id: &str,
    job_id: &str,
    total: f64,
    balance: f64,
    due_date: DateTime<Utc>,
) -> invoice::Model {
    let issued = due_date - chrono::Duration::days(30);
    invoice::Model {
        id: id.to_string(),
        job_id: job_id.to_string(),
        subtotal: total,
        tax: 0.0,
        fees: 0.0,
        discount: 0.0,
        total,
        balance,
        deposit_required: 0.0,
        deposit_paid: 0.0,
        issued_date: issued,
        due_date,
        paid_in_full: balance <= 0.0,
        created_at: issued,
        updated_at: issued,
    }
}
