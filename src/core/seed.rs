//! Demo dataset.
//!
//! Three users (one per role, all with the shared demo password), three clients, three
//! jobs, two invoices, and one deposit payment. The binary loads it into an empty
//! database so every role has something to look at.

use crate::{
    core::store::Records,
    entities::{
        JobStatus, PaymentMethod, Role, User, client, invoice, job, payment, user,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Every seeded row.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoData {
    /// Demo accounts
    pub users: Vec<user::Model>,
    /// Clients, jobs, invoices, and payments
    pub records: Records,
}

fn date(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::Config {
            message: format!("invalid demo date {year}-{month:02}-{day:02}"),
        })
}

fn demo_users() -> Result<Vec<user::Model>> {
    let created = date(2024, 1, 1)?;
    Ok(vec![
        user::Model {
            id: "1".to_string(),
            email: "hunter@demo.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Hunter".to_string(),
            role: Role::Hunter,
            business_name: Some("Hunter Outfitters".to_string()),
            phone: Some("(555) 123-4567".to_string()),
            address: None,
            created_at: created,
            last_login_at: None,
        },
        user::Model {
            id: "2".to_string(),
            email: "taxidermist@demo.com".to_string(),
            first_name: "Sarah".to_string(),
            last_name: "Williams".to_string(),
            role: Role::Taxidermist,
            business_name: Some("Wildlife Artistry".to_string()),
            phone: Some("(555) 987-6543".to_string()),
            address: Some("123 Main St, Outdoorsville, TX 75001".to_string()),
            created_at: created,
            last_login_at: None,
        },
        user::Model {
            id: "3".to_string(),
            email: "admin@demo.com".to_string(),
            first_name: "Mike".to_string(),
            last_name: "Admin".to_string(),
            role: Role::Admin,
            business_name: None,
            phone: None,
            address: None,
            created_at: created,
            last_login_at: None,
        },
    ])
}

fn demo_clients() -> Result<Vec<client::Model>> {
    Ok(vec![
        client::Model {
            id: "1".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Thompson".to_string(),
            email: Some("bob.thompson@email.com".to_string()),
            phone: "(555) 234-5678".to_string(),
            address: Some("456 Oak Street, Huntsville, TX 77340".to_string()),
            hunter_id: Some("1".to_string()),
            taxidermist_id: None,
            created_at: date(2024, 1, 15)?,
            updated_at: date(2024, 1, 15)?,
        },
        client::Model {
            id: "2".to_string(),
            first_name: "Mike".to_string(),
            last_name: "Johnson".to_string(),
            email: Some("mike.j@email.com".to_string()),
            phone: "(555) 345-6789".to_string(),
            address: Some("789 Pine Ave, Deer Park, TX 77536".to_string()),
            hunter_id: Some("1".to_string()),
            taxidermist_id: None,
            created_at: date(2024, 2, 1)?,
            updated_at: date(2024, 2, 1)?,
        },
        client::Model {
            id: "3".to_string(),
            first_name: "Lisa".to_string(),
            last_name: "Davis".to_string(),
            email: None,
            phone: "(555) 456-7890".to_string(),
            address: Some("321 Cedar Ln, Conroe, TX 77301".to_string()),
            hunter_id: None,
            taxidermist_id: Some("2".to_string()),
            created_at: date(2024, 1, 20)?,
            updated_at: date(2024, 1, 20)?,
        },
    ])
}

fn demo_jobs() -> Result<Vec<job::Model>> {
    Ok(vec![
        job::Model {
            id: "1".to_string(),
            client_id: "1".to_string(),
            job_type: "Shoulder Mount".to_string(),
            species: "White-tailed Deer".to_string(),
            status: JobStatus::InProgress,
            description: Some("8-point buck, shoulder mount with oak base".to_string()),
            drop_off_date: date(2024, 1, 20)?,
            due_date: date(2024, 4, 20)?,
            completed_date: None,
            estimated_price: 450.0,
            special_instructions: Some("Customer wants slightly turned head position".to_string()),
            hunter_id: Some("1".to_string()),
            taxidermist_id: Some("2".to_string()),
            created_at: date(2024, 1, 20)?,
            updated_at: date(2024, 2, 15)?,
        },
        job::Model {
            id: "2".to_string(),
            client_id: "2".to_string(),
            job_type: "Full Body Mount".to_string(),
            species: "Wild Turkey".to_string(),
            status: JobStatus::Received,
            description: Some("Tom turkey, full strut position".to_string()),
            drop_off_date: date(2024, 2, 10)?,
            due_date: date(2024, 5, 10)?,
            completed_date: None,
            estimated_price: 650.0,
            special_instructions: Some("Display quality, museum pose".to_string()),
            hunter_id: Some("1".to_string()),
            taxidermist_id: Some("2".to_string()),
            created_at: date(2024, 2, 10)?,
            updated_at: date(2024, 2, 10)?,
        },
        job::Model {
            id: "3".to_string(),
            client_id: "3".to_string(),
            job_type: "European Mount".to_string(),
            species: "Elk".to_string(),
            status: JobStatus::Finished,
            description: Some("Bull elk skull and antlers".to_string()),
            drop_off_date: date(2024, 1, 5)?,
            due_date: date(2024, 2, 5)?,
            completed_date: Some(date(2024, 1, 30)?),
            estimated_price: 200.0,
            special_instructions: None,
            hunter_id: None,
            taxidermist_id: Some("2".to_string()),
            created_at: date(2024, 1, 5)?,
            updated_at: date(2024, 1, 30)?,
        },
    ])
}

fn demo_invoices() -> Result<Vec<invoice::Model>> {
    Ok(vec![
        invoice::Model {
            id: "1".to_string(),
            job_id: "1".to_string(),
            subtotal: 450.0,
            tax: 36.0,
            fees: 15.0,
            discount: 0.0,
            total: 501.0,
            balance: 276.0,
            deposit_required: 225.0,
            deposit_paid: 225.0,
            issued_date: date(2024, 1, 20)?,
            due_date: date(2024, 4, 20)?,
            paid_in_full: false,
            created_at: date(2024, 1, 20)?,
            updated_at: date(2024, 1, 20)?,
        },
        invoice::Model {
            id: "2".to_string(),
            job_id: "2".to_string(),
            subtotal: 650.0,
            tax: 52.0,
            fees: 20.0,
            discount: 50.0,
            total: 672.0,
            balance: 672.0,
            deposit_required: 325.0,
            deposit_paid: 0.0,
            issued_date: date(2024, 2, 10)?,
            due_date: date(2024, 5, 10)?,
            paid_in_full: false,
            created_at: date(2024, 2, 10)?,
            updated_at: date(2024, 2, 10)?,
        },
    ])
}

fn demo_payments() -> Result<Vec<payment::Model>> {
    Ok(vec![payment::Model {
        id: "1".to_string(),
        invoice_id: "1".to_string(),
        amount: 225.0,
        method: PaymentMethod::Card,
        processor_fee: 7.25,
        notes: Some("Deposit payment".to_string()),
        timestamp: date(2024, 1, 20)?,
        processed_by: "2".to_string(),
    }])
}

/// Builds the demo dataset in memory.
pub fn demo_data() -> Result<DemoData> {
    Ok(DemoData {
        users: demo_users()?,
        records: Records {
            clients: demo_clients()?,
            jobs: demo_jobs()?,
            invoices: demo_invoices()?,
            payments: demo_payments()?,
        },
    })
}

/// Loads the demo dataset if the database has no users yet.
///
/// Rows are inserted in foreign-key order inside one transaction.
///
/// # Returns
/// * `Ok(true)` - The dataset was inserted
/// * `Ok(false)` - Users already existed; nothing was written
#[instrument(skip(db))]
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<bool> {
    if User::find().one(db).await?.is_some() {
        info!("Users already present, skipping demo data");
        return Ok(false);
    }

    let DemoData { users, records } = demo_data()?;
    let txn = db.begin().await?;

    for model in users {
        user::ActiveModel::from(model).reset_all().insert(&txn).await?;
    }
    for model in records.clients {
        client::ActiveModel::from(model).reset_all().insert(&txn).await?;
    }
    for model in records.jobs {
        job::ActiveModel::from(model).reset_all().insert(&txn).await?;
    }
    for model in records.invoices {
        invoice::ActiveModel::from(model).reset_all().insert(&txn).await?;
    }
    for model in records.payments {
        payment::ActiveModel::from(model).reset_all().insert(&txn).await?;
    }

    txn.commit().await?;
    info!("Seeded demo data");
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{
            stats::dashboard_stats,
            store::RecordStore,
            visibility::Visibility,
        },
        test_utils::setup_test_db,
    };

    #[tokio::test]
    async fn test_seed_only_into_empty_database() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(seed_demo_data(&db).await?);
        assert!(!seed_demo_data(&db).await?);

        let mut records = Records::load(&db).await?;
        records.clients.sort_by(|a, b| a.id.cmp(&b.id));
        records.jobs.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(records, demo_data()?.records);
        assert!(db.user_by_id("3").await?.is_some());
        Ok(())
    }

    #[test]
    fn test_invoice_totals_are_consistent() {
        let data = demo_data().unwrap();
        for invoice in &data.records.invoices {
            assert_eq!(
                invoice.total,
                invoice.subtotal + invoice.tax + invoice.fees - invoice.discount
            );
            let paid: f64 = data
                .records
                .payments_by_invoice_id(&invoice.id)
                .map(|p| p.amount)
                .sum();
            assert_eq!(invoice.balance, invoice.total - paid);
        }
    }

    #[tokio::test]
    async fn test_seeded_dashboards() -> Result<()> {
        let db = setup_test_db().await?;
        seed_demo_data(&db).await?;
        let records = Records::load(&db).await?;

        let admin = dashboard_stats(&Visibility::Everything, &records);
        assert_eq!(admin.total_clients, 3);
        assert_eq!(admin.active_jobs, 2);
        assert_eq!(admin.completed_jobs, 1);
        assert_eq!(admin.total_revenue, Some(225.0));

        let hunter = dashboard_stats(&Visibility::Hunter("1".to_string()), &records);
        assert_eq!(hunter.total_clients, 2);
        assert_eq!(hunter.active_jobs, 2);
        assert_eq!(hunter.completed_jobs, 0);
        assert_eq!(hunter.pending_jobs, Some(1));
        assert!(hunter.total_revenue.is_none());
        Ok(())
    }
}
