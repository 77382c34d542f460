//! Record store - read access to users, clients, jobs, invoices, and payments.
//!
//! [`RecordStore`] is the repository interface the rest of the crate reads through. It is
//! implemented for every `SeaORM` connection (a plain `DatabaseConnection` or an open
//! transaction). Point lookups return `Ok(None)` when a row is missing, so a dangling
//! foreign key never turns into an error.
//!
//! [`Records`] is an in-memory snapshot of the four linked collections. The visibility
//! and aggregation functions work on a snapshot and never touch the database.

use crate::{
    entities::{
        Client, Invoice, Job, Payment, Role, User, client, invoice, job, payment, user,
    },
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};
use tracing::{debug, instrument};

/// Repository interface over the CRM tables.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Finds a user by primary key.
    async fn user_by_id(&self, id: &str) -> Result<Option<user::Model>>;
    /// Finds the user with this email signing in as this role.
    async fn user_by_email_and_role(&self, email: &str, role: Role)
    -> Result<Option<user::Model>>;
    /// Finds a client by primary key.
    async fn client_by_id(&self, id: &str) -> Result<Option<client::Model>>;
    /// Finds a job by primary key.
    async fn job_by_id(&self, id: &str) -> Result<Option<job::Model>>;
    /// Finds an invoice by primary key.
    async fn invoice_by_id(&self, id: &str) -> Result<Option<invoice::Model>>;
    /// All jobs for one client.
    async fn jobs_by_client_id(&self, client_id: &str) -> Result<Vec<job::Model>>;
    /// The invoice billing a job, if one has been issued.
    async fn invoice_by_job_id(&self, job_id: &str) -> Result<Option<invoice::Model>>;
    /// All payments applied to one invoice, oldest first.
    async fn payments_by_invoice_id(&self, invoice_id: &str) -> Result<Vec<payment::Model>>;
    /// Every client, in creation order.
    async fn list_clients(&self) -> Result<Vec<client::Model>>;
    /// Every job, in creation order.
    async fn list_jobs(&self) -> Result<Vec<job::Model>>;
    /// Every invoice, in creation order.
    async fn list_invoices(&self) -> Result<Vec<invoice::Model>>;
    /// Every payment, oldest first.
    async fn list_payments(&self) -> Result<Vec<payment::Model>>;
}

impl<C> RecordStore for C
where
    C: ConnectionTrait,
{
    async fn user_by_id(&self, id: &str) -> Result<Option<user::Model>> {
        User::find_by_id(id.to_string())
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn user_by_email_and_role(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::Role.eq(role))
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn client_by_id(&self, id: &str) -> Result<Option<client::Model>> {
        Client::find_by_id(id.to_string())
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn job_by_id(&self, id: &str) -> Result<Option<job::Model>> {
        Job::find_by_id(id.to_string())
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn invoice_by_id(&self, id: &str) -> Result<Option<invoice::Model>> {
        Invoice::find_by_id(id.to_string())
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn jobs_by_client_id(&self, client_id: &str) -> Result<Vec<job::Model>> {
        Job::find()
            .filter(job::Column::ClientId.eq(client_id))
            .order_by_asc(job::Column::CreatedAt)
            .order_by_asc(job::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn invoice_by_job_id(&self, job_id: &str) -> Result<Option<invoice::Model>> {
        Invoice::find()
            .filter(invoice::Column::JobId.eq(job_id))
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn payments_by_invoice_id(&self, invoice_id: &str) -> Result<Vec<payment::Model>> {
        Payment::find()
            .filter(payment::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payment::Column::Timestamp)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn list_clients(&self) -> Result<Vec<client::Model>> {
        Client::find()
            .order_by_asc(client::Column::CreatedAt)
            .order_by_asc(client::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn list_jobs(&self) -> Result<Vec<job::Model>> {
        Job::find()
            .order_by_asc(job::Column::CreatedAt)
            .order_by_asc(job::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn list_invoices(&self) -> Result<Vec<invoice::Model>> {
        Invoice::find()
            .order_by_asc(invoice::Column::CreatedAt)
            .order_by_asc(invoice::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }

    async fn list_payments(&self) -> Result<Vec<payment::Model>> {
        Payment::find()
            .order_by_asc(payment::Column::Timestamp)
            .all(self)
            .await
            .map_err(Into::into)
    }
}

/// Snapshot of the four linked record collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    /// All clients
    pub clients: Vec<client::Model>,
    /// All jobs
    pub jobs: Vec<job::Model>,
    /// All invoices
    pub invoices: Vec<invoice::Model>,
    /// All payments
    pub payments: Vec<payment::Model>,
}

impl Records {
    /// Loads every collection from a store.
    #[instrument(skip(store))]
    pub async fn load<S>(store: &S) -> Result<Self>
    where
        S: RecordStore,
    {
        let records = Self {
            clients: store.list_clients().await?,
            jobs: store.list_jobs().await?,
            invoices: store.list_invoices().await?,
            payments: store.list_payments().await?,
        };
        debug!(
            "Loaded {} clients, {} jobs, {} invoices, {} payments",
            records.clients.len(),
            records.jobs.len(),
            records.invoices.len(),
            records.payments.len()
        );
        Ok(records)
    }

    /// Finds a client by id.
    #[must_use]
    pub fn client_by_id(&self, id: &str) -> Option<&client::Model> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Finds a job by id.
    #[must_use]
    pub fn job_by_id(&self, id: &str) -> Option<&job::Model> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Finds an invoice by id.
    #[must_use]
    pub fn invoice_by_id(&self, id: &str) -> Option<&invoice::Model> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Jobs belonging to a client.
    pub fn jobs_by_client_id<'a>(
        &'a self,
        client_id: &'a str,
    ) -> impl Iterator<Item = &'a job::Model> + 'a {
        self.jobs.iter().filter(move |j| j.client_id == client_id)
    }

    /// The invoice for a job, if any.
    #[must_use]
    pub fn invoice_by_job_id(&self, job_id: &str) -> Option<&invoice::Model> {
        self.invoices.iter().find(|i| i.job_id == job_id)
    }

    /// Payments applied to an invoice.
    pub fn payments_by_invoice_id<'a>(
        &'a self,
        invoice_id: &'a str,
    ) -> impl Iterator<Item = &'a payment::Model> + 'a {
        self.payments
            .iter()
            .filter(move |p| p.invoice_id == invoice_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{demo_records, seeded_test_db, setup_test_db};

    #[tokio::test]
    async fn test_point_lookups_on_seeded_store() -> Result<()> {
        let db = seeded_test_db().await?;

        let client = db.client_by_id("1").await?.unwrap();
        assert_eq!(client.last_name, "Thompson");

        let job = db.job_by_id("3").await?.unwrap();
        assert_eq!(job.species, "Elk");

        let invoice = db.invoice_by_job_id("1").await?.unwrap();
        assert_eq!(invoice.id, "1");

        let payments = db.payments_by_invoice_id("1").await?;
        assert_eq!(payments.len(), 1);
        assert!(db.payments_by_invoice_id("2").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_rows_are_absent_not_errors() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(db.client_by_id("404").await?.is_none());
        assert!(db.job_by_id("404").await?.is_none());
        assert!(db.invoice_by_id("404").await?.is_none());
        assert!(db.invoice_by_job_id("404").await?.is_none());
        assert!(db.jobs_by_client_id("404").await?.is_empty());
        assert!(db.user_by_id("404").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_user_lookup_requires_matching_role() -> Result<()> {
        let db = seeded_test_db().await?;

        let hunter = db
            .user_by_email_and_role("hunter@demo.com", Role::Hunter)
            .await?;
        assert!(hunter.is_some());

        let wrong_role = db
            .user_by_email_and_role("hunter@demo.com", Role::Admin)
            .await?;
        assert!(wrong_role.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_load_snapshot() -> Result<()> {
        let db = seeded_test_db().await?;
        let records = Records::load(&db).await?;

        assert_eq!(records.clients.len(), 3);
        assert_eq!(records.jobs.len(), 3);
        assert_eq!(records.invoices.len(), 2);
        assert_eq!(records.payments.len(), 1);
        Ok(())
    }

    #[test]
    fn test_snapshot_lookups() {
        let records = demo_records();

        assert_eq!(records.client_by_id("2").unwrap().first_name, "Mike");
        assert!(records.client_by_id("99").is_none());
        assert_eq!(records.jobs_by_client_id("1").count(), 1);
        assert_eq!(records.invoice_by_job_id("2").unwrap().id, "2");
        assert!(records.invoice_by_job_id("3").is_none());
        assert_eq!(records.payments_by_invoice_id("1").count(), 1);
    }
}
