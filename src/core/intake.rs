//! Intake - creating clients and jobs, and issuing invoices.
//!
//! Drafts mirror the intake forms: every field is the raw text the user typed. Required
//! fields are checked after trimming, and ownership of new records comes from the
//! signed-in user rather than from the draft.

use crate::{
    config::BusinessSettings,
    core::{payment::round_cents, session::Session, store::RecordStore},
    entities::{JobStatus, Role, client, invoice, job},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tracing::{info, instrument};
use uuid::Uuid;

/// Date format used by the intake forms
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(value)
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses a form date (`YYYY-MM-DD`) as midnight UTC.
pub fn parse_form_date(value: &str, field: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), FORM_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::validation(format!("{field} must be a date like 2024-05-01")))
}

/// The new-client form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    /// Required
    pub first_name: String,
    /// Required
    pub last_name: String,
    /// Optional
    pub email: String,
    /// Required, stored as entered
    pub phone: String,
    /// Optional
    pub address: String,
}

/// Creates a client owned by the signed-in user.
///
/// Hunters become the client's hunter and taxidermists its taxidermist. Clients created
/// by an admin start unowned.
///
/// # Errors
/// * [`Error::NotAuthenticated`] - Nobody is signed in
/// * [`Error::Validation`] - First name, last name, or phone is blank
#[instrument(skip(db, session, draft))]
pub async fn create_client(
    db: &DatabaseConnection,
    session: &Session,
    draft: &ClientDraft,
) -> Result<client::Model> {
    let user = session.require_user()?;

    let first_name = required(&draft.first_name, "First name")?;
    let last_name = required(&draft.last_name, "Last name")?;
    let phone = required(&draft.phone, "Phone")?;

    let (hunter_id, taxidermist_id) = match user.role {
        Role::Hunter => (Some(user.id.clone()), None),
        Role::Taxidermist => (None, Some(user.id.clone())),
        Role::Admin => (None, None),
    };

    let now = Utc::now();
    let client = client::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(optional(&draft.email)),
        phone: Set(phone.to_string()),
        address: Set(optional(&draft.address)),
        hunter_id: Set(hunter_id),
        taxidermist_id: Set(taxidermist_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!("Created client {} ({})", client.full_name(), client.id);
    Ok(client)
}

/// The new-job form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    /// Required; must be a client the user can see
    pub client_id: String,
    /// Required, e.g. "Shoulder Mount"
    pub job_type: String,
    /// Required, e.g. "Elk"
    pub species: String,
    /// Optional
    pub description: String,
    /// `YYYY-MM-DD`; blank means today
    pub drop_off_date: String,
    /// Required, `YYYY-MM-DD`
    pub due_date: String,
    /// Dollars; blank means not quoted yet
    pub estimated_price: String,
    /// Optional
    pub special_instructions: String,
}

fn parse_price(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let price: f64 = raw
        .parse()
        .map_err(|_| Error::validation(format!("Estimated price is not a number: {raw}")))?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation("Estimated price cannot be negative"));
    }
    Ok(round_cents(price) + 0.0)
}

/// Opens a job for a client the signed-in user can see.
///
/// The job starts as [`JobStatus::Received`] and inherits the client's owners, with the
/// creator's own id filled in for their role.
///
/// # Errors
/// * [`Error::NotAuthenticated`] - Nobody is signed in
/// * [`Error::Validation`] - A required field is blank or a date or price is malformed
/// * [`Error::ClientNotFound`] - The client does not exist or is not visible
#[instrument(skip(db, session, draft))]
pub async fn create_job(
    db: &DatabaseConnection,
    session: &Session,
    draft: &JobDraft,
    now: DateTime<Utc>,
) -> Result<job::Model> {
    let user = session.require_user()?;

    let client_id = required(&draft.client_id, "Client")?;
    let job_type = required(&draft.job_type, "Job type")?;
    let species = required(&draft.species, "Species")?;
    let due_date = parse_form_date(required(&draft.due_date, "Due date")?, "Due date")?;
    let drop_off_date = if draft.drop_off_date.trim().is_empty() {
        now
    } else {
        parse_form_date(&draft.drop_off_date, "Drop-off date")?
    };
    let estimated_price = parse_price(&draft.estimated_price)?;

    let client = db
        .client_by_id(client_id)
        .await?
        .filter(|c| session.visibility().admits(c))
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let mut hunter_id = client.hunter_id.clone();
    let mut taxidermist_id = client.taxidermist_id.clone();
    match user.role {
        Role::Hunter => hunter_id = Some(user.id.clone()),
        Role::Taxidermist => taxidermist_id = Some(user.id.clone()),
        Role::Admin => {}
    }

    let job = job::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        client_id: Set(client.id.clone()),
        job_type: Set(job_type.to_string()),
        species: Set(species.to_string()),
        status: Set(JobStatus::Received),
        description: Set(optional(&draft.description)),
        drop_off_date: Set(drop_off_date),
        due_date: Set(due_date),
        completed_date: Set(None),
        estimated_price: Set(estimated_price),
        special_instructions: Set(optional(&draft.special_instructions)),
        hunter_id: Set(hunter_id),
        taxidermist_id: Set(taxidermist_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(
        "Created job {} for {} ({})",
        job.title(),
        client.full_name(),
        job.id
    );
    Ok(job)
}

/// Amounts of an invoice computed from a job price and the business settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceAmounts {
    /// The job's estimated price
    pub subtotal: f64,
    /// `subtotal * tax_rate / 100`
    pub tax: f64,
    /// Extra fees
    pub fees: f64,
    /// Discount
    pub discount: f64,
    /// `subtotal + tax + fees - discount`
    pub total: f64,
    /// `subtotal * deposit_rate`
    pub deposit_required: f64,
}

impl InvoiceAmounts {
    /// Computes invoice amounts, all rounded to cents.
    ///
    /// # Errors
    /// * [`Error::Validation`] - Negative or non-finite fees or discount, or a discount
    ///   larger than the rest of the invoice
    pub fn compute(
        subtotal: f64,
        fees: f64,
        discount: f64,
        business: &BusinessSettings,
    ) -> Result<Self> {
        if !fees.is_finite() || fees < 0.0 {
            return Err(Error::validation("Fees cannot be negative"));
        }
        if !discount.is_finite() || discount < 0.0 {
            return Err(Error::validation("Discount cannot be negative"));
        }

        let subtotal = round_cents(subtotal);
        let tax = round_cents(subtotal * business.tax_rate / 100.0);
        let fees = round_cents(fees);
        let discount = round_cents(discount);
        let gross = round_cents(subtotal + tax + fees);
        if discount > gross {
            return Err(Error::validation(format!(
                "Discount ${discount:.2} exceeds the invoice amount ${gross:.2}"
            )));
        }

        Ok(Self {
            subtotal,
            tax,
            fees,
            discount,
            total: round_cents(gross - discount),
            deposit_required: round_cents(subtotal * business.deposit_rate),
        })
    }
}

/// Issues the invoice for a job.
///
/// Only taxidermists and admins bill work. `discount` is in dollars; when it is `None`
/// the configured default percentage of the job's price is taken off. The invoice opens with the full total outstanding and nothing paid.
///
/// # Errors
/// * [`Error::NotAuthenticated`] - Nobody is signed in
/// * [`Error::PermissionDenied`] - The user is a hunter
/// * [`Error::JobNotFound`] - The job does not exist or is not visible
/// * [`Error::Validation`] - The job is already invoiced, or bad fees or discount
#[instrument(skip(db, session, business))]
pub async fn issue_invoice(
    db: &DatabaseConnection,
    session: &Session,
    job_id: &str,
    fees: f64,
    discount: Option<f64>,
    business: &BusinessSettings,
    now: DateTime<Utc>,
) -> Result<invoice::Model> {
    session.require_user()?;
    if !session.has_role([Role::Taxidermist, Role::Admin]) {
        return Err(Error::PermissionDenied {
            message: "only taxidermists and admins can issue invoices".to_string(),
        });
    }

    let job = db
        .job_by_id(job_id)
        .await?
        .filter(|j| session.visibility().admits(j))
        .ok_or_else(|| Error::JobNotFound {
            id: job_id.to_string(),
        })?;

    if let Some(existing) = db.invoice_by_job_id(&job.id).await? {
        return Err(Error::validation(format!(
            "Job {} already has invoice {}",
            job.id, existing.id
        )));
    }

    let amounts = InvoiceAmounts::compute(
        job.estimated_price,
        fees,
        discount.unwrap_or_else(|| business.default_discount_on(job.estimated_price)),
        business,
    )?;

    let invoice = invoice::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        job_id: Set(job.id.clone()),
        subtotal: Set(amounts.subtotal),
        tax: Set(amounts.tax),
        fees: Set(amounts.fees),
        discount: Set(amounts.discount),
        total: Set(amounts.total),
        balance: Set(amounts.total),
        deposit_required: Set(amounts.deposit_required),
        deposit_paid: Set(0.0),
        issued_date: Set(now),
        due_date: Set(now + Duration::days(business.invoice_terms_days)),
        paid_in_full: Set(amounts.total <= 0.0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(
        "Issued invoice {} for job {}: total ${:.2}",
        invoice.id, job.id, invoice.total
    );
    Ok(invoice)
}
