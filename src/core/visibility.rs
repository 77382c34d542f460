//! Role-scoped visibility and search.
//!
//! Every list the CRM shows goes through this module. A [`Visibility`] is derived from
//! the signed-in user and decides which records that user may see:
//!
//! - admins see everything,
//! - hunters see records whose `hunter_id` is their id,
//! - taxidermists see records whose `taxidermist_id` is their id,
//! - with nobody signed in, nothing is visible.
//!
//! Invoices carry no ownership of their own and are scoped through their job. Search is
//! applied after visibility; the two combine with AND.

use crate::{
    core::store::Records,
    entities::{Role, client, invoice, job, user},
};

/// Placeholder shown when an invoice's client cannot be resolved
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Placeholder shown when an invoice's job cannot be resolved
pub const UNKNOWN_JOB: &str = "Unknown Job";

/// A record owned through nullable hunter and taxidermist ids.
pub trait Owned {
    /// Owning hunter's user id
    fn hunter_id(&self) -> Option<&str>;
    /// Owning taxidermist's user id
    fn taxidermist_id(&self) -> Option<&str>;
}

impl Owned for client::Model {
    fn hunter_id(&self) -> Option<&str> {
        self.hunter_id.as_deref()
    }

    fn taxidermist_id(&self) -> Option<&str> {
        self.taxidermist_id.as_deref()
    }
}

impl Owned for job::Model {
    fn hunter_id(&self) -> Option<&str> {
        self.hunter_id.as_deref()
    }

    fn taxidermist_id(&self) -> Option<&str> {
        self.taxidermist_id.as_deref()
    }
}

/// What the current user is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Admin: every record
    Everything,
    /// Hunter: records owned by this hunter id
    Hunter(String),
    /// Taxidermist: records owned by this taxidermist id
    Taxidermist(String),
    /// No session: no records
    Nothing,
}

impl Visibility {
    /// Derives the visibility for an optional signed-in user.
    #[must_use]
    pub fn for_user(user: Option<&user::Model>) -> Self {
        match user {
            None => Self::Nothing,
            Some(user) => match user.role {
                Role::Admin => Self::Everything,
                Role::Hunter => Self::Hunter(user.id.clone()),
                Role::Taxidermist => Self::Taxidermist(user.id.clone()),
            },
        }
    }

    /// Whether an owned record is visible.
    #[must_use]
    pub fn admits<T>(&self, record: &T) -> bool
    where
        T: Owned + ?Sized,
    {
        match self {
            Self::Everything => true,
            Self::Hunter(id) => record.hunter_id() == Some(id.as_str()),
            Self::Taxidermist(id) => record.taxidermist_id() == Some(id.as_str()),
            Self::Nothing => false,
        }
    }

    /// Whether an invoice billed against `job` is visible.
    ///
    /// Admins see invoices whose job is missing; nobody else can, because ownership
    /// cannot be established without the job.
    #[must_use]
    pub fn admits_invoice(&self, job: Option<&job::Model>) -> bool {
        match self {
            Self::Everything => true,
            Self::Hunter(_) | Self::Taxidermist(_) => job.is_some_and(|j| self.admits(j)),
            Self::Nothing => false,
        }
    }
}

/// Keeps the owned records visible under `visibility`, preserving order.
pub fn visible<'a, T>(visibility: &Visibility, records: &'a [T]) -> Vec<&'a T>
where
    T: Owned,
{
    records.iter().filter(|r| visibility.admits(*r)).collect()
}

/// A search box value.
///
/// Names and invoice ids are matched case-insensitively; phone numbers are matched as
/// literal strings. An empty term matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    /// Builds a search term from user input.
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self {
            raw: term.to_string(),
            folded: term.to_lowercase(),
        }
    }

    /// Whether the term is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn matches_folded(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }

    fn matches_literal(&self, haystack: &str) -> bool {
        haystack.contains(&self.raw)
    }

    /// First name, last name, or phone.
    #[must_use]
    pub fn matches_client(&self, client: &client::Model) -> bool {
        self.is_empty()
            || self.matches_folded(&client.first_name)
            || self.matches_folded(&client.last_name)
            || self.matches_literal(&client.phone)
    }

    /// Client first or last name, or the invoice id.
    #[must_use]
    pub fn matches_invoice(&self, row: &InvoiceRow<'_>) -> bool {
        self.is_empty()
            || self.matches_folded(&row.invoice.id)
            || row.client.is_some_and(|c| {
                self.matches_folded(&c.first_name) || self.matches_folded(&c.last_name)
            })
    }
}

impl From<&str> for SearchTerm {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

/// An invoice joined with its job and client, either of which may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceRow<'a> {
    /// The invoice itself
    pub invoice: &'a invoice::Model,
    /// The billed job, if it still exists
    pub job: Option<&'a job::Model>,
    /// The job's client, if both still exist
    pub client: Option<&'a client::Model>,
}

impl<'a> InvoiceRow<'a> {
    /// Resolves the job and client for an invoice.
    #[must_use]
    pub fn resolve(invoice: &'a invoice::Model, records: &'a Records) -> Self {
        let job = records.job_by_id(&invoice.job_id);
        let client = job.and_then(|j| records.client_by_id(&j.client_id));
        Self {
            invoice,
            job,
            client,
        }
    }

    /// Client's full name, or [`UNKNOWN_CLIENT`].
    #[must_use]
    pub fn client_label(&self) -> String {
        self.client
            .map_or_else(|| UNKNOWN_CLIENT.to_string(), client::Model::full_name)
    }

    /// "Type - Species", or [`UNKNOWN_JOB`].
    #[must_use]
    pub fn job_label(&self) -> String {
        self.job
            .map_or_else(|| UNKNOWN_JOB.to_string(), job::Model::title)
    }
}

/// Clients visible to the user that match the search.
///
/// With an empty search this is also the list of clients a user may open a job for.
pub fn visible_clients<'a>(
    visibility: &Visibility,
    records: &'a Records,
    search: &SearchTerm,
) -> Vec<&'a client::Model> {
    records
        .clients
        .iter()
        .filter(|c| visibility.admits(*c) && search.matches_client(c))
        .collect()
}

/// Jobs visible to the user.
pub fn visible_jobs<'a>(visibility: &Visibility, records: &'a Records) -> Vec<&'a job::Model> {
    visible(visibility, &records.jobs)
}

/// Invoices visible to the user that match the search, joined with job and client.
pub fn visible_invoices<'a>(
    visibility: &Visibility,
    records: &'a Records,
    search: &SearchTerm,
) -> Vec<InvoiceRow<'a>> {
    records
        .invoices
        .iter()
        .map(|invoice| InvoiceRow::resolve(invoice, records))
        .filter(|row| visibility.admits_invoice(row.job) && search.matches_invoice(row))
        .collect()
}

/// The most recently created visible jobs, newest first.
pub fn recent_jobs<'a>(
    visibility: &Visibility,
    records: &'a Records,
    limit: usize,
) -> Vec<&'a job::Model> {
    let mut jobs = visible_jobs(visibility, records);
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    jobs.truncate(limit);
    jobs
}
