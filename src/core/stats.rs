//! Dashboard statistics and derived invoice state.
//!
//! This module turns role-scoped record lists into the numbers the CRM displays:
//! dashboard cards, invoice badges, overdue counts, per-client job counts, the job
//! board columns, and the invoice summary strip. All functions are pure and take the
//! current time explicitly.

use crate::{
    core::{
        store::Records,
        visibility::{
            InvoiceRow, SearchTerm, Visibility, visible_clients, visible_invoices, visible_jobs,
        },
    },
    entities::{JobStatus, invoice, job},
};
use chrono::{DateTime, Datelike, Utc};
use std::fmt;

/// Badge state of an invoice, derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    /// Nothing left to pay
    Paid,
    /// Money owed and the due date has passed
    Overdue,
    /// Money owed, not yet due
    Pending,
}

impl InvoiceStatus {
    /// Derives the status from a balance and due date.
    ///
    /// A zero or negative balance is always `Paid`, even when the due date has passed.
    #[must_use]
    pub fn derive(balance: f64, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if balance <= 0.0 {
            Self::Paid
        } else if due_date < now {
            Self::Overdue
        } else {
            Self::Pending
        }
    }

    /// Derives the status of an invoice.
    #[must_use]
    pub fn of(invoice: &invoice::Model, now: DateTime<Utc>) -> Self {
        Self::derive(invoice.balance, invoice.due_date, now)
    }

    /// Badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether an invoice still has money owing past its due date.
#[must_use]
pub fn is_overdue(invoice: &invoice::Model, now: DateTime<Utc>) -> bool {
    invoice.balance > 0.0 && invoice.due_date < now
}

/// Counts overdue invoices.
pub fn overdue_count<'a, I>(invoices: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a invoice::Model>,
{
    invoices
        .into_iter()
        .filter(|inv| is_overdue(inv, now))
        .count()
}

/// Sum of `total - balance` (money collected).
pub fn revenue<'a, I>(invoices: I) -> f64
where
    I: IntoIterator<Item = &'a invoice::Model>,
{
    invoices.into_iter().map(invoice::Model::collected).sum()
}

/// Figures shown on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    /// Clients visible to the user
    pub total_clients: usize,
    /// Received or in-progress jobs
    pub active_jobs: usize,
    /// Finished jobs
    pub completed_jobs: usize,
    /// Money collected; computed for admins and taxidermists only
    pub total_revenue: Option<f64>,
    /// Jobs not yet started; computed for hunters only
    pub pending_jobs: Option<usize>,
}

/// Computes dashboard statistics for the user's visibility.
///
/// - Admin: all clients and jobs, revenue over every invoice.
/// - Hunter: own clients and jobs, plus pending (received) jobs; no revenue.
/// - Taxidermist: own clients and jobs, revenue over invoices for own jobs.
/// - No session: zeros.
#[must_use]
pub fn dashboard_stats(visibility: &Visibility, records: &Records) -> DashboardStats {
    let clients = visible_clients(visibility, records, &SearchTerm::default());
    let jobs = visible_jobs(visibility, records);

    let active_jobs = jobs.iter().filter(|j| j.status.is_active()).count();
    let completed_jobs = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Finished)
        .count();

    match visibility {
        Visibility::Everything | Visibility::Taxidermist(_) => {
            let rows = visible_invoices(visibility, records, &SearchTerm::default());
            DashboardStats {
                total_clients: clients.len(),
                active_jobs,
                completed_jobs,
                total_revenue: Some(revenue(rows.iter().map(|row| row.invoice))),
                pending_jobs: None,
            }
        }
        Visibility::Hunter(_) => DashboardStats {
            total_clients: clients.len(),
            active_jobs,
            completed_jobs,
            total_revenue: None,
            pending_jobs: Some(
                jobs.iter()
                    .filter(|j| j.status == JobStatus::Received)
                    .count(),
            ),
        },
        Visibility::Nothing => DashboardStats {
            total_revenue: Some(0.0),
            ..DashboardStats::default()
        },
    }
}

/// Job counts shown next to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientJobStats {
    /// Received or in-progress jobs
    pub active_jobs: usize,
    /// All jobs for the client
    pub total_jobs: usize,
}

/// Counts a client's jobs within `jobs`.
///
/// No role filtering happens here; pass the job list you want counted.
pub fn client_job_stats<'a, I>(client_id: &str, jobs: I) -> ClientJobStats
where
    I: IntoIterator<Item = &'a job::Model>,
{
    jobs.into_iter()
        .filter(|j| j.client_id == client_id)
        .fold(ClientJobStats::default(), |mut stats, j| {
            stats.total_jobs += 1;
            if j.status.is_active() {
                stats.active_jobs += 1;
            }
            stats
        })
}

/// Jobs grouped into one column per status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobBoard<'a> {
    /// Received jobs
    pub received: Vec<&'a job::Model>,
    /// In-progress jobs
    pub in_progress: Vec<&'a job::Model>,
    /// Finished jobs
    pub finished: Vec<&'a job::Model>,
    /// Delivered jobs
    pub delivered: Vec<&'a job::Model>,
}

impl<'a> JobBoard<'a> {
    /// Jobs in one column.
    #[must_use]
    pub fn column(&self, status: JobStatus) -> &[&'a job::Model] {
        match status {
            JobStatus::Received => &self.received,
            JobStatus::InProgress => &self.in_progress,
            JobStatus::Finished => &self.finished,
            JobStatus::Delivered => &self.delivered,
        }
    }

    /// Number of jobs in one column.
    #[must_use]
    pub fn count(&self, status: JobStatus) -> usize {
        self.column(status).len()
    }
}

/// Groups jobs by status, keeping their order within each column.
pub fn job_board<'a, I>(jobs: I) -> JobBoard<'a>
where
    I: IntoIterator<Item = &'a job::Model>,
{
    let mut board = JobBoard::default();
    for j in jobs {
        match j.status {
            JobStatus::Received => board.received.push(j),
            JobStatus::InProgress => board.in_progress.push(j),
            JobStatus::Finished => board.finished.push(j),
            JobStatus::Delivered => board.delivered.push(j),
        }
    }
    board
}

/// Summary strip above the invoice table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoiceSummary {
    /// Sum of balances
    pub total_outstanding: f64,
    /// Number of invoices listed
    pub invoice_count: usize,
    /// Invoices with a balance past due
    pub overdue_count: usize,
    /// Invoices created in the current calendar month
    pub created_this_month: usize,
}

/// Summarises a list of invoice rows.
#[must_use]
pub fn invoice_summary(rows: &[InvoiceRow<'_>], now: DateTime<Utc>) -> InvoiceSummary {
    InvoiceSummary {
        total_outstanding: rows.iter().map(|row| row.invoice.balance).sum(),
        invoice_count: rows.len(),
        overdue_count: overdue_count(rows.iter().map(|row| row.invoice), now),
        created_this_month: rows
            .iter()
            .filter(|row| {
                row.invoice.created_at.year() == now.year()
                    && row.invoice.created_at.month() == now.month()
            })
            .count(),
    }
}

/// Formats a dollar amount with two decimals and thousands separators.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{fraction}")
}
