//! Payment validation and recording.
//!
//! [`validate_payment`] checks a payment form against an invoice's outstanding balance.
//! [`record_payment`] runs that validation against the stored balance and then applies
//! the payment: the payment row is inserted and the invoice's balance, deposit, and
//! paid-in-full flag are updated in a single database transaction.

use crate::{
    core::{session::Session, store::RecordStore},
    entities::{PaymentMethod, invoice, payment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};
use uuid::Uuid;

/// Rounds a dollar amount to whole cents.
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A payment form as entered, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Amount field
    pub amount: String,
    /// Selected method, code or label (e.g., "Credit Card")
    pub method: Option<String>,
    /// Processor fee field; blank means no fee
    pub processor_fee: String,
    /// Free-form notes; blank means none
    pub notes: String,
}

/// A payment that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayment {
    /// Amount in dollars, rounded to cents
    pub amount: f64,
    /// Payment method
    pub method: PaymentMethod,
    /// Processor fee in dollars, rounded to cents
    pub processor_fee: f64,
    /// Notes, if any were entered
    pub notes: Option<String>,
}

fn parse_amount(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("Payment amount is required"));
    }
    let amount: f64 = raw
        .parse()
        .map_err(|_| Error::validation(format!("Payment amount is not a number: {raw}")))?;
    if !amount.is_finite() {
        return Err(Error::validation(format!("Payment amount is not a number: {raw}")));
    }
    let amount = round_cents(amount);
    if amount <= 0.0 {
        return Err(Error::validation("Payment amount must be at least one cent"));
    }
    Ok(amount)
}

fn parse_method(raw: Option<&str>) -> Result<PaymentMethod> {
    match raw.map(str::trim) {
        None | Some("") => Err(Error::validation("Payment method is required")),
        Some(method) => method.parse(),
    }
}

fn parse_fee(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let fee: f64 = raw
        .parse()
        .map_err(|_| Error::validation(format!("Processor fee is not a number: {raw}")))?;
    if !fee.is_finite() || fee < 0.0 {
        return Err(Error::validation("Processor fee cannot be negative"));
    }
    // "-0" parses as -0.0
    Ok(round_cents(fee) + 0.0)
}

/// Validates a payment form against the invoice's outstanding balance.
///
/// # Errors
/// * [`Error::Validation`] - Missing or malformed amount, method, or fee, or an amount of
///   zero or less
/// * [`Error::AmountTooHigh`] - The amount is larger than `balance`. Paying exactly the
///   balance is allowed.
pub fn validate_payment(draft: &PaymentDraft, balance: f64) -> Result<ValidatedPayment> {
    let amount = parse_amount(&draft.amount)?;
    let method = parse_method(draft.method.as_deref())?;
    let processor_fee = parse_fee(&draft.processor_fee)?;

    if amount > round_cents(balance) {
        return Err(Error::AmountTooHigh { amount, balance });
    }

    let notes = draft.notes.trim();
    Ok(ValidatedPayment {
        amount,
        method,
        processor_fee,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    })
}

/// Records a payment against an invoice the signed-in user can see.
///
/// The payment is validated against the invoice's stored balance. The invoice's balance
/// drops by the amount, the deposit paid rises by it up to the deposit required, and the
/// invoice is marked paid in full once nothing is owed.
///
/// # Errors
/// * [`Error::NotAuthenticated`] - Nobody is signed in
/// * [`Error::InvoiceNotFound`] - No such invoice, or it is not visible to the user
/// * Any error from [`validate_payment`]
#[instrument(skip(db, session, draft))]
pub async fn record_payment(
    db: &DatabaseConnection,
    session: &Session,
    invoice_id: &str,
    draft: &PaymentDraft,
) -> Result<(payment::Model, invoice::Model)> {
    let user = session.require_user()?;
    let not_found = || Error::InvoiceNotFound {
        id: invoice_id.to_string(),
    };

    let txn = db.begin().await?;

    let invoice = txn.invoice_by_id(invoice_id).await?.ok_or_else(not_found)?;
    let job = txn.job_by_id(&invoice.job_id).await?;
    if !session.visibility().admits_invoice(job.as_ref()) {
        return Err(not_found());
    }

    let validated = validate_payment(draft, invoice.balance)?;
    let now = Utc::now();

    let payment = payment::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        invoice_id: Set(invoice.id.clone()),
        amount: Set(validated.amount),
        method: Set(validated.method),
        processor_fee: Set(validated.processor_fee),
        notes: Set(validated.notes),
        timestamp: Set(now),
        processed_by: Set(user.id.clone()),
    }
    .insert(&txn)
    .await?;

    let new_balance = round_cents(invoice.balance - validated.amount).max(0.0);
    let new_deposit_paid =
        round_cents(invoice.deposit_paid + validated.amount).min(invoice.deposit_required);
    let deposit_paid = new_deposit_paid.max(invoice.deposit_paid);

    let mut active_model: invoice::ActiveModel = invoice.into();
    active_model.balance = Set(new_balance);
    active_model.deposit_paid = Set(deposit_paid);
    active_model.paid_in_full = Set(new_balance <= 0.0);
    active_model.updated_at = Set(now);
    let invoice = active_model.update(&txn).await?;

    txn.commit().await?;

    info!(
        "Recorded {} payment of ${:.2} on invoice {}; balance now ${:.2}",
        payment.method, payment.amount, invoice.id, invoice.balance
    );
    Ok((payment, invoice))
}
