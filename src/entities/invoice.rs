//! Invoice entity - The billing record for a job.
//!
//! `total` is always `subtotal + tax + fees - discount` and `balance` is the total minus
//! every payment applied so far. The write paths in `core::intake` and `core::payment`
//! are the only places that set these columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier, also what users search invoices by
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Job being billed
    pub job_id: String,
    /// Price of the work before tax, fees, and discount
    pub subtotal: f64,
    /// Sales tax
    pub tax: f64,
    /// Extra fees (shipping, crating)
    pub fees: f64,
    /// Discount taken off the total
    pub discount: f64,
    /// Amount owed in total
    pub total: f64,
    /// Amount still owed
    pub balance: f64,
    /// Deposit requested up front
    pub deposit_required: f64,
    /// Portion of the deposit received so far
    pub deposit_paid: f64,
    /// When the invoice was issued
    pub issued_date: DateTimeUtc,
    /// When payment is due
    pub due_date: DateTimeUtc,
    /// Set once the balance reaches zero
    pub paid_in_full: bool,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
    /// When the invoice was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount collected so far (`total - balance`).
    #[must_use]
    pub fn collected(&self) -> f64 {
        self.total - self.balance
    }
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice bills exactly one job
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id"
    )]
    Job,
    /// One invoice has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
