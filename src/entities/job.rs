//! Job entity - One unit of taxidermy work for one client and one specimen.
//!
//! Jobs move through `RECEIVED`, `IN_PROGRESS`, `FINISHED`, and `DELIVERED`, although
//! the order is not enforced. Like clients, jobs carry optional hunter and taxidermist
//! ownership columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a job.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Specimen dropped off, work not started
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    /// Work underway
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    /// Work done, awaiting pickup
    #[sea_orm(string_value = "FINISHED")]
    Finished,
    /// Handed back to the customer
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
}

impl JobStatus {
    /// Every status in board order.
    pub const ALL: [Self; 4] = [
        Self::Received,
        Self::InProgress,
        Self::Finished,
        Self::Delivered,
    ];

    /// Whether the job still counts as active work (received or in progress).
    #[must_use]
    pub const fn is_active(self) -> bool {
        match self {
            Self::Received | Self::InProgress => true,
            Self::Finished | Self::Delivered => false,
        }
    }

    /// Column title used on the job board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::InProgress => "In Progress",
            Self::Finished => "Finished",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Job database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    /// Unique identifier for the job
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Client this job is for
    pub client_id: String,
    /// Kind of work, free text (e.g., "Shoulder Mount")
    pub job_type: String,
    /// Animal species, free text
    pub species: String,
    /// Current workflow status
    pub status: JobStatus,
    /// Short description of the specimen
    pub description: Option<String>,
    /// When the specimen was dropped off
    pub drop_off_date: DateTimeUtc,
    /// Promised completion date
    pub due_date: DateTimeUtc,
    /// When the work was finished, if it has been
    pub completed_date: Option<DateTimeUtc>,
    /// Quoted price in dollars
    pub estimated_price: f64,
    /// Customer preferences for the mount
    pub special_instructions: Option<String>,
    /// Owning hunter's user id
    pub hunter_id: Option<String>,
    /// Owning taxidermist's user id
    pub taxidermist_id: Option<String>,
    /// When the job was created
    pub created_at: DateTimeUtc,
    /// When the job was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// "Type - Species" label used wherever a job is listed.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} - {}", self.job_type, self.species)
    }
}

/// Defines relationships between Job and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each job belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// A job is billed through one invoice
    #[sea_orm(has_one = "super::invoice::Entity")]
    Invoice,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
