//! Client entity - The person a job is done for.
//!
//! A client may be owned by at most one hunter and at most one taxidermist through the
//! nullable `hunter_id` / `taxidermist_id` columns; both may be empty.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Optional contact email
    pub email: Option<String>,
    /// Contact phone number, stored as entered
    pub phone: String,
    /// Optional postal address
    pub address: Option<String>,
    /// Owning hunter's user id
    pub hunter_id: Option<String>,
    /// Owning taxidermist's user id
    pub taxidermist_id: Option<String>,
    /// When the client was created
    pub created_at: DateTimeUtc,
    /// When the client was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many jobs
    #[sea_orm(has_many = "super::job::Entity")]
    Jobs,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
