//! User entity - A person who can sign in to the CRM.
//!
//! Each user holds exactly one [`Role`], which decides which clients, jobs, and
//! invoices they can see. Users are also the payload of the persisted session slot,
//! so the model round-trips through `serde_json`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user signs in as.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer who submits specimens for processing
    #[sea_orm(string_value = "hunter")]
    Hunter,
    /// Service provider who performs the work and bills for it
    #[sea_orm(string_value = "taxidermist")]
    Taxidermist,
    /// Unrestricted visibility across all records
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Human-readable role name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hunter => "Hunter",
            Self::Taxidermist => "Taxidermist",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Login email; the same address may exist once per role
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// The single role this account signs in as
    pub role: Role,
    /// Trading name shown in settings (e.g., "Wildlife Artistry")
    pub business_name: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// Stamped on every successful login
    pub last_login_at: Option<DateTimeUtc>,
}

impl Model {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Users are referenced by id from clients, jobs, and payments but carry no declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
