//! Session state entity - Key-value slots that survive a restart.
//! The signed-in user is persisted here under a fixed key so the next
//! process start can restore it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Slot name (e.g., `"taxidermy_user"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Opaque stored value
    pub value: String,
    /// When the slot was last written
    pub updated_at: DateTimeUtc,
}

/// `SessionState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
