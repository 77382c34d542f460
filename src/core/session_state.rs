//! Persisted session slot.
//!
//! A tiny key-value store on top of the `session_state` table. The session provider
//! writes the signed-in user here on login, reads it back on start, and removes it on
//! logout. Values are opaque strings; callers decide the encoding.

use crate::{
    entities::{SessionState, session_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, instrument};

/// Reads the value stored under `key`.
///
/// # Returns
/// * `Ok(Some(value))` - The slot exists
/// * `Ok(None)` - Nothing stored under this key
#[instrument(skip(db))]
pub async fn get_slot_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SessionState::find()
        .filter(session_state::Column::Key.eq(key))
        .one(db)
        .await?;
    debug!("Session slot '{}' present: {}", key, state.is_some());
    Ok(state.map(|s| s.value))
}

/// Stores `value` under `key`, replacing whatever was there.
#[instrument(skip(db, value))]
pub async fn set_slot_value<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    let existing = SessionState::find()
        .filter(session_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: session_state::ActiveModel = state.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = session_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    debug!("Session slot '{}' written", key);
    Ok(())
}

/// Removes the slot stored under `key`. Removing a missing slot is not an error.
#[instrument(skip(db))]
pub async fn remove_slot<C>(db: &C, key: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = SessionState::delete_many()
        .filter(session_state::Column::Key.eq(key))
        .exec(db)
        .await?;
    debug!("Session slot '{}' removed ({} rows)", key, result.rows_affected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_db};

    #[tokio::test]
    async fn test_set_and_get_new_key() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;

        set_slot_value(&db, "test_key_1", "test_value_1").await?;

        let retrieved = get_slot_value(&db, "test_key_1").await?;
        assert_eq!(
            retrieved,
            Some("test_value_1".to_string()),
            "Retrieved value should match the set value for a new key."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_set_updates_existing_key() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;

        set_slot_value(&db, "test_key_update", "initial_value").await?;
        set_slot_value(&db, "test_key_update", "updated_value").await?;

        let retrieved = get_slot_value(&db, "test_key_update").await?;
        assert_eq!(retrieved, Some("updated_value".to_string()));

        let rows = SessionState::find().all(&db).await?;
        assert_eq!(rows.len(), 1, "Overwriting a key must not add a row.");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_non_existent_key() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;

        let retrieved = get_slot_value(&db, "this_key_does_not_exist").await?;
        assert!(retrieved.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_slot() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;

        set_slot_value(&db, "doomed", "value").await?;
        remove_slot(&db, "doomed").await?;
        assert!(get_slot_value(&db, "doomed").await?.is_none());

        // Second removal is a no-op
        remove_slot(&db, "doomed").await?;
        Ok(())
    }
}
