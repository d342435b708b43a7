/// Database models for Taskboard
///
/// Each model carries its row type, the inputs used to create or patch it, and
/// the SQL operations against PostgreSQL. Operations accept any
/// [`PgExecutor`](sqlx::PgExecutor) so they run equally on the pool or inside
/// a transaction.
///
/// # Models
///
/// - `user`: Registered accounts
/// - `revoked_token`: Logged-out bearer tokens
/// - `board`: Top-level containers owned by a user
/// - `task`: Work items inside a board
/// - `subtask`: Checklist items inside a task

pub mod board;
pub mod revoked_token;
pub mod subtask;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Orders `items` by their position in a parent's child-id list.
///
/// Items whose id is missing from the list keep their relative order and go
/// last, so a list that drifted from the child rows never hides a child.
pub(crate) fn order_by_ids<T>(ids: &[Uuid], mut items: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    items.sort_by_key(|item| {
        let id = id_of(item);
        ids.iter().position(|candidate| *candidate == id).unwrap_or(usize::MAX)
    });
    items
}

/// Deserializes a field that distinguishes "absent" from "null".
///
/// Used with `#[serde(default, deserialize_with = "double_option")]`:
/// a missing field stays `None`, an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_order_by_ids_follows_list_and_keeps_strays_last() {
        let (a, b, c, stray) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let ordered = order_by_ids(&[c, a, b], vec![a, stray, b, c], |id| *id);

        assert_eq!(ordered, vec![c, a, b, stray]);
    }

    #[test]
    fn test_double_option_absent() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.description, None);
    }

    #[test]
    fn test_double_option_null() {
        let patch: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn test_double_option_value() {
        let patch: Patch = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        assert_eq!(patch.description, Some(Some(String::new())));
    }
}
