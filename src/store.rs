//! In-memory user store.
//!
//! A [`UserStore`] is a cheap, clonable handle to one ordered list of
//! [`UserRecord`]s. Clones share the list. It is built once at startup and
//! handed to the router as state; nothing else reaches the records.
//!
//! Ids are sequential from 0 and never reused, even after a delete.
//! Every operation takes the lock once, so an update is never observed
//! half-applied and two concurrent `add`s never share an id.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Identifier assigned by the store at creation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the decimal form used in `/update/{id}` and `/delete/{id}`.
impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The validated fields of a user, everything but the id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// A stored user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(flatten)]
    pub fields: UserFields,
}

impl UserRecord {
    /// `"{first} {last}"`, the form the search compares against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }
}

/// Errors at the store boundary.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    #[error("no user with id {0}")]
    NotFound(UserId),
}

/// A parsed search request. `None` means the parameter was not supplied
/// and can never match.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchQuery {
    pub username: Option<String>,
    pub mail: Option<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.mail.is_none()
    }

    /// Exact, case-sensitive email equality, or case-insensitive full-name
    /// equality after trimming.
    pub fn matches(&self, record: &UserRecord) -> bool {
        let by_mail = self.mail.as_deref()
            .is_some_and(|mail| record.fields.email == mail);
        let by_name = self.username.as_deref().is_some_and(|name| {
            record.full_name().trim().to_lowercase() == name.trim().to_lowercase()
        });
        by_mail || by_name
    }
}

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<UserRecord>,
    next_id: u64,
}

/// Shared handle to the user list.
#[derive(Clone, Debug, Default)]
pub struct UserStore {
    state: Arc<RwLock<StoreState>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users in insertion order.
    pub async fn list(&self) -> Vec<UserRecord> {
        self.state.read().await.users.clone()
    }

    pub async fn get(&self, id: UserId) -> Option<UserRecord> {
        self.state.read().await.users.iter()
            .find(|u| u.id == id)
            .cloned()
    }

    /// Appends a user under the next sequential id.
    pub async fn add(&self, fields: UserFields) -> UserRecord {
        let mut state = self.state.write().await;
        let id = UserId(state.next_id);
        state.next_id += 1;
        let record = UserRecord { id, fields };
        state.users.push(record.clone());
        info!(user_id = %id, total = state.users.len(), "user added");
        record
    }

    /// Replaces every field of user `id`. The id and position are kept.
    pub async fn update(&self, id: UserId, fields: UserFields) -> Result<UserRecord, StoreError> {
        let mut state = self.state.write().await;
        let record = state.users.iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.fields = fields;
        info!(user_id = %id, "user updated");
        Ok(record.clone())
    }

    /// Removes user `id` if present. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub async fn delete(&self, id: UserId) -> bool {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        let removed = state.users.len() != before;
        if removed {
            info!(user_id = %id, "user deleted");
        }
        removed
    }

    /// Users matching `query`, in insertion order.
    pub async fn search(&self, query: &SearchQuery) -> Vec<UserRecord> {
        self.state.read().await.users.iter()
            .filter(|u| query.matches(u))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    fn fields(first: &str, last: &str, email: &str) -> UserFields {
        UserFields {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: email.to_owned(),
            age: "30".to_owned(),
            bio: None,
        }
    }

    #[fixture]
    fn ada() -> UserFields {
        fields("Ada", "Lovelace", "ada@example.com")
    }

    #[rstest]
    #[tokio::test]
    async fn add_assigns_sequential_ids_in_order(ada: UserFields) {
        let store = UserStore::new();
        let first = store.add(ada.clone()).await;
        let second = store.add(fields("Alan", "Turing", "alan@example.com")).await;

        assert_eq!(first.id, UserId::new(0));
        assert_eq!(second.id, UserId::new(1));
        let ids: Vec<_> = store.list().await.into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(store.get(first.id).await.map(|u| u.fields), Some(ada));
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_not_reused_after_delete(ada: UserFields) {
        let store = UserStore::new();
        let first = store.add(ada.clone()).await;
        assert!(store.delete(first.id).await);
        let again = store.add(ada).await;
        assert_eq!(again.id, UserId::new(1));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_never_share_an_id(ada: UserFields) {
        const N: u64 = 64;
        let store = UserStore::new();
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..N {
            let (store, fields) = (store.clone(), ada.clone());
            tasks.spawn(async move { store.add(fields).await.id });
        }

        let mut ids = tasks.join_all().await;
        ids.sort();
        assert_eq!(ids, (0..N).map(UserId::new).collect::<Vec<_>>());
        assert_eq!(store.len().await, N as usize);
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_only_the_target(ada: UserFields) {
        let store = UserStore::new();
        let a = store.add(ada.clone()).await;
        let b = store.add(fields("Alan", "Turing", "alan@example.com")).await;

        let replacement = UserFields {
            bio: Some("poet".to_owned()),
            ..fields("Augusta", "King", "ak@example.com")
        };
        let updated = store.update(a.id, replacement.clone()).await.unwrap();

        assert_eq!(updated.id, a.id);
        assert_eq!(updated.fields, replacement);
        assert_eq!(store.get(b.id).await, Some(b));
        assert_eq!(store.list().await[0].id, a.id);
    }

    #[rstest]
    #[tokio::test]
    async fn update_unknown_id_is_not_found(ada: UserFields) {
        let store = UserStore::new();
        let err = store.update(UserId::new(9), ada).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(UserId::new(9)));
        assert!(store.is_empty().await);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_unknown_id_is_a_no_op(ada: UserFields) {
        let store = UserStore::new();
        store.add(ada).await;
        assert!(!store.delete(UserId::new(42)).await);
        assert_eq!(store.len().await, 1);
    }

    #[rstest]
    #[case::full_name_any_case(Some("  ada LOVELACE "), None, true)]
    #[case::email_exact(None, Some("ada@example.com"), true)]
    #[case::email_is_case_sensitive(None, Some("ADA@example.com"), false)]
    #[case::partial_name(Some("Ada"), None, false)]
    #[case::either_condition(Some("Nobody"), Some("ada@example.com"), true)]
    #[case::nothing_supplied(None, None, false)]
    fn search_matching(
        ada: UserFields,
        #[case] username: Option<&str>,
        #[case] mail: Option<&str>,
        #[case] expected: bool,
    ) {
        let record = UserRecord { id: UserId::new(0), fields: ada };
        let query = SearchQuery {
            username: username.map(str::to_owned),
            mail: mail.map(str::to_owned),
        };
        assert_eq!(query.matches(&record), expected);
    }

    #[test]
    fn record_serialises_camel_case_without_absent_bio() {
        let record = UserRecord {
            id: UserId::new(3),
            fields: fields("Jo", "Lin", "jo@example.com"),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "firstName": "Jo",
                "lastName": "Lin",
                "email": "jo@example.com",
                "age": "30",
            }),
        );
    }

    #[test]
    fn user_id_parses_decimal_only() {
        assert_eq!("12".parse::<UserId>(), Ok(UserId::new(12)));
        assert!("abc".parse::<UserId>().is_err());
        assert!("-1".parse::<UserId>().is_err());
    }
}
