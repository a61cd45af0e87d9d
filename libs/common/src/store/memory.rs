//! In-memory implementation of the repository port
//!
//! Emulates the parts of PostgreSQL the services rely on: generated keys,
//! column defaults, unique indexes, filtering, ordering, and all-or-nothing
//! batch inserts.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{Condition, Entity, Filter, Order, Repository, SqlValue};
use crate::error::{DatabaseError, DatabaseResult};

/// Rows of one table held in process
pub struct MemoryStore<T> {
    inner: Arc<Mutex<Table<T>>>,
}

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Snapshot of every stored row
    pub fn rows(&self) -> Vec<T> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Table<T>> {
        // a poisoned lock only means a test panicked mid-write
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn matches<T: Entity>(row: &T, filter: &Filter) -> bool {
    filter.conditions().iter().all(|condition| match condition {
        Condition::Eq(column, value) => {
            !value.is_null() && row.value(column).as_ref() == Some(value)
        }
        Condition::Gte(column, value) => row
            .value(column)
            .and_then(|current| current.compare(value))
            .is_some_and(|ordering| ordering != Ordering::Less),
        Condition::IsNull(column) => row.value(column).is_some_and(|v| v.is_null()),
    })
}

fn select<T: Entity>(rows: &[T], filter: &Filter) -> Vec<T> {
    let mut selected: Vec<T> = rows.iter().filter(|row| matches(*row, filter)).cloned().collect();

    if let Some((column, order)) = filter.ordering() {
        selected.sort_by(|a, b| {
            let ordering = match (a.value(column), b.value(column)) {
                (Some(left), Some(right)) => left.compare(&right).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            match order {
                Order::Asc => ordering,
                Order::Desc => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = filter.max_rows() {
        selected.truncate(limit.max(0) as usize);
    }

    selected
}

/// Reject `candidate` when it collides with another row on a unique key.
/// NULLs never collide, as in PostgreSQL.
fn check_unique<T: Entity>(rows: &[T], candidate: &T) -> DatabaseResult<()> {
    for key in T::UNIQUE {
        let values: Vec<Option<SqlValue>> = key.iter().map(|column| candidate.value(column)).collect();
        if values.iter().any(|v| v.as_ref().is_none_or(SqlValue::is_null)) {
            continue;
        }

        let collides = rows.iter().any(|row| {
            row.id() != candidate.id()
                && key
                    .iter()
                    .zip(values.iter())
                    .all(|(column, value)| row.value(column).as_ref() == value.as_ref())
        });

        if collides {
            return Err(DatabaseError::UniqueViolation {
                constraint: format!("{}_{}_key", T::TABLE, key.join("_")),
            });
        }
    }
    Ok(())
}

fn prepare<T: Entity>(table: &mut Table<T>, omit: &[&str], mut value: T) -> DatabaseResult<T> {
    let writable = value
        .columns()
        .iter()
        .filter(|(name, _)| !omit.contains(name))
        .count();
    if writable == 0 {
        return Err(DatabaseError::InvalidInput(format!(
            "nothing to insert into {}",
            T::TABLE
        )));
    }

    let now = Utc::now();
    for column in omit {
        value.assign_default(column, now);
    }
    value.assign_id(table.next_id);
    table.next_id += 1;

    Ok(value)
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryStore<T> {
    async fn create_with_omit(&self, omit: &[&str], value: T) -> DatabaseResult<T> {
        let mut table = self.lock();
        let value = prepare(&mut table, omit, value)?;
        check_unique(&table.rows, &value)?;
        table.rows.push(value.clone());
        Ok(value)
    }

    async fn create_many(&self, omit: &[&str], values: Vec<T>) -> DatabaseResult<Vec<T>> {
        if values.is_empty() {
            return Err(DatabaseError::InvalidInput(format!(
                "empty batch for {}",
                T::TABLE
            )));
        }

        let mut table = self.lock();
        let first_id = table.next_id;
        let mut staged = table.rows.clone();
        let mut created = Vec::with_capacity(values.len());

        for value in values {
            let value = match prepare(&mut table, omit, value)
                .and_then(|value| check_unique(&staged, &value).map(|_| value))
            {
                Ok(value) => value,
                Err(e) => {
                    table.next_id = first_id;
                    return Err(e);
                }
            };
            staged.push(value.clone());
            created.push(value);
        }

        table.rows = staged;
        Ok(created)
    }

    async fn update(&self, value: &T) -> DatabaseResult<T> {
        let mut table = self.lock();
        check_unique(&table.rows, value)?;

        let slot = table
            .rows
            .iter_mut()
            .find(|row| row.id() == value.id())
            .ok_or(DatabaseError::NotFound { table: T::TABLE })?;
        *slot = value.clone();
        Ok(value.clone())
    }

    async fn delete(&self, value: &T) -> DatabaseResult<()> {
        let mut table = self.lock();
        let before = table.rows.len();
        table.rows.retain(|row| row.id() != value.id());

        if table.rows.len() == before {
            return Err(DatabaseError::NotFound { table: T::TABLE });
        }
        Ok(())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DatabaseResult<T> {
        let wanted = SqlValue::Uuid(Some(uuid));
        self.lock()
            .rows
            .iter()
            .find(|row| row.value("uuid").as_ref() == Some(&wanted))
            .cloned()
            .ok_or(DatabaseError::NotFound { table: T::TABLE })
    }

    async fn first(&self, filter: Filter) -> DatabaseResult<Option<T>> {
        let table = self.lock();
        Ok(select(&table.rows, &filter.limit(1)).into_iter().next())
    }

    async fn find(&self, filter: Filter) -> DatabaseResult<Vec<T>> {
        let table = self.lock();
        Ok(select(&table.rows, &filter))
    }

    async fn count(&self, filter: Filter) -> DatabaseResult<i64> {
        let table = self.lock();
        Ok(table.rows.iter().filter(|row| matches(*row, &filter)).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULTED;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Clone)]
    struct Vote {
        id: i64,
        uuid: Uuid,
        user_id: i64,
        recipe_id: i64,
        level: i32,
        created_at: DateTime<Utc>,
    }

    impl Entity for Vote {
        const TABLE: &'static str = "votes";
        const UNIQUE: &'static [&'static [&'static str]] = &[&["user_id", "recipe_id"]];

        fn id(&self) -> i64 {
            self.id
        }

        fn columns(&self) -> Vec<(&'static str, SqlValue)> {
            vec![
                ("uuid", self.uuid.into()),
                ("user_id", self.user_id.into()),
                ("recipe_id", self.recipe_id.into()),
                ("level", self.level.into()),
                ("created_at", self.created_at.into()),
            ]
        }

        fn assign_id(&mut self, id: i64) {
            self.id = id;
        }

        fn assign_default(&mut self, column: &str, now: DateTime<Utc>) {
            match column {
                "uuid" => self.uuid = Uuid::new_v4(),
                "created_at" => self.created_at = now,
                _ => {}
            }
        }
    }

    fn vote(user_id: i64, recipe_id: i64, level: i32) -> Vote {
        Vote {
            id: 0,
            uuid: Uuid::nil(),
            user_id,
            recipe_id,
            level,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[tokio::test]
    async fn create_with_omit_fills_defaults() {
        let store = MemoryStore::<Vote>::new();
        let created = store.create_with_omit(DEFAULTED, vote(1, 2, 3)).await.unwrap();

        assert_eq!(created.id, 1);
        assert!(!created.uuid.is_nil());
        assert!(created.created_at > DateTime::<Utc>::MIN_UTC);
        assert_eq!(store.find_by_uuid(created.uuid).await.unwrap().level, 3);
    }

    #[tokio::test]
    async fn unique_keys_are_enforced() {
        let store = MemoryStore::<Vote>::new();
        store.create_with_omit(DEFAULTED, vote(1, 2, 3)).await.unwrap();

        let err = store.create_with_omit(DEFAULTED, vote(1, 2, 5)).await.unwrap_err();
        assert!(err.is_unique_violation());

        store.create_with_omit(DEFAULTED, vote(1, 3, 5)).await.unwrap();
        assert_eq!(store.count(Filter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing() {
        let store = MemoryStore::<Vote>::new();
        let err = store
            .create_many(DEFAULTED, vec![vote(1, 1, 1), vote(1, 2, 1), vote(1, 1, 4)])
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert!(store.rows().is_empty());

        let created = store
            .create_many(DEFAULTED, vec![vote(1, 1, 1), vote(1, 2, 1)])
            .await
            .unwrap();
        assert_eq!(created.iter().map(|v| v.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn find_item_by_ids_and_update_in_place() {
        let store = MemoryStore::<Vote>::new();
        store.create_with_omit(DEFAULTED, vote(4, 9, 2)).await.unwrap();

        let mut existing = store
            .find_item_by_ids("user_id", 4, "recipe_id", 9)
            .await
            .unwrap()
            .unwrap();
        existing.level = 5;
        store.update(&existing).await.unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].level, 5);
    }

    #[tokio::test]
    async fn find_orders_and_limits() {
        let store = MemoryStore::<Vote>::new();
        for level in [3, 1, 2] {
            store.create_with_omit(DEFAULTED, vote(1, level as i64, level)).await.unwrap();
        }

        let rows = store
            .find(Filter::new().eq("user_id", 1_i64).order_by("level", Order::Desc).limit(2))
            .await
            .unwrap();
        assert_eq!(rows.iter().map(|v| v.level).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryStore::<Vote>::new();
        assert!(store.find_by_uuid(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(store.delete(&vote(1, 1, 1)).await.unwrap_err().is_not_found());
        assert!(store.update(&vote(1, 1, 1)).await.unwrap_err().is_not_found());
    }
}
