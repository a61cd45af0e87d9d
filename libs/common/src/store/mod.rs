//! Generic persistence adapter
//!
//! Every table is reached through [`Repository<T>`], parameterized over a
//! concrete [`Entity`]. [`postgres::PgStore`] is the production adapter;
//! [`memory::MemoryStore`] mirrors its semantics in process for tests.
//!
//! Column names handed to [`Filter`] are `&'static str` on purpose: they are
//! spliced into SQL text, while every value travels as a bind parameter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::DatabaseResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Columns the database fills in when they are left out of an insert
pub const DEFAULTED: &[&str] = &["uuid", "created_at"];

/// A typed, nullable column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    I32(Option<i32>),
    I64(Option<i64>),
    F64(Option<f64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Timestamp(Option<DateTime<Utc>>),
    Uuid(Option<Uuid>),
    Json(serde_json::Value),
}

impl SqlValue {
    /// True for SQL `NULL`
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::I32(v) => v.is_none(),
            SqlValue::I64(v) => v.is_none(),
            SqlValue::F64(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
            SqlValue::Uuid(v) => v.is_none(),
            SqlValue::Json(v) => v.is_null(),
        }
    }

    /// Order two values of the same type; `None` for mismatched types or NULLs
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::Bool(Some(a)), SqlValue::Bool(Some(b))) => a.partial_cmp(b),
            (SqlValue::I32(Some(a)), SqlValue::I32(Some(b))) => a.partial_cmp(b),
            (SqlValue::I64(Some(a)), SqlValue::I64(Some(b))) => a.partial_cmp(b),
            (SqlValue::F64(Some(a)), SqlValue::F64(Some(b))) => a.partial_cmp(b),
            (SqlValue::Text(Some(a)), SqlValue::Text(Some(b))) => a.partial_cmp(b),
            (SqlValue::Date(Some(a)), SqlValue::Date(Some(b))) => a.partial_cmp(b),
            (SqlValue::Timestamp(Some(a)), SqlValue::Timestamp(Some(b))) => a.partial_cmp(b),
            (SqlValue::Uuid(Some(a)), SqlValue::Uuid(Some(b))) => a.partial_cmp(b),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(Some(value.into()))
                }
            }

            impl From<Option<$ty>> for SqlValue {
                fn from(value: Option<$ty>) -> Self {
                    SqlValue::$variant(value.map(Into::into))
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    f64 => F64,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        SqlValue::Json(value)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// One `WHERE` term
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, SqlValue),
    Gte(&'static str, SqlValue),
    IsNull(&'static str),
}

/// Conjunction of conditions plus optional ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Option<(&'static str, Order)>,
    limit: Option<i64>,
}

impl Filter {
    /// Matches every row
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`
    pub fn eq(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Eq(column, value.into()));
        self
    }

    /// `column >= value`
    pub fn gte(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(Condition::Gte(column, value.into()));
        self
    }

    /// `column IS NULL`
    pub fn is_null(mut self, column: &'static str) -> Self {
        self.conditions.push(Condition::IsNull(column));
        self
    }

    pub fn order_by(mut self, column: &'static str, order: Order) -> Self {
        self.order = Some((column, order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn ordering(&self) -> Option<(&'static str, Order)> {
        self.order
    }

    pub fn max_rows(&self) -> Option<i64> {
        self.limit
    }
}

/// A row type persisted through the adapter
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Table the entity lives in
    const TABLE: &'static str;

    /// Column tuples covered by unique indexes
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    /// Database-local primary key
    fn id(&self) -> i64;

    /// Every writable column except `id`, in table order
    fn columns(&self) -> Vec<(&'static str, SqlValue)>;

    /// Store the generated primary key
    fn assign_id(&mut self, id: i64);

    /// Fill a column the database would default when it was omitted
    fn assign_default(&mut self, _column: &str, _now: DateTime<Utc>) {}

    /// Value of a single column, `id` included
    fn value(&self, column: &str) -> Option<SqlValue> {
        if column == "id" {
            return Some(SqlValue::I64(Some(self.id())));
        }
        self.columns()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// CRUD port over one entity type
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert every column of `value`
    async fn create(&self, value: T) -> DatabaseResult<T> {
        self.create_with_omit(&[], value).await
    }

    /// Insert `value`, leaving the named columns to their database defaults
    async fn create_with_omit(&self, omit: &[&str], value: T) -> DatabaseResult<T>;

    /// Insert a batch atomically; any failing row aborts the whole batch
    async fn create_many(&self, omit: &[&str], values: Vec<T>) -> DatabaseResult<Vec<T>>;

    /// Overwrite every column of the row with `value.id()`
    async fn update(&self, value: &T) -> DatabaseResult<T>;

    /// Hard delete by primary key
    async fn delete(&self, value: &T) -> DatabaseResult<()>;

    /// Lookup by public identity
    async fn find_by_uuid(&self, uuid: Uuid) -> DatabaseResult<T>;

    /// First row matching `filter`
    async fn first(&self, filter: Filter) -> DatabaseResult<Option<T>>;

    /// All rows matching `filter`
    async fn find(&self, filter: Filter) -> DatabaseResult<Vec<T>>;

    /// Number of rows matching `filter`
    async fn count(&self, filter: Filter) -> DatabaseResult<i64>;

    /// Row of a join table keyed by two foreign keys
    async fn find_item_by_ids(
        &self,
        column1: &'static str,
        id1: i64,
        column2: &'static str,
        id2: i64,
    ) -> DatabaseResult<Option<T>> {
        self.first(Filter::new().eq(column1, id1).eq(column2, id2))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_nullable_values() {
        assert_eq!(SqlValue::from(Some(3_i32)), SqlValue::I32(Some(3)));
        assert!(SqlValue::from(None::<String>).is_null());
        assert_eq!(SqlValue::from("x"), SqlValue::Text(Some("x".to_string())));
    }

    #[test]
    fn compare_refuses_mixed_types() {
        let a = SqlValue::from(1_i64);
        let b = SqlValue::from(1_i32);
        assert_eq!(a.compare(&b), None);
        assert_eq!(
            SqlValue::from(2_i64).compare(&SqlValue::from(1_i64)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn filter_keeps_conditions_in_order() {
        let filter = Filter::new()
            .eq("user_id", 1_i64)
            .is_null("deleted_at")
            .order_by("created_at", Order::Desc)
            .limit(5);

        assert_eq!(filter.conditions().len(), 2);
        assert_eq!(filter.ordering(), Some(("created_at", Order::Desc)));
        assert_eq!(filter.max_rows(), Some(5));
    }
}
