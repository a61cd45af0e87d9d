//! PostgreSQL implementation of the repository port

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgRow};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use super::{Condition, Entity, Filter, Repository, SqlValue};
use crate::error::{DatabaseError, DatabaseResult};

/// Repository over one table, backed by a shared pool
pub struct PgStore<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> PgStore<T> {
    /// Create a new store for `T::TABLE`
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Bool(v) => builder.push_bind(v),
        SqlValue::I32(v) => builder.push_bind(v),
        SqlValue::I64(v) => builder.push_bind(v),
        SqlValue::F64(v) => builder.push_bind(v),
        SqlValue::Text(v) => builder.push_bind(v),
        SqlValue::Date(v) => builder.push_bind(v),
        SqlValue::Timestamp(v) => builder.push_bind(v),
        SqlValue::Uuid(v) => builder.push_bind(v),
        SqlValue::Json(v) => builder.push_bind(v),
    };
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: Filter) {
    let order = filter.ordering();
    let limit = filter.max_rows();

    for (index, condition) in filter.conditions.into_iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match condition {
            Condition::Eq(column, value) => {
                builder.push(column).push(" = ");
                push_value(builder, value);
            }
            Condition::Gte(column, value) => {
                builder.push(column).push(" >= ");
                push_value(builder, value);
            }
            Condition::IsNull(column) => {
                builder.push(column).push(" IS NULL");
            }
        }
    }

    if let Some((column, direction)) = order {
        builder
            .push(" ORDER BY ")
            .push(column)
            .push(" ")
            .push(direction.as_sql());
    }

    if let Some(limit) = limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
}

/// `INSERT INTO table (...) VALUES (...) RETURNING *` for the non-omitted columns
pub(crate) fn insert_query<'a, T: Entity>(
    omit: &[&str],
    value: &T,
) -> DatabaseResult<QueryBuilder<'a, Postgres>> {
    let columns: Vec<(&'static str, SqlValue)> = value
        .columns()
        .into_iter()
        .filter(|(name, _)| !omit.contains(name))
        .collect();

    if columns.is_empty() {
        return Err(DatabaseError::InvalidInput(format!(
            "nothing to insert into {}",
            T::TABLE
        )));
    }

    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        T::TABLE,
        names.join(", ")
    ));

    for (index, (_, value)) in columns.into_iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value);
    }
    builder.push(") RETURNING *");

    Ok(builder)
}

/// `UPDATE table SET ... WHERE id = $n RETURNING *`
pub(crate) fn update_query<'a, T: Entity>(value: &T) -> DatabaseResult<QueryBuilder<'a, Postgres>> {
    let columns = value.columns();
    if columns.is_empty() {
        return Err(DatabaseError::InvalidInput(format!(
            "nothing to update in {}",
            T::TABLE
        )));
    }

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", T::TABLE));
    for (index, (name, value)) in columns.into_iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(name).push(" = ");
        push_value(&mut builder, value);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(value.id());
    builder.push(" RETURNING *");

    Ok(builder)
}

/// `SELECT * FROM table WHERE ...`
pub(crate) fn select_query<'a, T: Entity>(filter: Filter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", T::TABLE));
    push_filter(&mut builder, filter);
    builder
}

#[async_trait]
impl<T> Repository<T> for PgStore<T>
where
    T: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn create_with_omit(&self, omit: &[&str], value: T) -> DatabaseResult<T> {
        let mut builder = insert_query(omit, &value)?;
        debug!("{}", builder.sql());

        builder
            .build_query_as::<T>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("insert into {}", T::TABLE), e))
    }

    async fn create_many(&self, omit: &[&str], values: Vec<T>) -> DatabaseResult<Vec<T>> {
        if values.is_empty() {
            return Err(DatabaseError::InvalidInput(format!(
                "empty batch for {}",
                T::TABLE
            )));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::query("begin transaction", e))?;

        let mut created = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            let mut builder = insert_query(omit, value)?;
            let row = builder
                .build_query_as::<T>()
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    DatabaseError::query(format!("insert row {} into {}", index + 1, T::TABLE), e)
                })?;
            created.push(row);
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::query("commit transaction", e))?;

        Ok(created)
    }

    async fn update(&self, value: &T) -> DatabaseResult<T> {
        let mut builder = update_query(value)?;

        builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("update {}", T::TABLE), e))?
            .ok_or(DatabaseError::NotFound { table: T::TABLE })
    }

    async fn delete(&self, value: &T) -> DatabaseResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::TABLE))
            .bind(value.id())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("delete from {}", T::TABLE), e))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { table: T::TABLE });
        }
        Ok(())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> DatabaseResult<T> {
        sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE uuid = $1", T::TABLE))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("select from {} by uuid", T::TABLE), e))?
            .ok_or(DatabaseError::NotFound { table: T::TABLE })
    }

    async fn first(&self, filter: Filter) -> DatabaseResult<Option<T>> {
        let mut builder = select_query::<T>(filter.limit(1));

        builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("select first from {}", T::TABLE), e))
    }

    async fn find(&self, filter: Filter) -> DatabaseResult<Vec<T>> {
        let mut builder = select_query::<T>(filter);

        builder
            .build_query_as::<T>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("select from {}", T::TABLE), e))
    }

    async fn count(&self, filter: Filter) -> DatabaseResult<i64> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::query(format!("count {}", T::TABLE), e))
    }
}
