use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row as _};
use tracing::info;

use super::{check_row, Filters, Row, Storage, StorageError, Table};

/// Storage talking straight to the backend's Postgres database
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        if database_url.is_empty() {
            return Err(StorageError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;

        info!("Created database pool ({} max connections)", max_connections);
        Ok(Self { pool })
    }

    async fn fetch_rows(&self, sql: &str, json: Option<Value>, filters: &Filters) -> Result<Vec<Row>, StorageError> {
        let mut query = sqlx::query(sql);
        if let Some(json) = json {
            query = query.bind(sqlx::types::Json(json));
        }
        query = bind_filters(query, filters);

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| match row.try_get::<Value, _>("row")? {
                Value::Object(map) => Ok(map),
                other => Err(StorageError::Decode(other.to_string())),
            })
            .collect()
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A filter value bound with the Rust type matching its JSON shape
#[derive(Debug, Clone, PartialEq)]
enum FilterBind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Nulls are rendered inline as `IS NULL` and never bound
fn filter_bind(value: &Value) -> Option<FilterBind> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(FilterBind::Bool(*b)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => FilterBind::Int(i),
            None => FilterBind::Float(n.as_f64().unwrap_or_default()),
        }),
        Value::String(s) => Some(FilterBind::Text(s.clone())),
        other => Some(FilterBind::Text(other.to_string())),
    }
}

fn bind_filters<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    filters: &Filters,
) -> Query<'q, Postgres, PgArguments> {
    for bind in filters.iter().filter_map(|(_, value)| filter_bind(value)) {
        query = match bind {
            FilterBind::Int(v) => query.bind(v),
            FilterBind::Float(v) => query.bind(v),
            FilterBind::Bool(v) => query.bind(v),
            FilterBind::Text(v) => query.bind(v),
        };
    }
    query
}

/// WHERE clause with placeholders starting after `offset` already-bound params
fn where_clause(filters: &Filters, offset: usize) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let mut placeholder = offset;
    let terms: Vec<String> = filters
        .iter()
        .map(|(column, value)| match value {
            Value::Null => format!("{} IS NULL", quote_identifier(column)),
            _ => {
                placeholder += 1;
                format!("{} = ${}", quote_identifier(column), placeholder)
            }
        })
        .collect();
    format!(" WHERE {}", terms.join(" AND "))
}

fn select_sql(table: Table, filters: &Filters) -> String {
    format!(
        "SELECT row_to_json(t) AS row FROM (SELECT * FROM {}{} ORDER BY \"id\") t",
        quote_identifier(table.name()),
        where_clause(filters, 0)
    )
}

fn insert_sql(table: Table, row: &Row) -> String {
    let table_name = quote_identifier(table.name());
    let columns = column_list(row);
    format!(
        "WITH ins AS (INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *) \
         SELECT row_to_json(ins) AS row FROM ins",
        table = table_name,
        cols = columns
    )
}

fn update_sql(table: Table, filters: &Filters, values: &Row) -> String {
    let table_name = quote_identifier(table.name());
    let columns = column_list(values);
    format!(
        "WITH upd AS (UPDATE {table} SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)){filter} RETURNING *) \
         SELECT row_to_json(upd) AS row FROM upd ORDER BY \"id\"",
        table = table_name,
        cols = columns,
        filter = where_clause(filters, 1)
    )
}

fn column_list(row: &Row) -> String {
    row.keys()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Storage for PostgresStore {
    async fn select_where(&self, table: Table, filters: &Filters) -> Result<Vec<Row>, StorageError> {
        filters.check_columns(table)?;
        self.fetch_rows(&select_sql(table, filters), None, filters).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StorageError> {
        check_row(table, &row)?;
        let sql = insert_sql(table, &row);
        self.fetch_rows(&sql, Some(Value::Object(row)), &Filters::new())
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NoRows(table))
    }

    async fn update_where(&self, table: Table, filters: &Filters, values: Row) -> Result<Row, StorageError> {
        filters.check_columns(table)?;
        check_row(table, &values)?;
        if values.is_empty() {
            return Err(StorageError::Decode("empty update".to_string()));
        }
        let sql = update_sql(table, filters, &values);
        self.fetch_rows(&sql, Some(Value::Object(values)), filters)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NoRows(table))
    }

    async fn delete_where(&self, table: Table, filters: &Filters) -> Result<(), StorageError> {
        filters.check_columns(table)?;
        let sql = format!("DELETE FROM {}{}", quote_identifier(table.name()), where_clause(filters, 0));

        bind_filters(sqlx::query(&sql), filters).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
