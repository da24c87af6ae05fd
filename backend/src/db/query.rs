//! Entity query builder
//!
//! Builds parameterized SELECT and COUNT statements for a table described by
//! [`DatabaseEntity`]. Filters contribute WHERE fragments written with bare `?`
//! placeholders; the builder renumbers them to `?1`, `?2`, ... in the order the
//! bind values were collected and joins all fragments with AND.

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::pagination::{PageRequest, Sort};

/// Column definition for schema generation.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// SQLite column type (TEXT, INTEGER, REAL, BLOB)
    pub sql_type: &'static str,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Whether this is the auto-assigned primary key
    pub is_primary_key: bool,
    /// Default value expression
    pub default: Option<&'static str>,
}

impl ColumnDef {
    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        }

        if !self.nullable && !self.is_primary_key {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = self.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }

        sql
    }
}

/// Metadata about a database table.
pub trait DatabaseEntity: Sized + Send + Sync + Unpin {
    /// The SQL table name (e.g., "recipes")
    const TABLE_NAME: &'static str;

    /// The primary key column name
    const PRIMARY_KEY: &'static str;

    /// Column definitions, primary key first
    fn columns() -> &'static [ColumnDef];

    /// Build a SELECT query for all columns
    fn select_sql() -> String {
        let columns: Vec<&str> = Self::columns().iter().map(|c| c.name).collect();
        format!("SELECT {} FROM {}", columns.join(", "), Self::TABLE_NAME)
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL
    fn create_table_sql() -> String {
        let column_defs: Vec<String> = Self::columns().iter().map(|c| c.to_sql()).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            Self::TABLE_NAME,
            column_defs.join(",\n  ")
        )
    }
}

/// Something that renders into WHERE fragments plus bind values.
pub trait DatabaseFilter: Send + Sync {
    /// WHERE fragments using bare `?` placeholders, and the values to bind,
    /// in placeholder order.
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>);

    /// True when the filter imposes no condition
    fn is_empty(&self) -> bool;
}

/// A SQL value that can be bound to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

/// Bind every value in `$values` onto a sqlx query/query_as/query_scalar.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                SqlValue::Text(s) => query.bind(s.as_str()),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Bool(b) => query.bind(if *b { 1i32 } else { 0i32 }),
            };
        }
        query
    }};
}

/// Replace each bare `?` with `?N`, continuing from `counter`.
fn renumber_placeholders(condition: &str, counter: &mut usize) -> String {
    let mut result = String::with_capacity(condition.len() + 4);
    let mut chars = condition.chars().peekable();
    while let Some(c) = chars.next() {
        result.push(c);
        if c == '?' && !chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            *counter += 1;
            result.push_str(&counter.to_string());
        }
    }
    result
}

/// A query builder for one entity table.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: std::marker::PhantomData<E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    param_counter: usize,
}

impl<E> EntityQuery<E>
where
    E: DatabaseEntity + for<'r> sqlx::FromRow<'r, SqliteRow>,
{
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
            param_counter: 0,
        }
    }

    /// Add a filter to the query.
    pub fn filter<F: DatabaseFilter + ?Sized>(mut self, filter: &F) -> Self {
        if !filter.is_empty() {
            let (conditions, values) = filter.to_sql_conditions();
            for condition in conditions {
                let rewritten = renumber_placeholders(&condition, &mut self.param_counter);
                self.where_clauses.push(rewritten);
            }
            self.values.extend(values);
        }
        self
    }

    /// Add a single raw condition with one placeholder.
    pub fn where_clause(mut self, condition: &str, value: SqlValue) -> Self {
        let rewritten = renumber_placeholders(condition, &mut self.param_counter);
        self.where_clauses.push(rewritten);
        self.values.push(value);
        self
    }

    pub fn order_by(mut self, sort: Sort) -> Self {
        self.order_by = Some(sort.to_sql_order());
        self
    }

    /// Apply limit, offset and sort from a page request.
    pub fn paginate(mut self, page: &PageRequest) -> Self {
        self.limit = Some(page.limit());
        self.offset = Some(page.offset());
        self.order_by(page.sort())
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Build the SELECT statement.
    pub fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        sql.push_str(&self.where_sql());

        let order = self
            .order_by
            .clone()
            .unwrap_or_else(|| format!("{} ASC", E::PRIMARY_KEY));
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset
            && offset > 0
        {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    /// Build the COUNT statement for the same WHERE clause.
    pub fn build_count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", E::TABLE_NAME, self.where_sql())
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Execute the query and return all matching rows.
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, binds = self.values.len(), "Executing entity query");

        let query = bind_values!(sqlx::query_as::<_, E>(&sql), &self.values);
        query.fetch_all(pool).await
    }

    /// Execute the query and return the first matching row.
    pub async fn fetch_optional(&self, pool: &SqlitePool) -> Result<Option<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query (one)");

        let query = bind_values!(sqlx::query_as::<_, E>(&sql), &self.values);
        query.fetch_optional(pool).await
    }

    /// Execute a COUNT query, ignoring limit and offset.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let query = bind_values!(sqlx::query_scalar::<_, i64>(&sql), &self.values);
        query.fetch_one(pool).await
    }
}

impl<E> Default for EntityQuery<E>
where
    E: DatabaseEntity + for<'r> sqlx::FromRow<'r, SqliteRow>,
{
    fn default() -> Self {
        Self::new()
    }
}
