//! PostgreSQL driver adapter built on sqlx.
//!
//! Maps PostgreSQL type names onto the [`codes`](super::codes) enumeration
//! at statement-describe time and decodes row values into [`Scalar`]
//! variants. Unsupported native types are carried through to the schema
//! artifact but rejected with an encoding error on first value access.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::StreamExt;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row, TypeInfo, ValueRef};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::driver::value::Scalar;
use crate::driver::{codes, BinaryStream, ColumnMeta, QueryCursor, SqlRow};
use crate::error::{
    ConnectionError, EncodingError, ExportError, MetadataError, QueryError, Result,
};

/// Establish a connection to PostgreSQL.
///
/// # Arguments
/// * `url` - Connection URL (`postgres://host:port/database`)
/// * `username` - Optional username override
/// * `password` - Optional password
/// * `timeout` - Connect timeout imposed at the driver boundary
///
/// # Returns
/// * `Result<PgConnection>` - Live connection or connectivity error
pub async fn connect(
    url: &str,
    username: Option<&str>,
    password: Option<&str>,
    timeout: Duration,
) -> Result<PgConnection> {
    let mut options = PgConnectOptions::from_str(url)
        .map_err(|e| ConnectionError::InvalidUrl(format!("{url}: {e}")))?;

    if let Some(user) = username {
        options = options.username(user);
    }
    if let Some(pass) = password {
        options = options.password(pass);
    }

    match tokio::time::timeout(timeout, options.connect()).await {
        Ok(Ok(conn)) => {
            info!("Connected to {url}");
            Ok(conn)
        }
        Ok(Err(e)) => Err(map_connect_error(e).into()),
        Err(_) => Err(ConnectionError::Timeout.into()),
    }
}

fn map_connect_error(err: sqlx::Error) -> ConnectionError {
    match &err {
        // 28000 invalid_authorization_specification, 28P01 invalid_password
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some("28000") | Some("28P01")) =>
        {
            ConnectionError::AuthFailed(db.message().to_string())
        }
        _ => ConnectionError::ConnectFailed(err.to_string()),
    }
}

/// Per-column decode plan, fixed at describe time.
#[derive(Debug, Clone)]
enum PgKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Bytea,
    Array(PgElem),
    Unsupported(String),
}

/// Element type of a supported array column.
#[derive(Debug, Clone, Copy)]
enum PgElem {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
}

/// Map a PostgreSQL type name to its type code and decode plan.
fn map_pg_type(type_name: &str) -> (i32, PgKind) {
    if let Some(element) = type_name.strip_suffix("[]") {
        let elem = match element {
            "BOOL" => Some(PgElem::Bool),
            "INT2" => Some(PgElem::Int2),
            "INT4" => Some(PgElem::Int4),
            "INT8" => Some(PgElem::Int8),
            "FLOAT4" => Some(PgElem::Float4),
            "FLOAT8" => Some(PgElem::Float8),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Some(PgElem::Text),
            _ => None,
        };
        return match elem {
            Some(elem) => (codes::ARRAY, PgKind::Array(elem)),
            None => (codes::ARRAY, PgKind::Unsupported(type_name.to_string())),
        };
    }

    match type_name {
        "BOOL" => (codes::BOOLEAN, PgKind::Bool),
        "INT2" => (codes::SMALLINT, PgKind::Int2),
        "INT4" => (codes::INTEGER, PgKind::Int4),
        "INT8" => (codes::BIGINT, PgKind::Int8),
        "FLOAT4" => (codes::REAL, PgKind::Float4),
        "FLOAT8" => (codes::DOUBLE, PgKind::Float8),
        "TEXT" | "NAME" => (codes::VARCHAR, PgKind::Text),
        "VARCHAR" => (codes::VARCHAR, PgKind::Text),
        "BPCHAR" | "CHAR" => (codes::CHAR, PgKind::Text),
        "DATE" => (codes::DATE, PgKind::Date),
        "TIME" => (codes::TIME, PgKind::Time),
        "TIMESTAMP" => (codes::TIMESTAMP, PgKind::Timestamp),
        "TIMESTAMPTZ" => (codes::TIMESTAMP_WITH_TIMEZONE, PgKind::TimestampTz),
        "UUID" => (codes::OTHER, PgKind::Uuid),
        "BYTEA" => (codes::VARBINARY, PgKind::Bytea),
        "NUMERIC" => (codes::NUMERIC, PgKind::Unsupported(type_name.to_string())),
        other => (codes::OTHER, PgKind::Unsupported(other.to_string())),
    }
}

#[derive(Debug)]
struct PgColumnPlan {
    name: String,
    kind: PgKind,
}

/// Forward-only cursor over one PostgreSQL query.
///
/// The connection is owned by a feeder task that drives the sqlx row
/// stream and hands rows over a rendezvous channel of capacity one, so at
/// most one undelivered row exists at any time. Dropping the cursor drops
/// the receiver, which stops the feeder and closes the connection.
pub struct PgCursor {
    columns: Vec<ColumnMeta>,
    plan: Arc<[PgColumnPlan]>,
    rows: mpsc::Receiver<std::result::Result<PgRow, sqlx::Error>>,
    feeder: JoinHandle<()>,
    closed: bool,
}

impl PgCursor {
    /// Execute a query and open a cursor over its result set.
    ///
    /// The statement is described first, so full column metadata is
    /// available before the first row is fetched.
    pub async fn open(mut conn: PgConnection, sql: &str) -> Result<Self> {
        let describe = conn.describe(sql).await.map_err(|e| match e {
            sqlx::Error::Database(db) => {
                ExportError::from(QueryError::ExecutionFailed(db.to_string()))
            }
            other => ExportError::from(MetadataError::Unavailable(other.to_string())),
        })?;

        let mut columns = Vec::with_capacity(describe.columns().len());
        let mut plan = Vec::with_capacity(describe.columns().len());
        for (index, column) in describe.columns().iter().enumerate() {
            let type_name = column.type_info().name();
            let (type_code, kind) = map_pg_type(type_name);
            columns.push(ColumnMeta {
                name: column.name().to_string(),
                type_code,
                nullable: describe.nullable(index),
            });
            plan.push(PgColumnPlan {
                name: column.name().to_string(),
                kind,
            });
        }

        let (tx, rx) = mpsc::channel(1);
        let sql = sql.to_string();
        let feeder = tokio::spawn(async move {
            {
                let mut stream = conn.fetch(sql.as_str());
                while let Some(item) = stream.next().await {
                    let failed = item.is_err();
                    if tx.send(item).await.is_err() {
                        // Receiver gone, stop fetching
                        break;
                    }
                    if failed {
                        break;
                    }
                }
            }
            if let Err(e) = conn.close().await {
                debug!("Connection close failed: {e}");
            }
        });

        Ok(Self {
            columns,
            plan: plan.into(),
            rows: rx,
            feeder,
            closed: false,
        })
    }
}

#[async_trait]
impl QueryCursor for PgCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Box<dyn SqlRow + Send>>> {
        if self.closed {
            return Ok(None);
        }

        match self.rows.recv().await {
            Some(Ok(row)) => Ok(Some(Box::new(PgRowHandle {
                row,
                plan: Arc::clone(&self.plan),
            }))),
            Some(Err(e)) => {
                self.closed = true;
                Err(QueryError::CursorFailed(e.to_string()).into())
            }
            None => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed && self.feeder.is_finished() {
            return Ok(());
        }
        self.closed = true;
        self.rows.close();
        if let Err(e) = (&mut self.feeder).await {
            debug!("Feeder task failed: {e}");
        }
        Ok(())
    }
}

impl Drop for PgCursor {
    fn drop(&mut self) {
        if !self.closed {
            debug!("PgCursor dropped without explicit close");
        }
    }
}

/// One PostgreSQL row with its decode plan.
struct PgRowHandle {
    row: PgRow,
    plan: Arc<[PgColumnPlan]>,
}

impl PgRowHandle {
    fn column_plan(&self, index: usize) -> Result<&PgColumnPlan> {
        self.plan.get(index).ok_or_else(|| {
            EncodingError::ValueDecode {
                column: format!("#{index}"),
                message: "column index out of range".to_string(),
            }
            .into()
        })
    }

    fn get<'r, T>(&'r self, index: usize) -> Result<Option<T>>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.row.try_get::<Option<T>, _>(index).map_err(|e| {
            EncodingError::ValueDecode {
                column: self.plan[index].name.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

fn map_elements<T>(items: Vec<Option<T>>, f: impl Fn(T) -> Scalar) -> Vec<Scalar> {
    items
        .into_iter()
        .map(|item| item.map(&f).unwrap_or(Scalar::Null))
        .collect()
}

impl SqlRow for PgRowHandle {
    fn column_count(&self) -> usize {
        self.plan.len()
    }

    fn is_null(&self, index: usize) -> Result<bool> {
        let value = self.row.try_get_raw(index).map_err(|e| {
            ExportError::from(EncodingError::ValueDecode {
                column: format!("#{index}"),
                message: e.to_string(),
            })
        })?;
        Ok(value.is_null())
    }

    fn scalar(&self, index: usize) -> Result<Scalar> {
        let plan = self.column_plan(index)?;
        match &plan.kind {
            PgKind::Bool => Ok(self
                .get::<bool>(index)?
                .map(Scalar::Boolean)
                .unwrap_or(Scalar::Null)),
            PgKind::Int2 => Ok(self
                .get::<i16>(index)?
                .map(|n| Scalar::Int(n.into()))
                .unwrap_or(Scalar::Null)),
            PgKind::Int4 => Ok(self
                .get::<i32>(index)?
                .map(|n| Scalar::Int(n.into()))
                .unwrap_or(Scalar::Null)),
            PgKind::Int8 => Ok(self
                .get::<i64>(index)?
                .map(Scalar::Int)
                .unwrap_or(Scalar::Null)),
            PgKind::Float4 => Ok(self
                .get::<f32>(index)?
                .map(|f| Scalar::Float(f.into()))
                .unwrap_or(Scalar::Null)),
            PgKind::Float8 => Ok(self
                .get::<f64>(index)?
                .map(Scalar::Float)
                .unwrap_or(Scalar::Null)),
            PgKind::Text => Ok(self
                .get::<String>(index)?
                .map(Scalar::Text)
                .unwrap_or(Scalar::Null)),
            PgKind::Date => Ok(self
                .get::<NaiveDate>(index)?
                .map(|d| Scalar::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Scalar::Null)),
            PgKind::Time => Ok(self
                .get::<NaiveTime>(index)?
                .map(|t| Scalar::Text(t.format("%H:%M:%S%.f").to_string()))
                .unwrap_or(Scalar::Null)),
            PgKind::Timestamp => Ok(self
                .get::<NaiveDateTime>(index)?
                .map(|dt| Scalar::Timestamp(dt.and_utc()))
                .unwrap_or(Scalar::Null)),
            PgKind::TimestampTz => Ok(self
                .get::<DateTime<Utc>>(index)?
                .map(Scalar::Timestamp)
                .unwrap_or(Scalar::Null)),
            PgKind::Uuid => Ok(self
                .get::<uuid::Uuid>(index)?
                .map(|u| Scalar::Text(u.to_string()))
                .unwrap_or(Scalar::Null)),
            PgKind::Bytea | PgKind::Array(_) => Err(EncodingError::ValueDecode {
                column: plan.name.clone(),
                message: "column is not scalar".to_string(),
            }
            .into()),
            PgKind::Unsupported(type_name) => Err(EncodingError::UnsupportedType {
                column: plan.name.clone(),
                type_name: type_name.clone(),
            }
            .into()),
        }
    }

    fn array(&self, index: usize) -> Result<Vec<Scalar>> {
        let plan = self.column_plan(index)?;
        match &plan.kind {
            PgKind::Array(elem) => {
                let elements = match elem {
                    PgElem::Bool => {
                        map_elements(self.get::<Vec<Option<bool>>>(index)?.unwrap_or_default(), Scalar::Boolean)
                    }
                    PgElem::Int2 => map_elements(
                        self.get::<Vec<Option<i16>>>(index)?.unwrap_or_default(),
                        |n| Scalar::Int(n.into()),
                    ),
                    PgElem::Int4 => map_elements(
                        self.get::<Vec<Option<i32>>>(index)?.unwrap_or_default(),
                        |n| Scalar::Int(n.into()),
                    ),
                    PgElem::Int8 => map_elements(
                        self.get::<Vec<Option<i64>>>(index)?.unwrap_or_default(),
                        Scalar::Int,
                    ),
                    PgElem::Float4 => map_elements(
                        self.get::<Vec<Option<f32>>>(index)?.unwrap_or_default(),
                        |f| Scalar::Float(f.into()),
                    ),
                    PgElem::Float8 => map_elements(
                        self.get::<Vec<Option<f64>>>(index)?.unwrap_or_default(),
                        Scalar::Float,
                    ),
                    PgElem::Text => map_elements(
                        self.get::<Vec<Option<String>>>(index)?.unwrap_or_default(),
                        Scalar::Text,
                    ),
                };
                Ok(elements)
            }
            PgKind::Unsupported(type_name) => Err(EncodingError::UnsupportedType {
                column: plan.name.clone(),
                type_name: type_name.clone(),
            }
            .into()),
            _ => Err(EncodingError::ValueDecode {
                column: plan.name.clone(),
                message: "column is not an array".to_string(),
            }
            .into()),
        }
    }

    fn binary(&self, index: usize) -> Result<BinaryStream> {
        let plan = self.column_plan(index)?;
        match &plan.kind {
            PgKind::Bytea => {
                let bytes = self.get::<Vec<u8>>(index)?.unwrap_or_default();
                Ok(Box::new(std::io::Cursor::new(bytes)))
            }
            PgKind::Unsupported(type_name) => Err(EncodingError::UnsupportedType {
                column: plan.name.clone(),
                type_name: type_name.clone(),
            }
            .into()),
            _ => Err(EncodingError::ValueDecode {
                column: plan.name.clone(),
                message: "column is not binary".to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_pg_type_scalars() {
        assert_eq!(map_pg_type("INT4").0, codes::INTEGER);
        assert_eq!(map_pg_type("INT8").0, codes::BIGINT);
        assert_eq!(map_pg_type("TEXT").0, codes::VARCHAR);
        assert_eq!(map_pg_type("BOOL").0, codes::BOOLEAN);
        assert_eq!(map_pg_type("TIMESTAMPTZ").0, codes::TIMESTAMP_WITH_TIMEZONE);
    }

    #[test]
    fn test_map_pg_type_binary_and_array() {
        assert_eq!(map_pg_type("BYTEA").0, codes::VARBINARY);
        assert_eq!(map_pg_type("INT4[]").0, codes::ARRAY);
        assert_eq!(map_pg_type("TEXT[]").0, codes::ARRAY);
        assert!(matches!(map_pg_type("INT4[]").1, PgKind::Array(_)));
    }

    #[test]
    fn test_map_pg_type_unsupported() {
        assert!(matches!(map_pg_type("NUMERIC").1, PgKind::Unsupported(_)));
        assert_eq!(map_pg_type("NUMERIC").0, codes::NUMERIC);
        assert!(matches!(map_pg_type("JSONB").1, PgKind::Unsupported(_)));
        assert_eq!(map_pg_type("JSONB").0, codes::OTHER);
        // Arrays of unsupported elements still report the array code
        assert_eq!(map_pg_type("NUMERIC[]").0, codes::ARRAY);
        assert!(matches!(map_pg_type("NUMERIC[]").1, PgKind::Unsupported(_)));
    }

    #[test]
    fn test_map_elements_preserves_nulls() {
        let items = vec![Some(1i64), None, Some(3)];
        let scalars = map_elements(items, Scalar::Int);
        assert_eq!(
            scalars,
            vec![Scalar::Int(1), Scalar::Null, Scalar::Int(3)]
        );
    }
}
