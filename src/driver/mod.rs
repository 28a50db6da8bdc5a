//! Database driver boundary.
//!
//! The serialization core never talks to a database library directly; it
//! consumes the two traits defined here. A driver must provide:
//!
//! - a connect operation returning a live connection or a connectivity error
//! - a query-execute operation returning a forward-only cursor
//! - cursor metadata: per column a display name, an integer type code from
//!   the known enumeration, and a nullability flag
//! - per-row, per-column access with null detection, array columns as an
//!   element sequence, and binary columns as a readable byte stream
//!
//! One concrete adapter ships in [`postgres`]; tests use in-memory mocks.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;

pub mod codes;
pub mod postgres;
pub mod value;

pub use codes::TypeClass;
pub use value::Scalar;

/// Readable byte stream for a binary column value.
///
/// Data may arrive in arbitrary-sized chunks; consumers must accumulate
/// until end-of-stream before encoding.
pub type BinaryStream = Box<dyn AsyncRead + Send + Unpin>;

/// Driver-reported metadata for one result set column.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    /// Display name (label) of the column.
    pub name: String,

    /// Integer type code from the [`codes`] enumeration.
    pub type_code: i32,

    /// Nullability as reported by the driver; `None` when unknown.
    pub nullable: Option<bool>,
}

/// Forward-only cursor over one query's result set.
///
/// Metadata is available before the first row is consumed. Rows are
/// produced one at a time and must be discarded after use; the cursor
/// never buffers more than the row it just delivered.
#[async_trait]
pub trait QueryCursor: Send {
    /// Result set metadata, in column order.
    fn columns(&self) -> &[ColumnMeta];

    /// Advance to the next row, or `None` when the result set is exhausted.
    async fn next_row(&mut self) -> Result<Option<Box<dyn SqlRow + Send>>>;

    /// Close the cursor and release the underlying connection.
    async fn close(&mut self) -> Result<()>;
}

/// One row of a result set.
///
/// Columns are addressed by zero-based position. `is_null` must be checked
/// before fetching a value; fetching from a NULL column is allowed to
/// return an arbitrary placeholder.
pub trait SqlRow {
    /// Number of columns in the row.
    fn column_count(&self) -> usize;

    /// Whether the column holds SQL NULL.
    fn is_null(&self, index: usize) -> Result<bool>;

    /// Fetch a scalar column value.
    fn scalar(&self, index: usize) -> Result<Scalar>;

    /// Fetch an array column as its element sequence.
    fn array(&self, index: usize) -> Result<Vec<Scalar>>;

    /// Open a binary column as a byte stream.
    fn binary(&self, index: usize) -> Result<BinaryStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_trait_object() {
        // Verify we can use QueryCursor as a trait object
        fn _accepts_cursor(_cursor: Box<dyn QueryCursor>) {}
    }
}
