//! Value encoding: one driver value to one JSON value.
//!
//! Dispatch follows the column's stored [`TypeClass`], checked in priority
//! order (array, then binary, then the scalar fallback). A column can look
//! like more than one class depending on driver quirks, so the first match
//! wins. SQL NULL maps to JSON `null` in every arm.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value as JsonValue;
use tokio::io::AsyncReadExt;

use crate::driver::codes::TypeClass;
use crate::driver::value::Scalar;
use crate::driver::{BinaryStream, SqlRow};
use crate::error::{EncodingError, Result};
use crate::schema::ColumnDescriptor;

pub mod record;

pub use record::{serialize_row, JsonRecord};

/// Marker prepended to every encoded binary value.
///
/// The prefix is part of the output contract: consumers strip it and
/// base64-decode the remainder to recover the raw bytes.
pub const BINARY_PREFIX: &str = "base64:";

/// Encode one column of one row into its JSON value.
///
/// Pure with respect to program state; the only effect is reading from the
/// row handle.
pub async fn encode_value(
    row: &dyn SqlRow,
    index: usize,
    column: &ColumnDescriptor,
    chunk_size: usize,
) -> Result<JsonValue> {
    match column.class {
        TypeClass::Array => {
            if row.is_null(index)? {
                return Ok(JsonValue::Null);
            }
            let elements = row.array(index)?;
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                // Elements pass through flat; no per-element class dispatch
                items.push(scalar_to_json(element, &column.name)?);
            }
            Ok(JsonValue::Array(items))
        }
        TypeClass::Binary => {
            if row.is_null(index)? {
                return Ok(JsonValue::Null);
            }
            let stream = row.binary(index)?;
            let bytes = read_all_chunked(stream, chunk_size).await?;
            Ok(JsonValue::String(format!(
                "{BINARY_PREFIX}{}",
                STANDARD.encode(&bytes)
            )))
        }
        TypeClass::Scalar => {
            if row.is_null(index)? {
                return Ok(JsonValue::Null);
            }
            scalar_to_json(row.scalar(index)?, &column.name)
        }
    }
}

/// Map one scalar to its JSON form.
///
/// Non-finite floats have no JSON representation and fail the export
/// rather than degrading to `null`.
fn scalar_to_json(value: Scalar, column: &str) -> Result<JsonValue> {
    Ok(match value {
        Scalar::Null => JsonValue::Null,
        Scalar::Boolean(b) => JsonValue::Bool(b),
        Scalar::Int(n) => JsonValue::Number(n.into()),
        Scalar::Float(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .ok_or_else(|| EncodingError::NonFiniteNumber {
                column: column.to_string(),
            })?,
        Scalar::Text(s) => JsonValue::String(s),
        Scalar::Timestamp(dt) => JsonValue::String(dt.to_rfc3339()),
    })
}

/// Drain a binary stream, accumulating chunks until end-of-stream.
///
/// The stream may deliver data in arbitrary-sized pieces; encoding cannot
/// start until the full byte sequence is known, so everything is collected
/// first. Memory scales with the single value, never the result set.
async fn read_all_chunked(mut stream: BinaryStream, chunk_size: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::codes;
    use crate::error::ExportError;
    use chrono::{TimeZone, Utc};

    /// Minimal single-row stand-in for encoder tests.
    pub(crate) struct StubRow {
        pub cells: Vec<Cell>,
    }

    pub(crate) enum Cell {
        Null,
        Scalar(Scalar),
        Array(Vec<Scalar>),
        Binary(Vec<u8>),
    }

    impl SqlRow for StubRow {
        fn column_count(&self) -> usize {
            self.cells.len()
        }

        fn is_null(&self, index: usize) -> Result<bool> {
            Ok(matches!(self.cells[index], Cell::Null))
        }

        fn scalar(&self, index: usize) -> Result<Scalar> {
            match &self.cells[index] {
                Cell::Scalar(s) => Ok(s.clone()),
                _ => Ok(Scalar::Null),
            }
        }

        fn array(&self, index: usize) -> Result<Vec<Scalar>> {
            match &self.cells[index] {
                Cell::Array(items) => Ok(items.clone()),
                _ => Ok(Vec::new()),
            }
        }

        fn binary(&self, index: usize) -> Result<BinaryStream> {
            match &self.cells[index] {
                Cell::Binary(bytes) => Ok(Box::new(std::io::Cursor::new(bytes.clone()))),
                _ => Ok(Box::new(std::io::Cursor::new(Vec::new()))),
            }
        }
    }

    fn column(name: &str, type_code: i32) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            type_code,
            required: false,
            class: TypeClass::classify(type_code),
        }
    }

    #[test]
    fn test_null_is_null_for_every_class() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Null, Cell::Null, Cell::Null],
            };
            let columns = [
                column("a", codes::ARRAY),
                column("b", codes::VARBINARY),
                column("c", codes::INTEGER),
            ];
            for (index, col) in columns.iter().enumerate() {
                let value = encode_value(&row, index, col, 1024).await.unwrap();
                assert_eq!(value, JsonValue::Null);
            }
        });
    }

    #[test]
    fn test_array_passthrough() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Array(vec![
                    Scalar::Int(1),
                    Scalar::from("a"),
                    Scalar::Null,
                ])],
            };
            let value = encode_value(&row, 0, &column("tags", codes::ARRAY), 1024)
                .await
                .unwrap();
            assert_eq!(value, serde_json::json!([1, "a", null]));
        });
    }

    #[test]
    fn test_binary_prefix_and_round_trip() {
        tokio_test::block_on(async {
            let payload = vec![0x00, 0x01];
            let row = StubRow {
                cells: vec![Cell::Binary(payload.clone())],
            };
            let value = encode_value(&row, 0, &column("payload", codes::VARBINARY), 1024)
                .await
                .unwrap();
            assert_eq!(value, JsonValue::String("base64:AAE=".to_string()));

            let JsonValue::String(s) = value else {
                unreachable!()
            };
            let decoded = STANDARD.decode(&s[BINARY_PREFIX.len()..]).unwrap();
            assert_eq!(decoded, payload);
        });
    }

    #[test]
    fn test_binary_single_byte() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Binary(vec![0xFF])],
            };
            let value = encode_value(&row, 0, &column("payload", codes::VARBINARY), 1024)
                .await
                .unwrap();
            assert_eq!(value, JsonValue::String("base64:/w==".to_string()));
        });
    }

    #[test]
    fn test_binary_empty() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Binary(Vec::new())],
            };
            let value = encode_value(&row, 0, &column("payload", codes::BINARY), 1024)
                .await
                .unwrap();
            assert_eq!(value, JsonValue::String("base64:".to_string()));
        });
    }

    #[test]
    fn test_binary_spanning_chunk_boundaries() {
        tokio_test::block_on(async {
            let payload: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
            let row = StubRow {
                cells: vec![Cell::Binary(payload.clone())],
            };
            // Chunk size far smaller than the payload forces many reads
            let value = encode_value(&row, 0, &column("payload", codes::LONGVARBINARY), 7)
                .await
                .unwrap();
            let expected = format!("base64:{}", STANDARD.encode(&payload));
            assert_eq!(value, JsonValue::String(expected));
        });
    }

    #[test]
    fn test_scalar_kinds() {
        tokio_test::block_on(async {
            let ts = Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();
            let cases = [
                (Scalar::Boolean(true), serde_json::json!(true)),
                (Scalar::Int(-7), serde_json::json!(-7)),
                (Scalar::Float(1.5), serde_json::json!(1.5)),
                (Scalar::from("hi"), serde_json::json!("hi")),
                (
                    Scalar::Timestamp(ts),
                    serde_json::json!("2023-04-05T06:07:08+00:00"),
                ),
            ];
            for (scalar, expected) in cases {
                let row = StubRow {
                    cells: vec![Cell::Scalar(scalar)],
                };
                let value = encode_value(&row, 0, &column("v", codes::OTHER), 1024)
                    .await
                    .unwrap();
                assert_eq!(value, expected);
            }
        });
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Scalar(Scalar::Float(f64::NAN))],
            };
            let err = encode_value(&row, 0, &column("ratio", codes::DOUBLE), 1024)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExportError::Encoding(EncodingError::NonFiniteNumber { .. })
            ));
        });
    }
}
