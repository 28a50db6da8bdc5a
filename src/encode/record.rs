//! Row serialization: one result set row to one JSON record.

use serde_json::Value as JsonValue;

use crate::driver::SqlRow;
use crate::error::Result;
use crate::schema::ColumnDescriptor;

use super::encode_value;

/// One serialized row: column name to JSON value, in column order.
pub type JsonRecord = serde_json::Map<String, JsonValue>;

/// Serialize one row against the extracted schema.
///
/// Every column maps to exactly one value, never omitted, including NULL.
/// When two columns share a name the later one overwrites the earlier one
/// in the record (last wins); the key keeps its original position, so key
/// order still equals column order for well-formed schemas.
pub async fn serialize_row(
    row: &dyn SqlRow,
    schema: &[ColumnDescriptor],
    chunk_size: usize,
) -> Result<JsonRecord> {
    let mut record = JsonRecord::new();
    for (index, column) in schema.iter().enumerate() {
        let value = encode_value(row, index, column, chunk_size).await?;
        record.insert(column.name.clone(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{Cell, StubRow};
    use super::*;
    use crate::driver::codes;
    use crate::driver::value::Scalar;
    use crate::schema::ColumnDescriptor;
    use crate::driver::codes::TypeClass;

    fn column(name: &str, type_code: i32) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            type_code,
            required: false,
            class: TypeClass::classify(type_code),
        }
    }

    #[test]
    fn test_keys_follow_column_order() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![
                    Cell::Scalar(Scalar::Int(1)),
                    Cell::Scalar(Scalar::from("a")),
                    Cell::Null,
                ],
            };
            let schema = [
                column("zulu", codes::INTEGER),
                column("alpha", codes::VARCHAR),
                column("mike", codes::VARBINARY),
            ];

            let record = serialize_row(&row, &schema, 1024).await.unwrap();
            let keys: Vec<&String> = record.keys().collect();
            assert_eq!(keys, ["zulu", "alpha", "mike"]);
            assert_eq!(
                serde_json::to_string(&record).unwrap(),
                r#"{"zulu":1,"alpha":"a","mike":null}"#
            );
        });
    }

    #[test]
    fn test_duplicate_column_names_last_wins() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![
                    Cell::Scalar(Scalar::Int(1)),
                    Cell::Scalar(Scalar::Int(2)),
                ],
            };
            let schema = [column("n", codes::INTEGER), column("n", codes::INTEGER)];

            let record = serialize_row(&row, &schema, 1024).await.unwrap();
            assert_eq!(record.len(), 1);
            assert_eq!(record["n"], serde_json::json!(2));
        });
    }

    #[test]
    fn test_every_column_present_even_when_null() {
        tokio_test::block_on(async {
            let row = StubRow {
                cells: vec![Cell::Null, Cell::Null],
            };
            let schema = [column("a", codes::ARRAY), column("b", codes::DOUBLE)];

            let record = serialize_row(&row, &schema, 1024).await.unwrap();
            assert_eq!(record.len(), 2);
            assert!(record["a"].is_null());
            assert!(record["b"].is_null());
        });
    }
}
