//! Column schema extraction.
//!
//! Reads cursor metadata once, before any row is consumed, and produces the
//! ordered column descriptor list that drives both the schema artifact and
//! the per-column decoding strategy of the row serializer.

use serde::Serialize;

use crate::driver::codes::TypeClass;
use crate::driver::ColumnMeta;
use crate::error::Result;

/// One column of the result set, fixed for the lifetime of an export.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Display name, used as the record key.
    pub name: String,

    /// Integer type code as reported by the driver.
    pub type_code: i32,

    /// True iff the driver reports the column as non-nullable. Unknown
    /// nullability counts as nullable.
    pub required: bool,

    /// Encoding class, computed once here and reused for every row.
    pub class: TypeClass,
}

/// Build the descriptor list from cursor metadata, in column order.
///
/// Duplicate column names are allowed and kept: the schema artifact lists
/// every column, while records collapse duplicates with the later column
/// winning (see the row serializer).
pub fn extract(columns: &[ColumnMeta]) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|column| ColumnDescriptor {
            name: column.name.clone(),
            type_code: column.type_code,
            required: column.nullable == Some(false),
            class: TypeClass::classify(column.type_code),
        })
        .collect()
}

/// Wire form of one schema artifact entry.
///
/// Field order here is the artifact's key order.
#[derive(Serialize)]
struct SchemaColumn<'a> {
    column: &'a str,
    #[serde(rename = "type")]
    type_code: i32,
    required: bool,
}

/// Render the schema artifact body: a single JSON array of
/// `{"column", "type", "required"}` objects in column order.
pub fn to_artifact_json(schema: &[ColumnDescriptor]) -> Result<String> {
    let entries: Vec<SchemaColumn<'_>> = schema
        .iter()
        .map(|column| SchemaColumn {
            column: &column.name,
            type_code: column.type_code,
            required: column.required,
        })
        .collect();
    Ok(serde_json::to_string(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::codes;

    fn meta(name: &str, type_code: i32, nullable: Option<bool>) -> ColumnMeta {
        ColumnMeta {
            name: name.to_string(),
            type_code,
            nullable,
        }
    }

    #[test]
    fn test_extract_preserves_order_and_classes() {
        let columns = vec![
            meta("id", codes::INTEGER, Some(false)),
            meta("tags", codes::ARRAY, Some(true)),
            meta("payload", codes::VARBINARY, Some(true)),
        ];

        let schema = extract(&columns);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema[0].name, "id");
        assert_eq!(schema[0].class, TypeClass::Scalar);
        assert!(schema[0].required);
        assert_eq!(schema[1].class, TypeClass::Array);
        assert_eq!(schema[2].class, TypeClass::Binary);
    }

    #[test]
    fn test_unknown_nullability_counts_as_nullable() {
        let schema = extract(&[meta("x", codes::VARCHAR, None)]);
        assert!(!schema[0].required);
    }

    #[test]
    fn test_artifact_json_shape() {
        let schema = extract(&[
            meta("id", codes::INTEGER, Some(false)),
            meta("tag", codes::VARCHAR, Some(true)),
        ]);
        let json = to_artifact_json(&schema).unwrap();
        assert_eq!(
            json,
            r#"[{"column":"id","type":4,"required":true},{"column":"tag","type":12,"required":false}]"#
        );
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let schema = extract(&[
            meta("n", codes::INTEGER, Some(false)),
            meta("n", codes::VARCHAR, Some(true)),
        ]);
        assert_eq!(schema.len(), 2);
        let json = to_artifact_json(&schema).unwrap();
        assert_eq!(json.matches("\"column\":\"n\"").count(), 2);
    }
}
