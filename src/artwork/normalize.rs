use serde_json::{Map, Value};

use crate::artwork::fields::{Source, COLUMNS};
use crate::artwork::record::{ArtworkRecord, FieldValue, Row};
use crate::error::NormalizeError;

/// Normalizes one artwork document into a row of the `artworks` table.
///
/// Missing or malformed individual fields never fail the call; only a
/// top-level value that is not a JSON object does.
pub fn normalize(document: &Value) -> Result<Row, NormalizeError> {
    ArtworkRecord::from_document(document).map(ArtworkRecord::into_row)
}

impl ArtworkRecord {
    pub fn from_document(document: &Value) -> Result<Self, NormalizeError> {
        let map = document
            .as_object()
            .ok_or_else(|| NormalizeError::NotAMapping(json_kind(document)))?;

        // A missing (or non-object) sub-object resolves every column it feeds to no value.
        let thumbnail = nested(map, "thumbnail");
        let color = nested(map, "color");

        let mut record = ArtworkRecord::new();
        for column in COLUMNS {
            let raw = match column.source {
                Source::Top(key) => map.get(key),
                Source::Thumbnail(key) => thumbnail.and_then(|t| t.get(key)),
                Source::Color(key) => color.and_then(|c| c.get(key)),
            };
            if let Some(value) = raw.and_then(|v| FieldValue::from_json(v, column.kind)) {
                record.set(column.name, value);
            }
        }
        Ok(record)
    }
}

fn nested<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact JSON text for a multi-valued field.
pub fn serialize_sequence(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Inverse of [`serialize_sequence`]. Text that is not JSON comes back as a string.
pub fn deserialize_sequence(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_study_in_blue() {
        let doc = json!({
            "id": 42,
            "title": "Study in Blue",
            "color": {"h": 210, "l": 50, "s": 80},
            "category_ids": ["1", "7"]
        });
        let row = normalize(&doc).unwrap();

        assert_eq!(row.id(), Some(42));
        assert_eq!(row.get("title"), Some(&FieldValue::Text("Study in Blue".into())));
        assert_eq!(row.get("color_h"), Some(&FieldValue::Integer(210)));
        assert_eq!(row.get("color_l"), Some(&FieldValue::Integer(50)));
        assert_eq!(row.get("color_s"), Some(&FieldValue::Integer(80)));
        assert_eq!(row.get("color_percentage"), None);
        assert_eq!(row.get("color_population"), None);

        let categories = row.get("category_ids").unwrap().to_sql();
        assert_eq!(categories, rusqlite::types::Value::Text(r#"["1","7"]"#.into()));

        let present = COLUMNS.iter().filter(|c| row.get(c.name).is_some()).count();
        assert_eq!(present, 6);
    }

    #[test]
    fn test_missing_color_is_no_value() {
        let row = normalize(&json!({"id": 1, "colorfulness": 0.0})).unwrap();
        for name in ["color_h", "color_l", "color_s", "color_percentage", "color_population"] {
            assert_eq!(row.get(name), None, "{} should be absent", name);
        }
        // Explicit zero is a value, not absence.
        assert_eq!(row.get("colorfulness"), Some(&FieldValue::Real(0.0)));
    }

    #[test]
    fn test_null_thumbnail_and_fields() {
        let row = normalize(&json!({
            "id": 3,
            "thumbnail": null,
            "title": null,
            "alt_titles": null,
            "color": "not an object"
        }))
        .unwrap();
        assert_eq!(row.get("thumbnail_width"), None);
        assert_eq!(row.get("title"), None);
        assert_eq!(row.get("alt_titles"), None);
        assert_eq!(row.get("color_h"), None);
    }

    #[test]
    fn test_thumbnail_flattened() {
        let row = normalize(&json!({
            "id": 5,
            "thumbnail": {"width": 3000, "height": 2250, "lqip": "data:image/gif", "alt_text": "A haystack"}
        }))
        .unwrap();
        assert_eq!(row.get("thumbnail_width"), Some(&FieldValue::Integer(3000)));
        assert_eq!(row.get("thumbnail_height"), Some(&FieldValue::Integer(2250)));
        assert_eq!(row.get("thumbnail_lqip"), Some(&FieldValue::Text("data:image/gif".into())));
        assert_eq!(row.get("thumbnail_alt_text"), Some(&FieldValue::Text("A haystack".into())));
    }

    #[test]
    fn test_missing_id_still_normalizes() {
        let row = normalize(&json!({"title": "Untitled"})).unwrap();
        assert_eq!(row.id(), None);
        assert!(row.get("title").is_some());
    }

    #[test]
    fn test_not_a_mapping() {
        let err = normalize(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAMapping("array")));
    }

    #[test]
    fn test_sequence_round_trip() {
        let samples = [
            json!(["a", "b", "c"]),
            json!([3, 1, 2]),
            json!([{"width": 73.7, "height": 92.1}]),
            json!([]),
        ];
        for sample in samples {
            assert_eq!(deserialize_sequence(&serialize_sequence(&sample)), sample);
        }
        assert_eq!(deserialize_sequence("not json"), json!("not json"));
    }
}
