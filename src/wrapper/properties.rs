//! The property dispatcher.
//!
//! Template authors pass a flat properties bag when they open a document.
//! Each known key maps to a setter through a static dispatch table: document
//! metadata keys mutate the in-progress [`Book`], keys nested under
//! `security` mutate its protection flags, and `format` / `template` are
//! render parameters consumed by the lifecycle controller itself. Unknown
//! keys are logged and skipped.

use crate::error::SheetError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sheetpress_model::{Book, Metadata, Security, Style};

/// Render parameters extracted from the properties bag.
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderParameters {
    pub format: Option<String>,
    pub template: Option<String>,
}

type MetadataSetter = fn(&mut Metadata, &str, &Value) -> Result<(), SheetError>;
type SecuritySetter = fn(&mut Security, &str, &Value) -> Result<(), SheetError>;

/// Document metadata mappings, keyed by property name.
const METADATA_MAPPINGS: &[(&str, MetadataSetter)] = &[
    ("category", |m, k, v| Ok(m.category = Some(as_string(k, v)?))),
    ("company", |m, k, v| Ok(m.company = Some(as_string(k, v)?))),
    ("created", |m, k, v| Ok(m.created = as_datetime(k, v)?)),
    ("creator", |m, k, v| Ok(m.creator = Some(as_string(k, v)?))),
    ("description", |m, k, v| {
        Ok(m.description = Some(as_string(k, v)?))
    }),
    ("keywords", |m, k, v| Ok(m.keywords = Some(as_string(k, v)?))),
    ("last_modified_by", |m, k, v| {
        Ok(m.last_modified_by = Some(as_string(k, v)?))
    }),
    ("manager", |m, k, v| Ok(m.manager = Some(as_string(k, v)?))),
    ("modified", |m, k, v| Ok(m.modified = as_datetime(k, v)?)),
    ("subject", |m, k, v| Ok(m.subject = Some(as_string(k, v)?))),
    ("title", |m, k, v| Ok(m.title = Some(as_string(k, v)?))),
];

/// Mappings for keys nested under `security`.
const SECURITY_MAPPINGS: &[(&str, SecuritySetter)] = &[
    ("lock_revision", |s, k, v| {
        Ok(s.lock_revision = as_bool(k, v)?)
    }),
    ("lock_structure", |s, k, v| {
        Ok(s.lock_structure = as_bool(k, v)?)
    }),
    ("lock_windows", |s, k, v| Ok(s.lock_windows = as_bool(k, v)?)),
    ("revisions_password", |s, k, v| {
        Ok(s.revisions_password = Some(as_string(k, v)?))
    }),
    ("workbook_password", |s, k, v| {
        Ok(s.workbook_password = Some(as_string(k, v)?))
    }),
];

/// Applies a properties bag to the in-progress document.
pub(crate) fn apply(
    book: &mut Book,
    parameters: &mut RenderParameters,
    properties: &Map<String, Value>,
) -> Result<(), SheetError> {
    for (key, value) in properties {
        match key.as_str() {
            "format" => parameters.format = Some(as_string(key, value)?),
            "template" => parameters.template = Some(as_string(key, value)?),
            "default_style" => {
                let style: Style = serde_json::from_value(value.clone())
                    .map_err(|e| SheetError::property(key, e.to_string()))?;
                book.set_default_style(style);
            }
            "security" => apply_security(book.security_mut(), key, value)?,
            other => match lookup(METADATA_MAPPINGS, other) {
                Some(setter) => setter(book.metadata_mut(), other, value)?,
                None => log::warn!("ignoring unknown document property \"{other}\""),
            },
        }
    }
    Ok(())
}

fn apply_security(security: &mut Security, key: &str, value: &Value) -> Result<(), SheetError> {
    let entries = value
        .as_object()
        .ok_or_else(|| SheetError::property(key, "expected an object"))?;

    for (nested_key, nested_value) in entries {
        match lookup(SECURITY_MAPPINGS, nested_key) {
            Some(setter) => setter(security, nested_key, nested_value)?,
            None => log::warn!("ignoring unknown security property \"{nested_key}\""),
        }
    }
    Ok(())
}

fn lookup<S: Copy>(mappings: &[(&str, S)], key: &str) -> Option<S> {
    mappings
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, setter)| *setter)
}

fn as_string(key: &str, value: &Value) -> Result<String, SheetError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SheetError::property(key, "expected a string"))
}

fn as_bool(key: &str, value: &Value) -> Result<bool, SheetError> {
    value
        .as_bool()
        .ok_or_else(|| SheetError::property(key, "expected a boolean"))
}

/// Timestamps are RFC 3339 strings or Unix epoch seconds.
fn as_datetime(key: &str, value: &Value) -> Result<DateTime<Utc>, SheetError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SheetError::property(key, format!("invalid RFC 3339 timestamp: {e}"))),
        Value::Number(n) => n
            .as_i64()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .ok_or_else(|| SheetError::property(key, "invalid epoch timestamp")),
        _ => Err(SheetError::property(
            key,
            "expected an RFC 3339 string or epoch seconds",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn apply_json(book: &mut Book, properties: Value) -> Result<RenderParameters, SheetError> {
        let mut parameters = RenderParameters::default();
        let map = properties.as_object().cloned().unwrap_or_default();
        apply(book, &mut parameters, &map)?;
        Ok(parameters)
    }

    #[test]
    fn test_metadata_properties_mutate_book() {
        let mut book = Book::new();
        apply_json(
            &mut book,
            json!({
                "creator": "reporting-service",
                "title": "Q3 Totals",
                "company": "ACME",
                "keywords": "totals, q3",
            }),
        )
        .unwrap();

        let meta = book.metadata();
        assert_eq!(meta.creator.as_deref(), Some("reporting-service"));
        assert_eq!(meta.title.as_deref(), Some("Q3 Totals"));
        assert_eq!(meta.company.as_deref(), Some("ACME"));
        assert_eq!(meta.keywords.as_deref(), Some("totals, q3"));
    }

    #[test]
    fn test_format_and_template_become_parameters() {
        let mut book = Book::new();
        let parameters = apply_json(
            &mut book,
            json!({"format": "csv", "template": "@reports/base.xlsx"}),
        )
        .unwrap();

        assert_eq!(parameters.format.as_deref(), Some("csv"));
        assert_eq!(parameters.template.as_deref(), Some("@reports/base.xlsx"));
    }

    #[test]
    fn test_security_properties_are_nested() {
        let mut book = Book::new();
        apply_json(
            &mut book,
            json!({
                "security": {
                    "lock_structure": true,
                    "workbook_password": "secret",
                }
            }),
        )
        .unwrap();

        assert!(book.security().lock_structure);
        assert!(!book.security().lock_revision);
        assert_eq!(book.security().workbook_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_default_style_deserializes() {
        let mut book = Book::new();
        apply_json(
            &mut book,
            json!({"default_style": {"font_name": "Helvetica", "font_size": 11.0}}),
        )
        .unwrap();

        assert_eq!(book.default_style().font_name.as_deref(), Some("Helvetica"));
        assert_eq!(book.default_style().font_size, Some(11.0));
    }

    #[test]
    fn test_timestamps_accept_rfc3339_and_epoch() {
        let mut book = Book::new();
        apply_json(
            &mut book,
            json!({"created": "2024-03-01T12:00:00Z", "modified": 1_709_300_000}),
        )
        .unwrap();

        assert_eq!(
            book.metadata().created,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(book.metadata().modified.timestamp(), 1_709_300_000);
    }

    #[test]
    fn test_wrong_value_type_is_a_property_error() {
        let mut book = Book::new();
        let result = apply_json(&mut book, json!({"title": 42}));
        assert!(matches!(
            result,
            Err(SheetError::Property { key, .. }) if key == "title"
        ));

        let result = apply_json(&mut book, json!({"security": {"lock_windows": "yes"}}));
        assert!(matches!(
            result,
            Err(SheetError::Property { key, .. }) if key == "lock_windows"
        ));
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let mut book = Book::new();
        // Must not error; the unknown key is logged and ignored.
        apply_json(&mut book, json!({"no_such_property": 1, "title": "kept"})).unwrap();
        assert_eq!(book.metadata().title.as_deref(), Some("kept"));
    }
}
