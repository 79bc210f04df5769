//! Field exclusion for list results.
//!
//! Items are serialized to a generic JSON value, stripped of the excluded
//! keys and decoded back into records. Working on the generic form means the
//! filter never needs to know a collection's schema.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::records::query::QueryParams;

/// One schema-less record: field name to JSON value, in insertion order.
pub type Record = serde_json::Map<String, Value>;

/// Query parameter carrying the comma-separated excluded fields.
pub const EXCLUDED_PARAM: &str = "excluded";

#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("data should be a list of records, got {found}")]
    TypeMismatch { found: &'static str },

    #[error("failed to convert records: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Field names to remove from every record of one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    /// Split `raw` on `,` without trimming.
    pub fn parse(raw: &str) -> Self {
        Self(raw.split(',').map(str::to_string).collect())
    }

    /// The set requested by the `excluded` query parameter, if present and non-empty.
    pub fn from_query(query: &QueryParams) -> Option<Self> {
        query
            .get(EXCLUDED_PARAM)
            .filter(|raw| !raw.is_empty())
            .map(Self::parse)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Remove `fields` from every record in `items`.
///
/// `items` must serialize to a JSON array of objects. Record order and the
/// order of the remaining fields are preserved; absent fields are ignored.
pub fn exclude_fields<T>(items: &T, fields: &ExclusionSet) -> Result<Vec<Record>, ExcludeError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(items)?;
    if !value.is_array() {
        return Err(ExcludeError::TypeMismatch { found: shape(&value) });
    }

    let mut records: Vec<Record> = serde_json::from_value(value)?;
    for record in &mut records {
        for field in fields.iter() {
            // shift_remove keeps the order of the remaining keys.
            record.shift_remove(field);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_removes_named_field_keeping_order() {
        let items = records(json!([{"a": 1, "b": 2, "c": 3}]));
        let result = exclude_fields(&items, &ExclusionSet::parse("b")).unwrap();

        assert_eq!(result, records(json!([{"a": 1, "c": 3}])));
        let keys: Vec<_> = result[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_absent_field_is_noop() {
        let items = records(json!([{"a": 1}, {"a": 2}]));
        let result = exclude_fields(&items, &ExclusionSet::parse("z")).unwrap();
        assert_eq!(result, items);
    }

    #[test]
    fn test_applies_uniformly_to_every_record() {
        let items = records(json!([
            {"id": "1", "title": "one", "secret": "x"},
            {"id": "2", "secret": "y", "title": "two"},
            {"id": "3", "title": "three"},
        ]));
        let result = exclude_fields(&items, &ExclusionSet::parse("secret,id")).unwrap();

        assert_eq!(
            result,
            records(json!([{"title": "one"}, {"title": "two"}, {"title": "three"}]))
        );
    }

    #[test]
    fn test_single_object_is_type_mismatch() {
        let object = json!({"a": 1});
        let err = exclude_fields(&object, &ExclusionSet::parse("a")).unwrap_err();
        assert!(matches!(err, ExcludeError::TypeMismatch { found: "object" }));
        assert_eq!(err.to_string(), "data should be a list of records, got object");

        let err = exclude_fields("text", &ExclusionSet::parse("a")).unwrap_err();
        assert!(matches!(err, ExcludeError::TypeMismatch { found: "string" }));
    }

    #[test]
    fn test_non_object_element_fails() {
        let items = json!([{"a": 1}, 7]);
        let err = exclude_fields(&items, &ExclusionSet::parse("a")).unwrap_err();
        assert!(matches!(err, ExcludeError::Serialization(_)));
    }

    #[test]
    fn test_idempotent() {
        let items = records(json!([{"a": 1, "b": {"nested": true}, "c": [1, 2]}]));
        let fields = ExclusionSet::parse("b,c");

        let once = exclude_fields(&items, &fields).unwrap();
        let twice = exclude_fields(&once, &fields).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_typed_items() {
        #[derive(Serialize)]
        struct Post {
            id: u32,
            title: &'static str,
            author_email: &'static str,
        }

        let posts = vec![
            Post { id: 1, title: "hello", author_email: "a@example.com" },
            Post { id: 2, title: "world", author_email: "b@example.com" },
        ];
        let result = exclude_fields(&posts, &ExclusionSet::parse("author_email")).unwrap();

        assert_eq!(
            result,
            records(json!([{"id": 1, "title": "hello"}, {"id": 2, "title": "world"}]))
        );
    }

    #[test]
    fn test_empty_list() {
        let items: Vec<Record> = Vec::new();
        assert!(exclude_fields(&items, &ExclusionSet::parse("a")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_splits_literally() {
        let fields = ExclusionSet::parse("a, b,,c");
        let parsed: Vec<_> = fields.iter().collect();
        assert_eq!(parsed, vec!["", " b", "a", "c"]);
        assert!(!fields.contains("b"));
    }

    #[test]
    fn test_from_query() {
        assert_eq!(ExclusionSet::from_query(&QueryParams::default()), None);

        let empty = QueryParams::from_iter([(EXCLUDED_PARAM, "")]);
        assert_eq!(ExclusionSet::from_query(&empty), None);

        let query = QueryParams::from_iter([(EXCLUDED_PARAM, "a,b")]);
        assert_eq!(
            ExclusionSet::from_query(&query),
            Some(ExclusionSet::from_iter(["a", "b"]))
        );
    }

    #[test]
    fn test_from_query_uses_first_value() {
        let query = QueryParams::from_iter([(EXCLUDED_PARAM, "a"), (EXCLUDED_PARAM, "b")]);
        assert_eq!(
            ExclusionSet::from_query(&query),
            Some(ExclusionSet::from_iter(["a"]))
        );

        // An empty first value disables the filter even if a later one is set.
        let query = QueryParams::from_iter([(EXCLUDED_PARAM, ""), (EXCLUDED_PARAM, "b")]);
        assert_eq!(ExclusionSet::from_query(&query), None);
    }
}
