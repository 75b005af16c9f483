//! Request parameter normalization
//!
//! Callers hand repositories whatever shape they have at hand: a JSON body, a
//! typed request struct, a list, or nothing at all. [`Parameters`] turns each
//! side into a plain key/value mapping so the CRUD verbs and scope hooks only
//! ever see one shape.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Key/value mapping used for payloads, options and match conditions
pub type Fields = Map<String, Value>;

/// Page size used by `get_list` when `options.paginate` is blank
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Normalized `{data, options}` pair
///
/// Both sides are always mappings. Unrecognized input degrades to an empty
/// mapping; construction never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    data: Fields,
    options: Fields,
}

impl Parameters {
    /// Normalize raw `data` and `options`
    pub fn new<D, O>(data: D, options: O) -> Self
    where
        D: Serialize,
        O: Serialize,
    {
        Self {
            data: normalize(&data),
            options: normalize(&options),
        }
    }

    /// Build from mappings that are already normalized
    pub fn from_fields(data: Fields, options: Fields) -> Self {
        Self { data, options }
    }

    /// Value of `key` in data, `None` when absent or null
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.data, key)
    }

    /// Value of `key` in options, `None` when absent or null
    pub fn option(&self, key: &str) -> Option<&Value> {
        lookup(&self.options, key)
    }

    /// Whole data mapping, `None` when empty
    pub fn data(&self) -> Option<&Fields> {
        (!self.data.is_empty()).then_some(&self.data)
    }

    /// Whole options mapping, `None` when empty
    pub fn options(&self) -> Option<&Fields> {
        (!self.options.is_empty()).then_some(&self.options)
    }

    pub fn data_or_empty(&self) -> &Fields {
        &self.data
    }

    pub fn options_or_empty(&self) -> &Fields {
        &self.options
    }

    /// Both sides as `{"data": .., "options": ..}`, empty sides rendered as null
    pub fn all(&self) -> Value {
        json!({
            "data": self.data().cloned().map(Value::Object).unwrap_or(Value::Null),
            "options": self.options().cloned().map(Value::Object).unwrap_or(Value::Null),
        })
    }

    /// Page size requested through `options.paginate`
    ///
    /// Falls back to `default` when the option is blank or is not a positive
    /// integer. Fractional sizes such as `10.7` are rejected, never truncated.
    pub fn page_size(&self, default: u64) -> u64 {
        self.option("paginate")
            .filter(|value| !is_blank(value))
            .and_then(positive_integer)
            .unwrap_or(default)
    }

    /// One-based page number requested through `options.page`
    pub fn page(&self) -> u64 {
        self.option("page").and_then(positive_integer).unwrap_or(1)
    }
}

/// Coerce any serializable value into a mapping
///
/// Objects pass through, arrays are keyed by their decimal index, everything
/// else (null, scalars, values that fail to serialize) becomes empty.
pub fn normalize<T: Serialize + ?Sized>(raw: &T) -> Fields {
    match serde_json::to_value(raw) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Fields::new(),
    }
}

/// Whether a value counts as empty: null, false, zero, "", "0", [] or {}
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn lookup<'a>(fields: &'a Fields, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    fields.get(key).filter(|value| !value.is_null())
}

fn positive_integer(value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| *f >= 1.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct UpdateRequest {
        name: String,
        status: &'static str,
    }

    #[test]
    fn objects_pass_through() {
        let params = Parameters::new(json!({"name": "a"}), json!({"id": 7}));
        assert_eq!(params.get("name"), Some(&json!("a")));
        assert_eq!(params.option("id"), Some(&json!(7)));
    }

    #[test]
    fn structs_become_mappings() {
        let request = UpdateRequest {
            name: "x".to_string(),
            status: "draft",
        };
        let params = Parameters::new(&request, ());
        assert_eq!(params.get("status"), Some(&json!("draft")));
        assert_eq!(params.data().map(Fields::len), Some(2));
        assert!(params.options().is_none());
    }

    #[test]
    fn maps_and_lists_keep_their_keys() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        let params = Parameters::new(map, vec!["first", "second"]);
        assert_eq!(params.get("a"), Some(&json!(1)));
        assert_eq!(params.option("0"), Some(&json!("first")));
        assert_eq!(params.option("1"), Some(&json!("second")));
    }

    #[test]
    fn scalars_and_null_become_empty() {
        let params = Parameters::new(42, "text");
        assert!(params.data().is_none());
        assert!(params.options().is_none());

        let params = Parameters::new(Option::<Fields>::None, Value::Null);
        assert_eq!(params.all(), json!({"data": null, "options": null}));
    }

    #[test]
    fn null_values_and_empty_keys_read_as_absent() {
        let params = Parameters::new(json!({"name": null, "": 1}), ());
        assert_eq!(params.get("name"), None);
        assert_eq!(params.get(""), None);
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn blank_values_follow_empty_semantics() {
        for blank in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(is_blank(&blank), "{blank} should be blank");
        }
        for filled in [json!(true), json!(1), json!("a"), json!([0]), json!({"a": null})] {
            assert!(!is_blank(&filled), "{filled} should not be blank");
        }
    }

    #[test]
    fn page_size_defaults_unless_positive() {
        let default = DEFAULT_PAGE_SIZE;
        assert_eq!(Parameters::new((), ()).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": 0})).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": ""})).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": -5})).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": "abc"})).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": 10})).page_size(default), 10);
        assert_eq!(Parameters::new((), json!({"paginate": "15"})).page_size(default), 15);
        assert_eq!(Parameters::new((), json!({"paginate": 12.0})).page_size(default), 12);
        assert_eq!(Parameters::new((), json!({"paginate": 10.7})).page_size(default), 20);
        assert_eq!(Parameters::new((), json!({"paginate": "10.7"})).page_size(default), 20);
    }

    #[test]
    fn page_defaults_to_first() {
        assert_eq!(Parameters::new((), ()).page(), 1);
        assert_eq!(Parameters::new((), json!({"page": 3})).page(), 3);
        assert_eq!(Parameters::new((), json!({"page": 0})).page(), 1);
    }
}
