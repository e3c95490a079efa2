//! Field-by-field reading of a raw JSON object.
//!
//! Every accessor marks its key as consumed; [`ObjectReader::finish`] then
//! rejects whatever is left. A `null` value reads the same as an absent key.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::Entry;
use crate::error::{Result, ValidationError};

const NON_EMPTY_STRING: &str = "a non-empty string";

pub(crate) struct ObjectReader<'a> {
    prefix: String,
    map: &'a Map<String, Value>,
    consumed: Vec<&'static str>,
}

impl<'a> ObjectReader<'a> {
    /// Reader over the top-level intent. Anything but an object is rejected at `$`.
    pub fn root(value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::with_prefix(map, String::new())),
            _ => Err(ValidationError::mismatch("$", "an object")),
        }
    }

    fn with_prefix(map: &'a Map<String, Value>, prefix: String) -> Self {
        Self {
            prefix,
            map,
            consumed: Vec::new(),
        }
    }

    pub fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn take(&mut self, key: &'static str) -> Option<&'a Value> {
        self.consumed.push(key);
        self.map.get(key).filter(|value| !value.is_null())
    }

    /// Peek at a key without consuming it (used for the discriminant).
    pub fn peek(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn mark_consumed(&mut self, key: &'static str) {
        self.consumed.push(key);
    }

    pub fn required(&mut self, key: &'static str) -> Result<&'a Value> {
        let path = self.path(key);
        self.take(key).ok_or(ValidationError::MissingField { path })
    }

    pub fn nested(&mut self, key: &'static str) -> Result<Option<ObjectReader<'a>>> {
        let path = self.path(key);
        match self.take(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Self::with_prefix(map, format!("{path}.")))),
            Some(_) => Err(ValidationError::mismatch(path, "an object")),
        }
    }

    pub fn required_string(&mut self, key: &'static str) -> Result<String> {
        let value = self.required(key)?;
        non_empty_string(value, self.path(key))
    }

    pub fn string(&mut self, key: &'static str) -> Result<Option<String>> {
        let path = self.path(key);
        self.take(key)
            .map(|value| non_empty_string(value, path))
            .transpose()
    }

    /// Free-form string; empty is allowed.
    pub fn text(&mut self, key: &'static str) -> Result<Option<String>> {
        let path = self.path(key);
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ValidationError::mismatch(path, "a string")),
        }
    }

    pub fn bool(&mut self, key: &'static str) -> Result<Option<bool>> {
        let path = self.path(key);
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ValidationError::mismatch(path, "a boolean")),
        }
    }

    /// Integer within `min..=max`. Fractions and non-numbers are type errors,
    /// integers outside the bounds (including negatives) are range errors.
    pub fn integer_in(
        &mut self,
        key: &'static str,
        min: u64,
        max: u64,
        bounds: &'static str,
    ) -> Result<Option<u64>> {
        let path = self.path(key);
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let Value::Number(number) = value else {
            return Err(ValidationError::mismatch(path, "an integer"));
        };

        if let Some(n) = number.as_u64() {
            if (min..=max).contains(&n) {
                return Ok(Some(n));
            }
            return Err(ValidationError::out_of_range(path, n, bounds));
        }
        if let Some(n) = number.as_i64() {
            return Err(ValidationError::out_of_range(path, n, bounds));
        }
        // Integer literals beyond 64 bits arrive as floats.
        match number.as_f64() {
            Some(n) if n.fract() == 0.0 && (n >= u64::MAX as f64 || n < i64::MIN as f64) => {
                Err(ValidationError::out_of_range(path, number, bounds))
            }
            _ => Err(ValidationError::mismatch(path, "an integer")),
        }
    }

    pub fn string_list(&mut self, key: &'static str) -> Result<Option<Vec<String>>> {
        let path = self.path(key);
        self.take(key)
            .map(|value| string_array(value, &path))
            .transpose()
    }

    /// Object whose values are arrays of strings (`{"img-src": ["'self'"]}`).
    pub fn string_list_map(
        &mut self,
        key: &'static str,
    ) -> Result<Option<IndexMap<String, Vec<String>>>> {
        let path = self.path(key);
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let Value::Object(map) = value else {
            return Err(ValidationError::mismatch(path, "an object"));
        };

        let mut out = IndexMap::with_capacity(map.len());
        for (name, item) in map {
            let list = string_array(item, &format!("{path}.{name}"))?;
            out.insert(name.clone(), list);
        }
        Ok(Some(out))
    }

    /// Required entry: a module path, or a non-empty map of entry name to path.
    pub fn entry(&mut self, key: &'static str) -> Result<Entry> {
        let path = self.path(key);
        match self.required(key)? {
            value @ Value::String(_) => non_empty_string(value, path).map(Entry::Single),
            Value::Object(map) => {
                if map.is_empty() {
                    return Err(ValidationError::mismatch(path, "a non-empty object"));
                }
                let mut named = IndexMap::with_capacity(map.len());
                for (name, item) in map {
                    let target = non_empty_string(item, format!("{path}.{name}"))?;
                    named.insert(name.clone(), target);
                }
                Ok(Entry::Named(named))
            }
            _ => Err(ValidationError::mismatch(
                path,
                "a string or an object of entry paths",
            )),
        }
    }

    /// Reject any key no accessor asked for.
    pub fn finish(self) -> Result<()> {
        match self
            .map
            .keys()
            .find(|key| !self.consumed.iter().any(|seen| *seen == key.as_str()))
        {
            Some(key) => Err(ValidationError::unexpected(self.path(key))),
            None => Ok(()),
        }
    }
}

fn non_empty_string(value: &Value, path: String) -> Result<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::mismatch(path, NON_EMPTY_STRING)),
    }
}

fn string_array(value: &Value, path: &str) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(ValidationError::mismatch(path, "an array of strings"));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| non_empty_string(item, format!("{path}[{index}]")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_reads_as_absent() {
        let raw = json!({ "port": null });
        let mut reader = ObjectReader::root(&raw).unwrap();
        assert_eq!(reader.integer_in("port", 1, 10, "1..=10").unwrap(), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn fractional_numbers_are_type_errors() {
        let raw = json!({ "port": 3000.5 });
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.integer_in("port", 1024, 65535, "1024..=65535").unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn negative_numbers_are_range_errors() {
        let raw = json!({ "port": -1 });
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.integer_in("port", 1024, 65535, "1024..=65535").unwrap_err();
        assert_eq!(err, ValidationError::out_of_range("port", -1, "1024..=65535"));
    }

    #[test]
    fn integers_wider_than_64_bits_are_range_errors() {
        let raw: Value = serde_json::from_str(r#"{ "port": 18446744073709551616 }"#).unwrap();
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.integer_in("port", 1024, 65535, "1024..=65535").unwrap_err();
        assert!(
            matches!(&err, ValidationError::OutOfRange { path, .. } if path == "port"),
            "{err:?}"
        );

        let raw: Value = serde_json::from_str(r#"{ "port": -1e30 }"#).unwrap();
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.integer_in("port", 1024, 65535, "1024..=65535").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }), "{err:?}");

        let raw = json!({ "port": 3000.0 });
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.integer_in("port", 1024, 65535, "1024..=65535").unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }), "{err:?}");
    }

    #[test]
    fn nested_paths_are_dotted() {
        let raw = json!({ "pwa": { "name": "", "extra": 1 } });
        let mut reader = ObjectReader::root(&raw).unwrap();
        let mut pwa = reader.nested("pwa").unwrap().unwrap();
        let err = pwa.required_string("name").unwrap_err();
        assert_eq!(err.path(), Some("pwa.name"));
        assert_eq!(pwa.finish().unwrap_err(), ValidationError::unexpected("pwa.extra"));
    }

    #[test]
    fn list_elements_report_their_index() {
        let raw = json!({ "external": ["react", 3] });
        let mut reader = ObjectReader::root(&raw).unwrap();
        let err = reader.string_list("external").unwrap_err();
        assert_eq!(err.path(), Some("external[1]"));
    }
}
