//! Tolerant field access over server JSON and an insertion-ordered payload
//! writer. Every entity encoder/decoder is written against these two types.
use super::date::{self, DateFormat};
use super::error::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Read-only view over a JSON object. Absent or `null` keys read as `None`.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value) -> Result<Self> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or_else(|| Error::Decode(format!("expected a JSON object, got {value}")))
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_owned)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| match v {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        })
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn object(&self, key: &str) -> Option<Fields<'a>> {
        self.get(key)
            .and_then(Value::as_object)
            .map(|map| Fields { map })
    }

    pub fn array(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// `key.id` of a nested reference object.
    pub fn nested_id(&self, key: &str) -> Option<i64> {
        self.object(key).and_then(|o| o.i64("id"))
    }

    /// First key in `keys` carrying an integer.
    pub fn first_i64(&self, keys: &[&str]) -> Option<i64> {
        keys.iter().find_map(|k| self.i64(k))
    }

    pub fn require_i64(&self, key: &str) -> Result<i64> {
        self.i64(key)
            .ok_or_else(|| Error::Decode(format!("required field `{key}` is missing")))
    }

    pub fn require_str(&self, key: &str) -> Result<String> {
        self.str(key)
            .ok_or_else(|| Error::Decode(format!("required field `{key}` is missing")))
    }

    /// The date/format pair echoed back in an encoded payload, if both are
    /// present.
    pub fn date_format(&self) -> Option<DateFormat> {
        match (self.str("dateFormat"), self.str("locale")) {
            (Some(pattern), Some(locale)) => Some(DateFormat::new(pattern, locale)),
            _ => None,
        }
    }

    /// Reads a date that is either a `[y, m, d]` array (server responses)
    /// or a formatted string paired with `format` (echoed request payloads).
    pub fn date(&self, key: &str, format: Option<&DateFormat>) -> Result<Option<NaiveDate>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match (value, format) {
            (Value::String(text), Some(format)) => format.parse(text),
            (Value::String(text), None) => Err(Error::InvalidDate(format!(
                "`{key}` is the string `{text}` but no dateFormat/locale was sent"
            ))),
            (other, _) => date::decode_date_array(other),
        };
        parsed
            .map(Some)
            .map_err(|e| Error::Decode(format!("`{key}`: {e}")))
    }
}

/// A nested reference object (`status`, `gender`, `clientType`). The
/// platform labels it with `name` or, for enum options, `value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "CodeValueBody")]
pub struct CodeValue {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct CodeValueBody {
    id: Option<i64>,
    code: Option<String>,
    name: Option<String>,
    value: Option<String>,
}

impl From<CodeValueBody> for CodeValue {
    fn from(body: CodeValueBody) -> Self {
        Self {
            id: body.id,
            code: body.code,
            name: body.name.or(body.value),
        }
    }
}

impl CodeValue {
    /// The object under `key`, if present and shaped like a code value.
    pub fn read(fields: &Fields<'_>, key: &str) -> Option<Self> {
        let value = fields.get(key)?;
        match CodeValue::deserialize(value) {
            Ok(code_value) => Some(code_value),
            Err(e) => {
                tracing::debug!(key, error = %e, "skipping malformed code value");
                None
            }
        }
    }
}

/// Outbound JSON object. Keys are kept in insertion order.
#[derive(Debug, Default)]
pub struct Payload {
    map: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key.to_owned(), value.into());
        self
    }

    pub fn put_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.put(key, value);
        }
        self
    }

    /// Emits `key` formatted with `format`, plus `dateFormat` and `locale`.
    pub fn put_date(&mut self, key: &str, date: NaiveDate, format: &DateFormat) -> Result<&mut Self> {
        let text = format.format(date)?;
        self.put(key, text);
        self.put("dateFormat", format.pattern.as_str());
        self.put("locale", format.locale.as_str());
        Ok(self)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }
}

pub(crate) const MAX_EXTERNAL_ID: usize = 100;

pub(crate) fn check_external_id(external_id: Option<&str>) -> Result<()> {
    match external_id {
        Some(id) if id.chars().count() > MAX_EXTERNAL_ID => Err(Error::InvalidArgument(format!(
            "externalId is longer than {MAX_EXTERNAL_ID} characters"
        ))),
        _ => Ok(()),
    }
}

/// Requires `value` to be present and non-blank.
pub(crate) fn non_empty<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::missing(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_and_null_read_as_none() {
        let value = json!({ "name": null, "id": 4 });
        let fields = Fields::new(&value).unwrap();

        assert_eq!(fields.str("name"), None);
        assert_eq!(fields.str("missing"), None);
        assert_eq!(fields.i64("id"), Some(4));
        assert!(fields.require_i64("officeId").is_err());
    }

    #[test]
    fn code_value_accepts_name_or_value() {
        let value = json!({
            "status": { "id": 300, "code": "clientStatusType.active", "value": "Active" },
            "gender": { "id": 22, "name": "Female" },
            "clientType": { "id": 9 }
        });
        let fields = Fields::new(&value).unwrap();

        let status = CodeValue::read(&fields, "status").unwrap();
        assert_eq!(status.name.as_deref(), Some("Active"));
        assert_eq!(status.code.as_deref(), Some("clientStatusType.active"));
        assert_eq!(CodeValue::read(&fields, "gender").unwrap().name.as_deref(), Some("Female"));
        assert_eq!(CodeValue::read(&fields, "clientType").unwrap().id, Some(9));
        assert_eq!(fields.nested_id("gender"), Some(22));
    }

    #[test]
    fn code_values_prefer_name_and_skip_bad_shapes() {
        let value = json!({
            "gender": { "id": 22, "name": "Female", "value": "F", "active": true },
            "status": "active",
            "clientType": { "id": "nine" }
        });
        let fields = Fields::new(&value).unwrap();

        assert_eq!(CodeValue::read(&fields, "gender").unwrap().name.as_deref(), Some("Female"));
        assert_eq!(CodeValue::read(&fields, "status"), None);
        assert_eq!(CodeValue::read(&fields, "clientType"), None);
        assert_eq!(CodeValue::read(&fields, "missing"), None);
    }

    #[test]
    fn first_i64_follows_key_order() {
        let value = json!({ "resourceId": 1, "id": 2 });
        let fields = Fields::new(&value).unwrap();

        assert_eq!(fields.first_i64(&["clientId", "id", "resourceId"]), Some(2));
    }

    #[test]
    fn dates_read_from_arrays_or_echoed_strings() {
        let value = json!({
            "a": [2020, 1, 31],
            "b": "31 January 2020",
            "c": [2020, 13, 1]
        });
        let fields = Fields::new(&value).unwrap();
        let format = DateFormat::default();
        let expected = NaiveDate::from_ymd_opt(2020, 1, 31);

        assert_eq!(fields.date("a", None).unwrap(), expected);
        assert_eq!(fields.date("b", Some(&format)).unwrap(), expected);
        assert!(matches!(fields.date("b", None), Err(Error::Decode(_))));
        assert!(matches!(fields.date("c", None), Err(Error::Decode(_))));
        assert_eq!(fields.date("missing", None).unwrap(), None);
    }

    #[test]
    fn payload_keeps_insertion_order() {
        let mut payload = Payload::new();
        payload.put("officeId", 1).put_opt::<i64>("groupId", None).put("active", false);

        assert_eq!(payload.into_value().to_string(), r#"{"officeId":1,"active":false}"#);
    }
}
