use super::date::{self, DateFormat};
use super::error::{Error, Result};
use super::json::{self, Fields, Payload};
use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Office {
    // input
    name: String,
    parent_id: Option<i64>,
    opening_date: Option<NaiveDate>,
    date_format: Option<DateFormat>,
    external_id: Option<String>,
    // server assigned
    id: Option<i64>,
    name_decorated: Option<String>,
    hierarchy: Option<String>,
    parent_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct OfficeBuilder {
    name: Option<String>,
    parent_id: Option<i64>,
    opening_date: Option<String>,
    date_format: Option<String>,
    locale: Option<String>,
    external_id: Option<String>,
}

impl OfficeBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn parent_id(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
    pub fn opening_date(mut self, date: impl Into<String>) -> Self {
        self.opening_date = Some(date.into());
        self
    }
    pub fn date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = Some(pattern.into());
        self
    }
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn build(self) -> Result<Office> {
        let name = json::non_empty(self.name.as_deref(), "name")?.to_owned();
        let parent_id = self.parent_id.ok_or_else(|| Error::missing("parentId"))?;
        let opening = self.opening_date.as_deref().ok_or_else(|| Error::missing("openingDate"))?;
        let pattern = self.date_format.ok_or_else(|| Error::missing("dateFormat"))?;
        let locale = self.locale.ok_or_else(|| Error::missing("locale"))?;
        date::validate_date(opening, &pattern, &locale)?;
        json::check_external_id(self.external_id.as_deref())?;

        let format = DateFormat::new(pattern, locale);
        Ok(Office {
            name,
            parent_id: Some(parent_id),
            opening_date: Some(format.parse(opening)?),
            date_format: Some(format),
            external_id: self.external_id,
            ..Office::default()
        })
    }
}

impl Office {
    pub fn builder() -> OfficeBuilder {
        OfficeBuilder::new()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
    pub fn opening_date(&self) -> Option<NaiveDate> {
        self.opening_date
    }
    pub fn date_format(&self) -> Option<&DateFormat> {
        self.date_format.as_ref()
    }
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
    pub fn name_decorated(&self) -> Option<&str> {
        self.name_decorated.as_deref()
    }
    pub fn hierarchy(&self) -> Option<&str> {
        self.hierarchy.as_deref()
    }
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    pub fn to_json(&self) -> Result<Value> {
        let name = json::non_empty(Some(&self.name), "name")?;
        json::check_external_id(self.external_id.as_deref())?;

        let mut payload = Payload::new();
        payload.put("name", name).put_opt("parentId", self.parent_id);
        match (self.opening_date, &self.date_format) {
            (Some(date), Some(format)) => {
                payload.put_date("openingDate", date, format)?;
            }
            (Some(_), None) => {
                return Err(Error::InvalidArgument(
                    "openingDate requires dateFormat and locale".into(),
                ));
            }
            (None, _) => return Err(Error::missing("openingDate")),
        }
        payload.put_opt("externalId", self.external_id.as_deref());

        Ok(payload.into_value())
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = Fields::new(value)?;
        let date_format = fields.date_format();

        let office = Office {
            name: fields.require_str("name")?,
            parent_id: fields.i64("parentId"),
            opening_date: fields.date("openingDate", date_format.as_ref())?,
            date_format,
            external_id: fields.str("externalId"),
            id: fields.i64("id"),
            name_decorated: fields.str("nameDecorated"),
            hierarchy: fields.str("hierarchy"),
            parent_name: fields.str("parentName"),
        };
        tracing::debug!(id = ?office.id, "decoded office");
        Ok(office)
    }
}
