use super::client::Client;
use super::date::{self, DateFormat};
use super::error::{Error, Result};
use super::json::{self, CodeValue, Fields, Payload};
use super::timeline::{EventKind, Timeline};
use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    office_id: i64,
    name: String,
    external_id: Option<String>,
    staff_id: Option<i64>,
    active: bool,
    activation_date: Option<NaiveDate>,
    submitted_on_date: Option<NaiveDate>,
    date_format: Option<DateFormat>,
    client_members: Vec<i64>,
    // server assigned
    id: Option<i64>,
    status: Option<CodeValue>,
    office_name: Option<String>,
    staff_name: Option<String>,
    hierarchy: Option<String>,
    members: Vec<Client>,
    timeline: Option<Timeline>,
}

#[derive(Debug, Default)]
pub struct GroupBuilder {
    office_id: Option<i64>,
    name: Option<String>,
    external_id: Option<String>,
    staff_id: Option<i64>,
    active: bool,
    activation_date: Option<String>,
    submitted_on_date: Option<String>,
    date_format: Option<String>,
    locale: Option<String>,
    client_members: Vec<i64>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn office_id(mut self, office_id: i64) -> Self {
        self.office_id = Some(office_id);
        self
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
    pub fn staff_id(mut self, staff_id: i64) -> Self {
        self.staff_id = Some(staff_id);
        self
    }
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
    pub fn activation_date(mut self, date: impl Into<String>) -> Self {
        self.activation_date = Some(date.into());
        self
    }
    pub fn submitted_on_date(mut self, date: impl Into<String>) -> Self {
        self.submitted_on_date = Some(date.into());
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
    pub fn client_member(mut self, client_id: i64) -> Self {
        self.client_members.push(client_id);
        self
    }
    pub fn client_members(mut self, client_ids: impl IntoIterator<Item = i64>) -> Self {
        self.client_members.extend(client_ids);
        self
    }

    pub fn build(self) -> Result<Group> {
        let office_id = self.office_id.ok_or_else(|| Error::missing("officeId"))?;
        let name = json::non_empty(self.name.as_deref(), "name")?.to_owned();
        json::check_external_id(self.external_id.as_deref())?;

        if self.active && self.activation_date.is_none() {
            return Err(Error::InvalidArgument(
                "an active group requires an activationDate".into(),
            ));
        }
        let activation_date = self.activation_date.filter(|_| self.active);

        let format = if activation_date.is_some() || self.submitted_on_date.is_some() {
            let pattern = self.date_format.ok_or_else(|| Error::missing("dateFormat"))?;
            let locale = self.locale.ok_or_else(|| Error::missing("locale"))?;
            for text in [&activation_date, &self.submitted_on_date].into_iter().flatten() {
                date::validate_date(text, &pattern, &locale)?;
            }
            Some(DateFormat::new(pattern, locale))
        } else {
            None
        };
        let parse = |text: Option<String>| -> Result<Option<NaiveDate>> {
            match (text, &format) {
                (Some(text), Some(format)) => format.parse(&text).map(Some),
                _ => Ok(None),
            }
        };

        Ok(Group {
            office_id,
            name,
            external_id: self.external_id,
            staff_id: self.staff_id,
            active: self.active,
            activation_date: parse(activation_date)?,
            submitted_on_date: parse(self.submitted_on_date)?,
            date_format: format.clone(),
            client_members: self.client_members,
            ..Group::default()
        })
    }
}

impl Group {
    pub fn builder() -> GroupBuilder {
        GroupBuilder::new()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }
    pub fn office_id(&self) -> i64 {
        self.office_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
    pub fn staff_id(&self) -> Option<i64> {
        self.staff_id
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn submitted_on_date(&self) -> Option<NaiveDate> {
        self.submitted_on_date
    }
    pub fn client_members(&self) -> &[i64] {
        &self.client_members
    }
    pub fn status(&self) -> Option<&CodeValue> {
        self.status.as_ref()
    }
    pub fn office_name(&self) -> Option<&str> {
        self.office_name.as_deref()
    }
    pub fn staff_name(&self) -> Option<&str> {
        self.staff_name.as_deref()
    }
    pub fn hierarchy(&self) -> Option<&str> {
        self.hierarchy.as_deref()
    }
    /// Member clients, when the response carried them as objects.
    pub fn members(&self) -> &[Client] {
        &self.members
    }
    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Timeline activation if one was decoded, else the input date.
    pub fn activation_date(&self) -> Option<NaiveDate> {
        match &self.timeline {
            Some(timeline) => timeline.date_of(EventKind::Activated),
            None => self.activation_date,
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        let name = json::non_empty(Some(&self.name), "name")?;
        json::check_external_id(self.external_id.as_deref())?;

        let mut payload = Payload::new();
        payload
            .put("officeId", self.office_id)
            .put("name", name)
            .put_opt("externalId", self.external_id.as_deref())
            .put_opt("staffId", self.staff_id)
            .put("active", self.active);
        if self.active {
            match (self.activation_date, &self.date_format) {
                (Some(date), Some(format)) => {
                    payload.put_date("activationDate", date, format)?;
                }
                _ => {
                    return Err(Error::InvalidArgument(
                        "an active group requires activationDate, dateFormat and locale".into(),
                    ));
                }
            }
        }
        match (self.submitted_on_date, &self.date_format) {
            (Some(date), Some(format)) => {
                payload.put_date("submittedOnDate", date, format)?;
            }
            (Some(_), None) => {
                return Err(Error::InvalidArgument(
                    "submittedOnDate requires dateFormat and locale".into(),
                ));
            }
            (None, _) => {}
        }
        if !self.client_members.is_empty() {
            payload.put("clientMembers", self.client_members.clone());
        }

        Ok(payload.into_value())
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = Fields::new(value)?;
        let date_format = fields.date_format();
        let format = date_format.as_ref();

        let timeline = match fields.get("timeline") {
            Some(timeline) => Some(Timeline::from_json(timeline)?),
            None => None,
        };

        // members arrive as ids in echoed payloads and as client objects
        // in responses
        let mut client_members = Vec::new();
        let mut members = Vec::new();
        for member in fields.array("clientMembers").into_iter().flatten() {
            match member {
                Value::Object(_) => members.push(Client::from_json(member)?),
                other => {
                    let id = other.as_i64().ok_or_else(|| {
                        Error::Decode(format!("clientMembers entry {other} is not an id"))
                    })?;
                    client_members.push(id);
                }
            }
        }

        let group = Group {
            office_id: fields.require_i64("officeId")?,
            name: fields.str("name").unwrap_or_default(),
            external_id: fields.str("externalId"),
            staff_id: fields.i64("staffId"),
            active: fields.bool("active").unwrap_or(false),
            activation_date: fields.date("activationDate", format)?,
            submitted_on_date: fields.date("submittedOnDate", format)?,
            date_format,
            client_members,
            id: fields.i64("id"),
            status: CodeValue::read(&fields, "status"),
            office_name: fields.str("officeName"),
            staff_name: fields.str("staffName"),
            hierarchy: fields.str("hierarchy"),
            members,
            timeline,
        };
        tracing::debug!(id = ?group.id, members = group.members.len(), "decoded group");
        Ok(group)
    }
}
