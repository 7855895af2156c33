//! Client entity: builder, outbound payload and tolerant response decoding.
use super::date::{self, DateFormat};
use super::error::{Error, Result};
use super::json::{self, CodeValue, Fields, Payload};
use super::timeline::{EventKind, Timeline};
use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Client {
    office_id: i64,
    group_id: Option<i64>,
    external_id: Option<String>,
    account_no: Option<String>,
    staff_id: Option<i64>,
    mobile_no: Option<String>,
    savings_product_id: Option<i64>,
    gender_id: Option<i64>,
    client_type_id: Option<i64>,
    client_classification_id: Option<i64>,
    fullname: Option<String>,
    firstname: Option<String>,
    middlename: Option<String>,
    lastname: Option<String>,
    active: bool,
    activation_date: Option<NaiveDate>,
    submitted_on_date: Option<NaiveDate>,
    date_of_birth: Option<NaiveDate>,
    date_format: Option<DateFormat>,
    // server assigned
    id: Option<i64>,
    display_name: Option<String>,
    status: Option<CodeValue>,
    gender: Option<CodeValue>,
    client_type: Option<CodeValue>,
    client_classification: Option<CodeValue>,
    office_name: Option<String>,
    staff_name: Option<String>,
    group_ids: Vec<i64>,
    timeline: Option<Timeline>,
}

#[derive(Debug, Default)]
pub struct ClientBuilder {
    office_id: Option<i64>,
    group_id: Option<i64>,
    external_id: Option<String>,
    account_no: Option<String>,
    staff_id: Option<i64>,
    mobile_no: Option<String>,
    savings_product_id: Option<i64>,
    gender_id: Option<i64>,
    client_type_id: Option<i64>,
    client_classification_id: Option<i64>,
    fullname: Option<String>,
    firstname: Option<String>,
    middlename: Option<String>,
    lastname: Option<String>,
    active: bool,
    activation_date: Option<String>,
    submitted_on_date: Option<String>,
    date_of_birth: Option<String>,
    date_format: Option<String>,
    locale: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn office_id(mut self, office_id: i64) -> Self {
        self.office_id = Some(office_id);
        self
    }
    pub fn group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
    pub fn account_no(mut self, account_no: impl Into<String>) -> Self {
        self.account_no = Some(account_no.into());
        self
    }
    pub fn staff_id(mut self, staff_id: i64) -> Self {
        self.staff_id = Some(staff_id);
        self
    }
    pub fn mobile_no(mut self, mobile_no: impl Into<String>) -> Self {
        self.mobile_no = Some(mobile_no.into());
        self
    }
    pub fn savings_product_id(mut self, product_id: i64) -> Self {
        self.savings_product_id = Some(product_id);
        self
    }
    pub fn gender_id(mut self, gender_id: i64) -> Self {
        self.gender_id = Some(gender_id);
        self
    }
    pub fn client_type_id(mut self, client_type_id: i64) -> Self {
        self.client_type_id = Some(client_type_id);
        self
    }
    pub fn client_classification_id(mut self, classification_id: i64) -> Self {
        self.client_classification_id = Some(classification_id);
        self
    }
    pub fn fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }
    pub fn firstname(mut self, firstname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self
    }
    pub fn middlename(mut self, middlename: impl Into<String>) -> Self {
        self.middlename = Some(middlename.into());
        self
    }
    pub fn lastname(mut self, lastname: impl Into<String>) -> Self {
        self.lastname = Some(lastname.into());
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
    pub fn date_of_birth(mut self, date: impl Into<String>) -> Self {
        self.date_of_birth = Some(date.into());
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

    pub fn build(self) -> Result<Client> {
        let office_id = self.office_id.ok_or_else(|| Error::missing("officeId"))?;
        json::check_external_id(self.external_id.as_deref())?;

        if self.active && self.activation_date.is_none() {
            return Err(Error::InvalidArgument(
                "an active client requires an activationDate".into(),
            ));
        }
        // an inactive client never carries an activation date
        let activation_date = self.activation_date.filter(|_| self.active);

        let dates = [&activation_date, &self.submitted_on_date, &self.date_of_birth];
        let format = if dates.iter().any(|d| d.is_some()) {
            let pattern = self.date_format.ok_or_else(|| Error::missing("dateFormat"))?;
            let locale = self.locale.ok_or_else(|| Error::missing("locale"))?;
            for text in dates.into_iter().flatten() {
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

        Ok(Client {
            office_id,
            group_id: self.group_id,
            external_id: self.external_id,
            account_no: self.account_no,
            staff_id: self.staff_id,
            mobile_no: self.mobile_no,
            savings_product_id: self.savings_product_id,
            gender_id: self.gender_id,
            client_type_id: self.client_type_id,
            client_classification_id: self.client_classification_id,
            fullname: self.fullname,
            firstname: self.firstname,
            middlename: self.middlename,
            lastname: self.lastname,
            active: self.active,
            activation_date: parse(activation_date)?,
            submitted_on_date: parse(self.submitted_on_date)?,
            date_of_birth: parse(self.date_of_birth)?,
            date_format: format.clone(),
            ..Client::default()
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Resource id assigned by the server.
    pub fn id(&self) -> Option<i64> {
        self.id
    }
    pub fn office_id(&self) -> i64 {
        self.office_id
    }
    pub fn group_id(&self) -> Option<i64> {
        self.group_id
    }
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
    pub fn account_no(&self) -> Option<&str> {
        self.account_no.as_deref()
    }
    pub fn staff_id(&self) -> Option<i64> {
        self.staff_id
    }
    pub fn mobile_no(&self) -> Option<&str> {
        self.mobile_no.as_deref()
    }
    pub fn savings_product_id(&self) -> Option<i64> {
        self.savings_product_id
    }
    pub fn gender_id(&self) -> Option<i64> {
        self.gender_id
    }
    pub fn client_type_id(&self) -> Option<i64> {
        self.client_type_id
    }
    pub fn client_classification_id(&self) -> Option<i64> {
        self.client_classification_id
    }
    pub fn middlename(&self) -> Option<&str> {
        self.middlename.as_deref()
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn submitted_on_date(&self) -> Option<NaiveDate> {
        self.submitted_on_date
    }
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }
    pub fn date_format(&self) -> Option<&DateFormat> {
        self.date_format.as_ref()
    }
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
    pub fn status(&self) -> Option<&CodeValue> {
        self.status.as_ref()
    }
    pub fn gender(&self) -> Option<&CodeValue> {
        self.gender.as_ref()
    }
    pub fn client_type(&self) -> Option<&CodeValue> {
        self.client_type.as_ref()
    }
    pub fn client_classification(&self) -> Option<&CodeValue> {
        self.client_classification.as_ref()
    }
    pub fn office_name(&self) -> Option<&str> {
        self.office_name.as_deref()
    }
    pub fn staff_name(&self) -> Option<&str> {
        self.staff_name.as_deref()
    }
    pub fn group_ids(&self) -> &[i64] {
        &self.group_ids
    }
    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// `fullname` as sent, or the name parts joined with single spaces.
    pub fn full_name(&self) -> Option<String> {
        if let Some(fullname) = &self.fullname {
            return Some(fullname.clone());
        }
        let parts: Vec<&str> = [&self.firstname, &self.middlename, &self.lastname]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// `firstname`, else the first whitespace-separated word of `fullname`.
    pub fn first_name(&self) -> Option<String> {
        self.firstname.clone().or_else(|| {
            self.fullname
                .as_deref()
                .and_then(|f| f.split_whitespace().next())
                .map(str::to_owned)
        })
    }

    /// `lastname`, else the last word of a multi-word `fullname`.
    pub fn last_name(&self) -> Option<String> {
        self.lastname.clone().or_else(|| {
            let words: Vec<&str> = self.fullname.as_deref()?.split_whitespace().collect();
            match words.as_slice() {
                [_, .., last] => Some((*last).to_owned()),
                _ => None,
            }
        })
    }

    /// The activation recorded on the timeline, else the decoded or input date.
    pub fn activation_date(&self) -> Option<NaiveDate> {
        self.timeline
            .as_ref()
            .and_then(|t| t.date_of(EventKind::Activated))
            .or(self.activation_date)
    }

    pub fn to_json(&self) -> Result<Value> {
        json::check_external_id(self.external_id.as_deref())?;

        let mut payload = Payload::new();
        payload.put("officeId", self.office_id);

        match self.fullname.as_deref() {
            Some(fullname) if !fullname.trim().is_empty() => {
                payload.put("fullname", fullname);
            }
            _ => {
                let firstname = json::non_empty(self.firstname.as_deref(), "firstname or fullname")?;
                let lastname = json::non_empty(self.lastname.as_deref(), "lastname or fullname")?;
                payload
                    .put("firstname", firstname)
                    .put_opt("middlename", self.middlename.as_deref())
                    .put("lastname", lastname);
            }
        }

        // Only the first of these is sent, mirroring the platform's
        // single-purpose client commands.
        if let Some(group_id) = self.group_id {
            payload.put("groupId", group_id);
        } else if let Some(external_id) = &self.external_id {
            payload.put("externalId", external_id.as_str());
        } else if let Some(account_no) = &self.account_no {
            payload.put("accountNo", account_no.as_str());
        } else if let Some(staff_id) = self.staff_id {
            payload.put("staffId", staff_id);
        } else if let Some(mobile_no) = &self.mobile_no {
            payload.put("mobileNo", mobile_no.as_str());
        } else if let Some(product_id) = self.savings_product_id {
            payload.put("savingsProductId", product_id);
        } else if let Some(gender_id) = self.gender_id {
            payload.put("genderId", gender_id);
        } else if let Some(type_id) = self.client_type_id {
            payload.put("clientTypeId", type_id);
        } else if let Some(classification_id) = self.client_classification_id {
            payload.put("clientClassificationId", classification_id);
        }

        payload.put("active", self.active);
        if self.active {
            match (self.activation_date, &self.date_format) {
                (Some(date), Some(format)) => {
                    payload.put_date("activationDate", date, format)?;
                }
                _ => {
                    return Err(Error::InvalidArgument(
                        "an active client requires activationDate, dateFormat and locale".into(),
                    ));
                }
            }
        }
        self.put_optional_date(&mut payload, "submittedOnDate", self.submitted_on_date)?;
        self.put_optional_date(&mut payload, "dateOfBirth", self.date_of_birth)?;

        Ok(payload.into_value())
    }

    fn put_optional_date(&self, payload: &mut Payload, key: &str, date: Option<NaiveDate>) -> Result<()> {
        match (date, &self.date_format) {
            (Some(date), Some(format)) => {
                payload.put_date(key, date, format)?;
                Ok(())
            }
            (Some(_), None) => Err(Error::InvalidArgument(format!(
                "{key} requires dateFormat and locale"
            ))),
            (None, _) => Ok(()),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = Fields::new(value)?;
        let date_format = fields.date_format();
        let format = date_format.as_ref();

        let timeline = match fields.get("timeline") {
            Some(timeline) => Some(Timeline::from_json(timeline)?),
            None => None,
        };
        let group_ids = fields
            .array("groups")
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|g| g.get("id").and_then(Value::as_i64))
                    .collect()
            })
            .unwrap_or_default();

        let client = Client {
            office_id: fields.require_i64("officeId")?,
            group_id: fields.i64("groupId"),
            external_id: fields.str("externalId"),
            account_no: fields.str("accountNo"),
            staff_id: fields.i64("staffId"),
            mobile_no: fields.str("mobileNo"),
            savings_product_id: fields.i64("savingsProductId"),
            gender_id: fields.nested_id("gender").or_else(|| fields.i64("genderId")),
            client_type_id: fields
                .nested_id("clientType")
                .or_else(|| fields.i64("clientTypeId")),
            client_classification_id: fields
                .nested_id("clientClassification")
                .or_else(|| fields.i64("clientClassificationId")),
            fullname: fields.str("fullname"),
            firstname: fields.str("firstname"),
            middlename: fields.str("middlename"),
            lastname: fields.str("lastname"),
            active: fields.bool("active").unwrap_or(false),
            activation_date: fields.date("activationDate", format)?,
            submitted_on_date: fields.date("submittedOnDate", format)?,
            date_of_birth: fields.date("dateOfBirth", format)?,
            date_format,
            id: fields.first_i64(&["clientId", "id"]),
            display_name: fields.str("displayName"),
            status: CodeValue::read(&fields, "status"),
            gender: CodeValue::read(&fields, "gender"),
            client_type: CodeValue::read(&fields, "clientType"),
            client_classification: CodeValue::read(&fields, "clientClassification"),
            office_name: fields.str("officeName"),
            staff_name: fields.str("staffName"),
            group_ids,
            timeline,
        };
        tracing::debug!(id = ?client.id, office_id = client.office_id, "decoded client");
        Ok(client)
    }
}
