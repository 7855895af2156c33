use super::date::{self, DateFormat};
use super::error::{Error, Result};
use super::json::{self, Fields, Payload};
use chrono::NaiveDate;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Staff {
    office_id: i64,
    firstname: String,
    lastname: String,
    external_id: Option<String>,
    mobile_no: Option<String>,
    is_loan_officer: bool,
    is_active: bool,
    joining_date: Option<NaiveDate>,
    date_format: Option<DateFormat>,
    // server assigned
    id: Option<i64>,
    display_name: Option<String>,
    office_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct StaffBuilder {
    office_id: Option<i64>,
    firstname: Option<String>,
    lastname: Option<String>,
    external_id: Option<String>,
    mobile_no: Option<String>,
    is_loan_officer: bool,
    is_active: bool,
    joining_date: Option<String>,
    date_format: Option<String>,
    locale: Option<String>,
}

impl StaffBuilder {
    pub fn new() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }
    pub fn office_id(mut self, office_id: i64) -> Self {
        self.office_id = Some(office_id);
        self
    }
    pub fn firstname(mut self, firstname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self
    }
    pub fn lastname(mut self, lastname: impl Into<String>) -> Self {
        self.lastname = Some(lastname.into());
        self
    }
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
    pub fn mobile_no(mut self, mobile_no: impl Into<String>) -> Self {
        self.mobile_no = Some(mobile_no.into());
        self
    }
    pub fn loan_officer(mut self, is_loan_officer: bool) -> Self {
        self.is_loan_officer = is_loan_officer;
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
    pub fn joining_date(mut self, date: impl Into<String>) -> Self {
        self.joining_date = Some(date.into());
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

    pub fn build(self) -> Result<Staff> {
        let office_id = self.office_id.ok_or_else(|| Error::missing("officeId"))?;
        let firstname = json::non_empty(self.firstname.as_deref(), "firstname")?.to_owned();
        let lastname = json::non_empty(self.lastname.as_deref(), "lastname")?.to_owned();
        json::check_external_id(self.external_id.as_deref())?;

        // joining date, format and locale travel together or not at all
        let (joining_date, date_format) = match (self.joining_date, self.date_format, self.locale) {
            (Some(text), Some(pattern), Some(locale)) => {
                date::validate_date(&text, &pattern, &locale)?;
                let format = DateFormat::new(pattern, locale);
                (Some(format.parse(&text)?), Some(format))
            }
            (None, None, None) => (None, None),
            _ => {
                return Err(Error::InvalidArgument(
                    "joiningDate, dateFormat and locale must be set together".into(),
                ));
            }
        };

        Ok(Staff {
            office_id,
            firstname,
            lastname,
            external_id: self.external_id,
            mobile_no: self.mobile_no,
            is_loan_officer: self.is_loan_officer,
            is_active: self.is_active,
            joining_date,
            date_format,
            ..Staff::default()
        })
    }
}

impl Staff {
    pub fn builder() -> StaffBuilder {
        StaffBuilder::new()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }
    pub fn office_id(&self) -> i64 {
        self.office_id
    }
    pub fn firstname(&self) -> &str {
        &self.firstname
    }
    pub fn lastname(&self) -> &str {
        &self.lastname
    }
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
    pub fn mobile_no(&self) -> Option<&str> {
        self.mobile_no.as_deref()
    }
    pub fn is_loan_officer(&self) -> bool {
        self.is_loan_officer
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn joining_date(&self) -> Option<NaiveDate> {
        self.joining_date
    }
    pub fn office_name(&self) -> Option<&str> {
        self.office_name.as_deref()
    }

    /// Server display name, else "lastname, firstname" as the platform
    /// renders it.
    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("{}, {}", self.lastname, self.firstname))
    }

    pub fn to_json(&self) -> Result<Value> {
        let firstname = json::non_empty(Some(&self.firstname), "firstname")?;
        let lastname = json::non_empty(Some(&self.lastname), "lastname")?;
        json::check_external_id(self.external_id.as_deref())?;

        let mut payload = Payload::new();
        payload
            .put("officeId", self.office_id)
            .put("firstname", firstname)
            .put("lastname", lastname)
            .put("isLoanOfficer", self.is_loan_officer)
            .put("isActive", self.is_active)
            .put_opt("externalId", self.external_id.as_deref())
            .put_opt("mobileNo", self.mobile_no.as_deref());
        match (self.joining_date, &self.date_format) {
            (Some(date), Some(format)) => {
                payload.put_date("joiningDate", date, format)?;
            }
            (Some(_), None) => {
                return Err(Error::InvalidArgument(
                    "joiningDate requires dateFormat and locale".into(),
                ));
            }
            (None, _) => {}
        }

        Ok(payload.into_value())
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = Fields::new(value)?;
        let date_format = fields.date_format();

        let staff = Staff {
            office_id: fields.require_i64("officeId")?,
            firstname: fields.str("firstname").unwrap_or_default(),
            lastname: fields.str("lastname").unwrap_or_default(),
            external_id: fields.str("externalId"),
            mobile_no: fields.str("mobileNo"),
            is_loan_officer: fields.bool("isLoanOfficer").unwrap_or(false),
            is_active: fields.bool("isActive").unwrap_or(false),
            joining_date: fields.date("joiningDate", date_format.as_ref())?,
            date_format,
            id: fields.i64("id"),
            display_name: fields.str("displayName"),
            office_name: fields.str("officeName"),
        };
        tracing::debug!(id = ?staff.id, office_id = staff.office_id, "decoded staff");
        Ok(staff)
    }
}
