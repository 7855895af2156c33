//! Write-only state-transition commands. None of these are ever decoded.
use super::date::{self, DateFormat};
use super::error::{Error, Result};
use super::json::Payload;
use chrono::NaiveDate;
use serde_json::{Value, json};

fn dated(
    field: &str,
    text: Option<String>,
    pattern: Option<String>,
    locale: Option<String>,
) -> Result<(NaiveDate, DateFormat)> {
    let text = text.ok_or_else(|| Error::missing(field))?;
    let pattern = pattern.ok_or_else(|| Error::missing("dateFormat"))?;
    let locale = locale.ok_or_else(|| Error::missing("locale"))?;
    date::validate_date(&text, &pattern, &locale)?;
    let format = DateFormat::new(pattern, locale);
    Ok((format.parse(&text)?, format))
}

/// Activates a pending client or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    date: NaiveDate,
    format: DateFormat,
}

pub type ActivateClient = Activation;
pub type ActivateGroup = Activation;

#[derive(Debug, Default)]
pub struct ActivationBuilder {
    activation_date: Option<String>,
    date_format: Option<String>,
    locale: Option<String>,
}

impl ActivationBuilder {
    pub fn activation_date(mut self, date: impl Into<String>) -> Self {
        self.activation_date = Some(date.into());
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
    pub fn build(self) -> Result<Activation> {
        let (date, format) = dated(
            "activationDate",
            self.activation_date,
            self.date_format,
            self.locale,
        )?;
        Ok(Activation { date, format })
    }
}

impl Activation {
    pub fn builder() -> ActivationBuilder {
        ActivationBuilder::default()
    }

    /// Activation on a known calendar date, sent with `format`.
    pub fn on(date: NaiveDate, format: DateFormat) -> Self {
        Self { date, format }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn to_json(&self) -> Result<Value> {
        let mut payload = Payload::new();
        payload.put_date("activationDate", self.date, &self.format)?;
        Ok(payload.into_value())
    }
}

/// Dated transitions that carry a reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Close,
    Reject,
    Withdraw,
}

impl Transition {
    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Transition::Close => ("closureDate", "closureReasonId"),
            Transition::Reject => ("rejectionDate", "rejectionReasonId"),
            Transition::Withdraw => ("withdrawalDate", "withdrawalReasonId"),
        }
    }

    /// Query command name the platform expects, e.g. `?command=close`.
    pub fn command(self) -> &'static str {
        match self {
            Transition::Close => "close",
            Transition::Reject => "reject",
            Transition::Withdraw => "withdraw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    transition: Transition,
    date: NaiveDate,
    reason_id: i64,
    format: DateFormat,
}

pub type CloseClient = TransitionCommand;
pub type CloseGroup = TransitionCommand;
pub type RejectClient = TransitionCommand;
pub type WithdrawClient = TransitionCommand;

#[derive(Debug)]
pub struct TransitionBuilder {
    transition: Transition,
    date: Option<String>,
    reason_id: Option<i64>,
    date_format: Option<String>,
    locale: Option<String>,
}

impl TransitionBuilder {
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
    pub fn reason_id(mut self, reason_id: i64) -> Self {
        self.reason_id = Some(reason_id);
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
    pub fn build(self) -> Result<TransitionCommand> {
        let (date_key, reason_key) = self.transition.keys();
        let reason_id = self.reason_id.ok_or_else(|| Error::missing(reason_key))?;
        let (date, format) = dated(date_key, self.date, self.date_format, self.locale)?;
        Ok(TransitionCommand {
            transition: self.transition,
            date,
            reason_id,
            format,
        })
    }
}

impl TransitionCommand {
    pub fn builder(transition: Transition) -> TransitionBuilder {
        TransitionBuilder {
            transition,
            date: None,
            reason_id: None,
            date_format: None,
            locale: None,
        }
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn to_json(&self) -> Result<Value> {
        let (date_key, reason_key) = self.transition.keys();
        let mut payload = Payload::new();
        payload.put_date(date_key, self.date, &self.format)?;
        payload.put(reason_key, self.reason_id);
        Ok(payload.into_value())
    }
}

/// Assigns or unassigns a staff member on a client or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffAssignment {
    staff_id: i64,
}

impl StaffAssignment {
    pub fn new(staff_id: i64) -> Self {
        Self { staff_id }
    }

    pub fn staff_id(&self) -> i64 {
        self.staff_id
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(json!({ "staffId": self.staff_id }))
    }
}

/// Associates or disassociates clients with a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChange {
    client_members: Vec<i64>,
}

pub type AssociateClients = MemberChange;
pub type DisassociateClients = MemberChange;

impl MemberChange {
    pub fn new(client_members: impl IntoIterator<Item = i64>) -> Result<Self> {
        let client_members: Vec<i64> = client_members.into_iter().collect();
        if client_members.is_empty() {
            return Err(Error::InvalidArgument("clientMembers must not be empty".into()));
        }
        Ok(Self { client_members })
    }

    pub fn client_members(&self) -> &[i64] {
        &self.client_members
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(json!({ "clientMembers": self.client_members }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferClients {
    destination_group_id: i64,
    clients: Vec<i64>,
    inherit_loan_officer: Option<bool>,
}

#[derive(Debug, Default)]
pub struct TransferClientsBuilder {
    destination_group_id: Option<i64>,
    clients: Vec<i64>,
    inherit_loan_officer: Option<bool>,
}

impl TransferClientsBuilder {
    pub fn destination_group_id(mut self, group_id: i64) -> Self {
        self.destination_group_id = Some(group_id);
        self
    }
    pub fn client(mut self, client_id: i64) -> Self {
        self.clients.push(client_id);
        self
    }
    pub fn clients(mut self, client_ids: impl IntoIterator<Item = i64>) -> Self {
        self.clients.extend(client_ids);
        self
    }
    pub fn inherit_destination_group_loan_officer(mut self, inherit: bool) -> Self {
        self.inherit_loan_officer = Some(inherit);
        self
    }
    pub fn build(self) -> Result<TransferClients> {
        let destination_group_id = self
            .destination_group_id
            .ok_or_else(|| Error::missing("destinationGroupId"))?;
        if self.clients.is_empty() {
            return Err(Error::InvalidArgument("clients must not be empty".into()));
        }
        Ok(TransferClients {
            destination_group_id,
            clients: self.clients,
            inherit_loan_officer: self.inherit_loan_officer,
        })
    }
}

impl TransferClients {
    pub fn builder() -> TransferClientsBuilder {
        TransferClientsBuilder::default()
    }

    pub fn destination_group_id(&self) -> i64 {
        self.destination_group_id
    }

    pub fn clients(&self) -> &[i64] {
        &self.clients
    }

    pub fn to_json(&self) -> Result<Value> {
        let clients: Vec<Value> = self.clients.iter().map(|id| json!({ "id": id })).collect();
        let mut payload = Payload::new();
        payload
            .put("destinationGroupId", self.destination_group_id)
            .put("clients", clients)
            .put_opt("inheritDestinationGroupLoanOfficer", self.inherit_loan_officer);
        Ok(payload.into_value())
    }
}
